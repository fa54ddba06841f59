use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::scoring::application::{ApplicantId, ApplicationRecord};
use crate::scoring::client::{ScoringError, ScoringGateway};
use crate::scoring::controller::ScoringController;
use crate::scoring::result::{Confidence, RiskCategory, ScoreResult};

type Reply = dyn Fn(&ApplicationRecord) -> Result<ScoreResult, ScoringError> + Send + Sync;

/// Gateway answering from a closure and recording every record it receives.
pub(super) struct StubGateway {
    reply: Box<Reply>,
    calls: Mutex<Vec<ApplicationRecord>>,
}

impl StubGateway {
    pub(super) fn new<F>(reply: F) -> Self
    where
        F: Fn(&ApplicationRecord) -> Result<ScoreResult, ScoringError> + Send + Sync + 'static,
    {
        Self {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> Vec<ApplicationRecord> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

#[async_trait]
impl ScoringGateway for StubGateway {
    async fn score(&self, record: &ApplicationRecord) -> Result<ScoreResult, ScoringError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(record.clone());
        (self.reply)(record)
    }
}

/// Holds any record named "slow" until released; everything else answers at once.
#[derive(Default)]
pub(super) struct GatedGateway {
    release: Notify,
}

impl GatedGateway {
    pub(super) fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl ScoringGateway for GatedGateway {
    async fn score(&self, record: &ApplicationRecord) -> Result<ScoreResult, ScoringError> {
        if record.name == "slow" {
            self.release.notified().await;
        }
        let mut result = approved_result();
        result.applicant_id = record.name.clone();
        Ok(result)
    }
}

pub(super) struct PanickingGateway;

#[async_trait]
impl ScoringGateway for PanickingGateway {
    async fn score(&self, _record: &ApplicationRecord) -> Result<ScoreResult, ScoringError> {
        panic!("scoring backend exploded");
    }
}

pub(super) fn controller_with(gateway: Arc<dyn ScoringGateway>) -> Arc<ScoringController> {
    Arc::new(ScoringController::new(gateway))
}

pub(super) fn approved_result() -> ScoreResult {
    ScoreResult {
        success: true,
        applicant_id: "APP-1700000000000".to_string(),
        risk_score: 25.0,
        risk_category: RiskCategory::Low,
        default_probability: 0.05,
        recommendation: "APPROVE".to_string(),
        confidence: Confidence::fraction(0.92),
        reasoning: "Strong credit history".to_string(),
        model_version: None,
        inference_time_ms: None,
    }
}

pub(super) fn jane_doe() -> ApplicationRecord {
    let mut record =
        ApplicationRecord::with_applicant_id(ApplicantId("APP-1700000000000".to_string()));
    record.name = "Jane Doe".to_string();
    record.age = 35;
    record.monthly_income = 6000.0;
    record.credit_score = 720;
    record.rental_history_years = 3.0;
    record.monthly_rent = 1800.0;
    record
}

pub(super) fn named(name: &str) -> ApplicationRecord {
    let mut record = jane_doe();
    record.name = name.to_string();
    record
}

/// A real `reqwest` connect failure against a port nothing listens on.
pub(super) async fn transport_error() -> ScoringError {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);

    let err = reqwest::Client::new()
        .post(format!("http://{addr}/api/score"))
        .send()
        .await
        .expect_err("nothing is listening");
    ScoringError::Transport(err)
}

/// Browser-style form post for a complete, valid application.
pub(super) fn valid_inputs() -> HashMap<String, String> {
    [
        ("applicant_id", "APP-spoofed"),
        ("name", "Jane Doe"),
        ("age", "35"),
        ("employment_status", "self-employed"),
        ("monthly_income", "6000"),
        ("employment_verified", "on"),
        ("credit_score", "720"),
        ("previous_evictions", "0"),
        ("rental_history_years", "3"),
        ("on_time_payments_percent", "98"),
        ("late_payments_count", "1"),
        ("monthly_rent", "1800"),
        ("security_deposit", "1800"),
        ("lease_term_months", "24"),
        ("bedrooms", "2"),
        ("property_type", "condo"),
        ("location", "Des Moines, IA"),
        ("market_median_rent", "1750"),
        ("local_unemployment_rate", "4.2"),
        ("inflation_rate", "3.1"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}
