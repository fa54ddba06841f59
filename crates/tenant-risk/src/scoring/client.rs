use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use super::application::ApplicationRecord;
use super::result::ScoreResult;
use crate::config::ScoringConfig;

/// Boundary to the remote scoring service so controllers can run against stubs.
#[async_trait]
pub trait ScoringGateway: Send + Sync {
    async fn score(&self, record: &ApplicationRecord) -> Result<ScoreResult, ScoringError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// The request never got an HTTP answer (DNS, refused connection, TLS, timeout).
    #[error("unable to reach scoring service: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("malformed scoring response: {0}")]
    Decode(String),
    #[error("scoring client unavailable: {0}")]
    Client(#[source] reqwest::Error),
}

impl ScoringError {
    /// Non-2xx answer; the service's `detail` wins over the generic message.
    pub fn server(status: u16, detail: Option<String>) -> Self {
        let message = detail.unwrap_or_else(|| format!("Server error: {status}"));
        Self::Server { status, message }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Pull a human readable `detail` out of an error body.
///
/// Bodies that are not JSON count as an empty object. FastAPI validation
/// errors carry a list of objects; their `msg` entries are joined.
pub fn error_detail(body: &[u8]) -> Option<String> {
    let payload: Value =
        serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Default::default()));

    let detail = match payload.get("detail")? {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item.get("msg").and_then(Value::as_str) {
                Some(msg) => msg.to_string(),
                None => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Value::Null | Value::Bool(false) => return None,
        other => other.to_string(),
    };

    (!detail.is_empty()).then_some(detail)
}

/// `reqwest` backed gateway posting the record as JSON.
#[derive(Debug, Clone)]
pub struct HttpScoringClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpScoringClient {
    pub fn new(config: &ScoringConfig) -> Result<Self, ScoringError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ScoringError::Client)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ScoringGateway for HttpScoringClient {
    async fn score(&self, record: &ApplicationRecord) -> Result<ScoreResult, ScoringError> {
        debug!(endpoint = %self.endpoint, applicant_id = %record.applicant_id(), "posting application");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(record)
            .send()
            .await
            .map_err(ScoringError::Transport)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ScoringError::Decode(err.to_string()))?;

        if !status.is_success() {
            let error = ScoringError::server(status.as_u16(), error_detail(&body));
            warn!(status = status.as_u16(), error = %error, "scoring service rejected application");
            return Err(error);
        }

        decode_success(status, &body)
    }
}

fn decode_success(status: StatusCode, body: &[u8]) -> Result<ScoreResult, ScoringError> {
    serde_json::from_slice::<ScoreResult>(body).map_err(|err| {
        warn!(status = status.as_u16(), error = %err, "unreadable scoring response");
        ScoringError::Decode(err.to_string())
    })
}
