use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};

use super::application::ApplicationRecord;
use super::client::{ScoringError, ScoringGateway};
use super::result::ScoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// Transient feedback shown after a submission settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn scored(result: &ScoreResult) -> Self {
        Self {
            title: "Risk Assessment Complete".to_string(),
            description: format!(
                "Score: {} - {} Risk",
                result.risk_score, result.risk_category
            ),
            variant: NotificationVariant::Default,
        }
    }

    pub fn failed(error: &ScoringError) -> Self {
        if error.is_transport() {
            Self {
                title: "Connection Error".to_string(),
                description:
                    "Unable to connect to the scoring server. Please ensure the API is running."
                        .to_string(),
                variant: NotificationVariant::Destructive,
            }
        } else {
            Self {
                title: "Error".to_string(),
                description: error.to_string(),
                variant: NotificationVariant::Destructive,
            }
        }
    }
}

/// Page-level state owned by one controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageState {
    pub loading: bool,
    pub result: Option<ScoreResult>,
    pub notification: Option<Notification>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Scored(ScoreResult),
    Failed(Notification),
    /// A newer submission or a cancel took over; this outcome was dropped.
    Superseded,
}

/// Drives one page's submit cycle: loading flag, last result, notification.
///
/// Every submission takes a fresh request token. Starting another submission
/// or calling [`ScoringController::cancel`] invalidates the older token, which
/// aborts its in-flight call and discards whatever it would have produced.
pub struct ScoringController {
    gateway: Arc<dyn ScoringGateway>,
    state: Mutex<PageState>,
    current: watch::Sender<u64>,
}

impl ScoringController {
    pub fn new(gateway: Arc<dyn ScoringGateway>) -> Self {
        let (current, _) = watch::channel(0);
        Self {
            gateway,
            state: Mutex::new(PageState::default()),
            current,
        }
    }

    pub fn snapshot(&self) -> PageState {
        self.state().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Send a copy of `record` for scoring and settle the page state.
    pub async fn submit(&self, record: ApplicationRecord) -> SubmissionOutcome {
        let token = self.begin();
        let _release = LoadingRelease {
            controller: self,
            token,
        };
        let superseded = wait_until_superseded(self.current.subscribe(), token);

        info!(applicant_id = %record.applicant_id(), token, "submitting application for scoring");

        let response = tokio::select! {
            response = self.gateway.score(&record) => response,
            _ = superseded => {
                info!(applicant_id = %record.applicant_id(), token, "scoring request superseded");
                return SubmissionOutcome::Superseded;
            }
        };

        self.settle(token, response)
    }

    /// Abort whatever is in flight and return the page to an idle state.
    pub fn cancel(&self) {
        let mut state = self.state();
        self.current.send_modify(|token| *token += 1);
        state.loading = false;
    }

    fn begin(&self) -> u64 {
        let mut state = self.state();
        let mut token = 0;
        self.current.send_modify(|current| {
            *current += 1;
            token = *current;
        });
        state.loading = true;
        state.result = None;
        state.notification = None;
        token
    }

    fn settle(
        &self,
        token: u64,
        response: Result<ScoreResult, ScoringError>,
    ) -> SubmissionOutcome {
        let mut state = self.state();
        if *self.current.borrow() != token {
            return SubmissionOutcome::Superseded;
        }

        match response {
            Ok(result) => {
                info!(
                    applicant_id = %result.applicant_id,
                    risk_score = result.risk_score,
                    risk_category = %result.risk_category,
                    "risk assessment complete"
                );
                state.notification = Some(Notification::scored(&result));
                state.result = Some(result.clone());
                SubmissionOutcome::Scored(result)
            }
            Err(error) => {
                warn!(error = %error, "error calculating risk");
                let notification = Notification::failed(&error);
                state.notification = Some(notification.clone());
                SubmissionOutcome::Failed(notification)
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the loading flag on every exit path of a submission, including
/// panics and dropped futures, as long as the submission is still current.
struct LoadingRelease<'a> {
    controller: &'a ScoringController,
    token: u64,
}

impl Drop for LoadingRelease<'_> {
    fn drop(&mut self) {
        let mut state = self.controller.state();
        if *self.controller.current.borrow() == self.token {
            state.loading = false;
        }
    }
}

async fn wait_until_superseded(mut receiver: watch::Receiver<u64>, token: u64) {
    loop {
        if *receiver.borrow_and_update() != token {
            return;
        }
        if receiver.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
