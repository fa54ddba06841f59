use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tenant_risk::scoring::{
    ApplicantId, ApplicationRecord, RiskThresholds, ScoringController, ScoringGateway,
};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Shared by every scoring route.
#[derive(Clone)]
pub(crate) struct ScoringContext {
    pub(crate) gateway: Arc<dyn ScoringGateway>,
    pub(crate) thresholds: RiskThresholds,
    pub(crate) sessions: PageSessions,
}

impl ScoringContext {
    pub(crate) fn new(
        gateway: Arc<dyn ScoringGateway>,
        thresholds: RiskThresholds,
        session_capacity: usize,
    ) -> Self {
        Self {
            gateway,
            thresholds,
            sessions: PageSessions::new(session_capacity),
        }
    }

    /// Register a new page keyed by the record's applicant id.
    pub(crate) fn open_page(&self, record: ApplicationRecord) -> Arc<PageSession> {
        let session = Arc::new(PageSession::new(record, self.gateway.clone()));
        self.sessions.insert(session.clone());
        session
    }
}

/// One opened application page: the form record as last bound and the
/// controller that owns its loading/result state.
pub(crate) struct PageSession {
    applicant_id: ApplicantId,
    record: Mutex<ApplicationRecord>,
    controller: ScoringController,
}

impl PageSession {
    fn new(record: ApplicationRecord, gateway: Arc<dyn ScoringGateway>) -> Self {
        Self {
            applicant_id: record.applicant_id().clone(),
            record: Mutex::new(record),
            controller: ScoringController::new(gateway),
        }
    }

    pub(crate) fn applicant_id(&self) -> &ApplicantId {
        &self.applicant_id
    }

    pub(crate) fn record(&self) -> ApplicationRecord {
        self.record.lock().expect("session mutex poisoned").clone()
    }

    pub(crate) fn replace_record(&self, record: ApplicationRecord) {
        *self.record.lock().expect("session mutex poisoned") = record;
    }

    pub(crate) fn controller(&self) -> &ScoringController {
        &self.controller
    }
}

#[derive(Default)]
struct SessionTable {
    sessions: HashMap<ApplicantId, Arc<PageSession>>,
    opened: VecDeque<ApplicantId>,
}

/// Bounded table of open pages; the oldest page is dropped once full.
#[derive(Clone)]
pub(crate) struct PageSessions {
    table: Arc<Mutex<SessionTable>>,
    capacity: usize,
}

impl PageSessions {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            table: Arc::new(Mutex::new(SessionTable::default())),
            capacity: capacity.max(1),
        }
    }

    fn insert(&self, session: Arc<PageSession>) {
        let mut guard = self.table.lock().expect("session table mutex poisoned");
        let id = session.applicant_id().clone();
        if guard.sessions.insert(id.clone(), session).is_none() {
            guard.opened.push_back(id);
        }

        while guard.sessions.len() > self.capacity {
            let Some(oldest) = guard.opened.pop_front() else {
                break;
            };
            if let Some(evicted) = guard.sessions.remove(&oldest) {
                evicted.controller().cancel();
                debug!(applicant_id = %oldest, "evicted application page");
            }
        }
    }

    pub(crate) fn get(&self, id: &ApplicantId) -> Option<Arc<PageSession>> {
        let guard = self.table.lock().expect("session table mutex poisoned");
        guard.sessions.get(id).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.table
            .lock()
            .expect("session table mutex poisoned")
            .sessions
            .len()
    }
}
