use crate::infra::{AppState, PageSession, ScoringContext};
use crate::pages::{render_page, PageView};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tenant_risk::error::AppError;
use tenant_risk::scoring::{
    ApplicantId, ApplicationRecord, FieldKey, FormSubmission, Notification, PageState,
    ResultView, ScoreResult, SubmissionOutcome, SubmitControl,
};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum AssessmentStatus {
    Scored,
    Failed,
    Superseded,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssessmentResponse {
    pub(crate) applicant_id: ApplicantId,
    pub(crate) status: AssessmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) result: Option<ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) view: Option<ResultView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) notification: Option<Notification>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionView {
    pub(crate) applicant_id: ApplicantId,
    pub(crate) record: ApplicationRecord,
    pub(crate) state: PageState,
    pub(crate) submit: SubmitControl,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) view: Option<ResultView>,
}

impl SessionView {
    fn new(session: &PageSession, context: &ScoringContext) -> Self {
        let state = session.controller().snapshot();
        let view = state
            .result
            .as_ref()
            .map(|result| ResultView::new(result, &context.thresholds));

        Self {
            applicant_id: session.applicant_id().clone(),
            record: session.record(),
            submit: SubmitControl::for_loading(state.loading),
            state,
            view,
        }
    }
}

pub(crate) fn with_scoring_routes(context: ScoringContext) -> Router {
    Router::new()
        .route("/", get(application_page))
        .route("/assess", post(assess_form))
        .route("/api/v1/assessments", post(create_assessment))
        .route("/api/v1/sessions/:applicant_id", get(session_snapshot))
        .route("/api/v1/sessions/:applicant_id/cancel", post(cancel_session))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(context)
}

pub(crate) async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Every page load issues a fresh applicant id and its own controller.
pub(crate) async fn application_page(State(context): State<ScoringContext>) -> Html<String> {
    let session = context.open_page(ApplicationRecord::new());
    info!(
        applicant_id = %session.applicant_id(),
        open_pages = context.sessions.len(),
        "opened application page"
    );

    let record = session.record();
    let state = session.controller().snapshot();
    Html(render_page(&PageView {
        record: &record,
        state: &state,
        violations: &[],
        thresholds: &context.thresholds,
    }))
}

pub(crate) async fn assess_form(
    State(context): State<ScoringContext>,
    Form(inputs): Form<HashMap<String, String>>,
) -> Result<(StatusCode, Html<String>), AppError> {
    let session = find_session(
        &context,
        inputs
            .get(FieldKey::ApplicantId.as_str())
            .map(String::as_str)
            .unwrap_or_default(),
    )?;

    let submission = FormSubmission::bind(&session.record(), &inputs);
    session.replace_record(submission.record.clone());

    let status = if submission.is_blocked() {
        info!(
            applicant_id = %session.applicant_id(),
            violations = submission.violations.len(),
            "form submission blocked"
        );
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        session
            .controller()
            .submit(submission.record.clone())
            .await;
        StatusCode::OK
    };

    let state = session.controller().snapshot();
    let page = render_page(&PageView {
        record: &submission.record,
        state: &state,
        violations: &submission.violations,
        thresholds: &context.thresholds,
    });
    Ok((status, Html(page)))
}

/// Programmatic submission: values go to the scoring service as given.
pub(crate) async fn create_assessment(
    State(context): State<ScoringContext>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<AssessmentResponse>), AppError> {
    let record = ApplicationRecord::overlay(&payload)?;
    let out_of_bounds = record.bound_violations();
    if !out_of_bounds.is_empty() {
        warn!(
            applicant_id = %record.applicant_id(),
            values = ?out_of_bounds,
            "submitting values the form would not accept"
        );
    }

    let session = context.open_page(record.clone());
    let outcome = session.controller().submit(record).await;

    let applicant_id = session.applicant_id().clone();
    let (status, response) = match outcome {
        SubmissionOutcome::Scored(result) => (
            StatusCode::OK,
            AssessmentResponse {
                applicant_id,
                status: AssessmentStatus::Scored,
                view: Some(ResultView::new(&result, &context.thresholds)),
                notification: Some(Notification::scored(&result)),
                result: Some(result),
            },
        ),
        SubmissionOutcome::Failed(notification) => (
            StatusCode::BAD_GATEWAY,
            AssessmentResponse {
                applicant_id,
                status: AssessmentStatus::Failed,
                result: None,
                view: None,
                notification: Some(notification),
            },
        ),
        SubmissionOutcome::Superseded => (
            StatusCode::CONFLICT,
            AssessmentResponse {
                applicant_id,
                status: AssessmentStatus::Superseded,
                result: None,
                view: None,
                notification: None,
            },
        ),
    };

    Ok((status, Json(response)))
}

pub(crate) async fn session_snapshot(
    State(context): State<ScoringContext>,
    Path(applicant_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&context, &applicant_id)?;
    Ok(Json(SessionView::new(&session, &context)))
}

pub(crate) async fn cancel_session(
    State(context): State<ScoringContext>,
    Path(applicant_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&context, &applicant_id)?;
    session.controller().cancel();
    info!(applicant_id = %session.applicant_id(), "scoring request cancelled");
    Ok(Json(SessionView::new(&session, &context)))
}

fn find_session(context: &ScoringContext, raw_id: &str) -> Result<Arc<PageSession>, AppError> {
    let id = ApplicantId(raw_id.trim().to_string());
    context
        .sessions
        .get(&id)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
}
