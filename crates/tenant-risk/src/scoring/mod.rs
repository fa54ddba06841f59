//! Tenant application scoring: the form model and its bindings, the call to the
//! remote scoring service, and the page controller that settles each submission.

pub mod application;
pub mod client;
pub mod controller;
pub mod form;
pub mod presentation;
pub mod result;

#[cfg(test)]
mod tests;

pub use application::{
    ApplicantId, ApplicationRecord, BedroomCount, EmploymentStatus, LeaseTerm, PropertyType,
};
pub use client::{error_detail, HttpScoringClient, ScoringError, ScoringGateway};
pub use controller::{
    Notification, NotificationVariant, PageState, ScoringController, SubmissionOutcome,
};
pub use form::{
    apply_input, FieldControl, FieldKey, FieldSpec, FieldViolation, FormInputError, FormSection,
    FormSubmission, SubmitControl, ViolationKind, FIELDS,
};
pub use presentation::{Badge, RecommendationPanel, ResultDetails, ResultView, RiskThresholds, Tone};
pub use result::{Confidence, Recommendation, ResponseShape, RiskCategory, ScoreResult};
