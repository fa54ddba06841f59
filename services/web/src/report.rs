use std::fmt::Write;
use tenant_risk::scoring::{
    ApplicationRecord, ResultDetails, ResultView, RiskThresholds, SubmissionOutcome, Tone,
};

/// Plain-text rendering of one command-line assessment.
pub(crate) fn render_assessment(
    record: &ApplicationRecord,
    outcome: &SubmissionOutcome,
    thresholds: &RiskThresholds,
) -> String {
    let mut report = String::new();
    let applicant = if record.name.is_empty() {
        "unnamed applicant"
    } else {
        record.name.as_str()
    };
    writeln!(
        report,
        "Tenant risk assessment for {applicant} ({})",
        record.applicant_id()
    )
    .expect("write heading");

    let result = match outcome {
        SubmissionOutcome::Scored(result) => result,
        SubmissionOutcome::Failed(notification) => {
            writeln!(
                report,
                "{}: {}",
                notification.title, notification.description
            )
            .expect("write failure");
            return report;
        }
        SubmissionOutcome::Superseded => {
            report.push_str("Assessment was cancelled before the scoring service answered\n");
            return report;
        }
    };

    let view = ResultView::new(result, thresholds);
    writeln!(
        report,
        "- Risk score: {} ({})",
        view.score,
        tier_label(&view)
    )
    .expect("write score");
    writeln!(report, "- Category: {}", view.badge.label).expect("write category");
    writeln!(
        report,
        "- Recommendation: {} ({})",
        view.recommendation.text, view.recommendation.caption
    )
    .expect("write recommendation");
    writeln!(report, "- Confidence: {}", view.confidence).expect("write confidence");

    match &view.details {
        ResultDetails::Reasoning {
            reasoning,
            default_probability,
        } => {
            if !reasoning.is_empty() {
                writeln!(report, "- Reasoning: {reasoning}").expect("write reasoning");
            }
            writeln!(report, "- Default probability: {default_probability}")
                .expect("write default probability");
        }
        ResultDetails::Model {
            model_version,
            inference_time,
        } => {
            writeln!(report, "- Model version: {model_version}").expect("write model version");
            writeln!(report, "- Inference time: {inference_time}").expect("write inference time");
        }
    }

    report
}

fn tier_label(view: &ResultView) -> &'static str {
    match view.score_tone {
        Tone::Success => "favourable",
        Tone::Warning => "needs attention",
        Tone::Destructive => "high risk",
        Tone::Neutral => "unclassified",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenant_risk::scoring::{
        ApplicantId, Confidence, Notification, NotificationVariant, RiskCategory, ScoreResult,
    };

    fn record() -> ApplicationRecord {
        let mut record = ApplicationRecord::with_applicant_id(ApplicantId("APP-7".to_string()));
        record.name = "Jane Doe".to_string();
        record
    }

    #[test]
    fn scored_report_lists_the_assessment() {
        let outcome = SubmissionOutcome::Scored(ScoreResult {
            success: true,
            applicant_id: "APP-7".to_string(),
            risk_score: 72.5,
            risk_category: RiskCategory::High,
            default_probability: 0.31,
            recommendation: "REJECT".to_string(),
            confidence: Confidence::fraction(0.81),
            reasoning: "Recent eviction".to_string(),
            model_version: None,
            inference_time_ms: None,
        });

        let report = render_assessment(&record(), &outcome, &RiskThresholds::default());

        assert!(report.starts_with("Tenant risk assessment for Jane Doe (APP-7)\n"));
        assert!(report.contains("- Risk score: 72.5 (high risk)"));
        assert!(report.contains("- Category: HIGH RISK"));
        assert!(report.contains("- Recommendation: REJECT (Application does not meet criteria)"));
        assert!(report.contains("- Confidence: 81.0%"));
        assert!(report.contains("- Reasoning: Recent eviction"));
        assert!(report.contains("- Default probability: 31.0%"));
    }

    #[test]
    fn instrumented_report_shows_model_metadata() {
        let outcome = SubmissionOutcome::Scored(ScoreResult {
            success: true,
            applicant_id: String::new(),
            risk_score: 45.0,
            risk_category: RiskCategory::Medium,
            default_probability: 0.12,
            recommendation: "REQUEST_INFO".to_string(),
            confidence: Confidence::percent(87.0),
            reasoning: String::new(),
            model_version: Some("xgb-2.1".to_string()),
            inference_time_ms: Some(12.5),
        });

        let report = render_assessment(&record(), &outcome, &RiskThresholds::default());

        assert!(report.contains("- Risk score: 45 (needs attention)"));
        assert!(report.contains("- Confidence: 87.0%"));
        assert!(report.contains("- Model version: xgb-2.1"));
        assert!(report.contains("- Inference time: 12.5ms"));
        assert!(!report.contains("Default probability"));
    }

    #[test]
    fn failed_report_carries_the_notification() {
        let outcome = SubmissionOutcome::Failed(Notification {
            title: "Error".to_string(),
            description: "Server error: 503".to_string(),
            variant: NotificationVariant::Destructive,
        });

        let report = render_assessment(&record(), &outcome, &RiskThresholds::default());

        assert_eq!(
            report,
            "Tenant risk assessment for Jane Doe (APP-7)\nError: Server error: 503\n"
        );
    }
}
