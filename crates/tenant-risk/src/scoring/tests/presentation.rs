use serde_json::json;

use super::common::*;
use crate::scoring::presentation::{
    format_number, Badge, RecommendationPanel, ResultDetails, ResultView, RiskThresholds, Tone,
};
use crate::scoring::result::{
    Confidence, Recommendation, ResponseShape, RiskCategory, ScoreResult,
};

#[test]
fn default_tiers_hold_at_their_boundaries() {
    let thresholds = RiskThresholds::default();

    assert_eq!(thresholds.tone_for(0.0), Tone::Success);
    assert_eq!(thresholds.tone_for(29.9), Tone::Success);
    assert_eq!(thresholds.tone_for(30.0), Tone::Warning);
    assert_eq!(thresholds.tone_for(60.0), Tone::Warning);
    assert_eq!(thresholds.tone_for(60.1), Tone::Destructive);
    assert_eq!(thresholds.tone_for(100.0), Tone::Destructive);
}

#[test]
fn tiers_follow_configured_cut_points() {
    let thresholds = RiskThresholds::new(40.0, 70.0).expect("valid thresholds");

    assert_eq!(thresholds.tone_for(35.0), Tone::Success);
    assert_eq!(thresholds.tone_for(70.0), Tone::Warning);
    assert_eq!(thresholds.tone_for(70.5), Tone::Destructive);
}

#[test]
fn thresholds_must_be_ordered_and_finite() {
    assert!(RiskThresholds::new(60.0, 30.0).is_none());
    assert!(RiskThresholds::new(f64::NAN, 30.0).is_none());
    assert!(RiskThresholds::new(50.0, 50.0).is_some());
}

#[test]
fn badges_follow_category_with_neutral_fallback() {
    assert_eq!(Badge::for_category(&RiskCategory::Low).label, "LOW RISK");
    assert_eq!(Badge::for_category(&RiskCategory::Medium).tone, Tone::Warning);
    assert_eq!(
        Badge::for_category(&RiskCategory::High).tone,
        Tone::Destructive
    );

    let odd = Badge::for_category(&RiskCategory::from("SEVERE".to_string()));
    assert_eq!(odd.label, "SEVERE");
    assert_eq!(odd.tone, Tone::Neutral);
}

#[test]
fn recommendations_classify_by_exact_directive() {
    assert_eq!(Recommendation::classify("APPROVE"), Recommendation::Approve);
    assert_eq!(
        Recommendation::classify("request-info"),
        Recommendation::RequestInfo
    );
    assert_eq!(
        Recommendation::classify(" Manual Review "),
        Recommendation::ManualReview
    );
    assert_eq!(
        Recommendation::classify("Approve with conditions"),
        Recommendation::Unrecognized("Approve with conditions".to_string())
    );
    assert!(matches!(
        Recommendation::classify("Do not reject outright"),
        Recommendation::Unrecognized(_)
    ));
}

#[test]
fn unclassified_recommendations_get_caution_styling() {
    let panel = RecommendationPanel::new("Approve with conditions");
    assert_eq!(panel.tone, Tone::Warning);
    assert_eq!(panel.text, "Approve with conditions");

    let reject = RecommendationPanel::new("REJECT");
    assert_eq!(reject.tone, Tone::Destructive);
    assert_eq!(reject.icon, "x-circle");
}

#[test]
fn approved_result_renders_score_badge_confidence_and_probability() {
    let view = ResultView::new(&approved_result(), &RiskThresholds::default());

    assert_eq!(view.score, "25");
    assert_eq!(view.score_tone, Tone::Success);
    assert_eq!(view.badge.label, "LOW RISK");
    assert_eq!(view.recommendation.kind, Recommendation::Approve);
    assert_eq!(view.recommendation.text, "APPROVE");
    assert_eq!(view.recommendation.tone, Tone::Success);
    assert_eq!(view.confidence, "92.0%");
    match view.details {
        ResultDetails::Reasoning {
            reasoning,
            default_probability,
        } => {
            assert_eq!(reasoning, "Strong credit history");
            assert_eq!(default_probability, "5.0%");
        }
        other => panic!("expected reasoning details, got {other:?}"),
    }
}

#[test]
fn instrumented_payloads_show_model_metadata() {
    let payload = json!({
        "success": true,
        "applicant_id": "APP-1",
        "risk_score": 72.5,
        "risk_category": "HIGH",
        "default_probability": 0.31,
        "recommendation": "REJECT",
        "confidence_score": 87.5,
        "model_version": "xgb-2024.06",
        "inference_time_ms": 12
    });
    let result: ScoreResult = serde_json::from_value(payload).expect("payload parses");

    assert_eq!(result.shape(), ResponseShape::Instrumented);
    let view = ResultView::new(&result, &RiskThresholds::default());
    assert_eq!(view.score, "72.5");
    assert_eq!(view.score_tone, Tone::Destructive);
    assert_eq!(view.confidence, "87.5%");
    assert_eq!(
        view.details,
        ResultDetails::Model {
            model_version: "xgb-2024.06".to_string(),
            inference_time: "12ms".to_string(),
        }
    );
}

#[test]
fn unknown_categories_survive_a_round_trip() {
    let mut result = approved_result();
    result.risk_category = RiskCategory::from("ELEVATED".to_string());

    let payload = serde_json::to_value(&result).expect("serializes");
    assert_eq!(payload["risk_category"], json!("ELEVATED"));
}

#[test]
fn confidence_is_clamped_to_a_percentage() {
    let mut result = approved_result();
    result.confidence = Confidence::percent(140.0);
    assert_eq!(result.confidence_percent(), 100.0);

    result.confidence = Confidence::fraction(-0.2);
    assert_eq!(result.confidence_percent(), 0.0);
}

#[test]
fn percentage_confidence_is_never_scaled_again() {
    let payload = json!({
        "success": true,
        "applicant_id": "APP-1",
        "risk_score": 48,
        "risk_category": "MEDIUM",
        "recommendation": "REQUEST_INFO",
        "confidence_score": 0.8,
        "model_version": "xgb",
        "inference_time_ms": 9
    });
    let result: ScoreResult = serde_json::from_value(payload).expect("payload parses");

    assert_eq!(result.confidence, Confidence::percent(0.8));
    let view = ResultView::new(&result, &RiskThresholds::default());
    assert_eq!(view.confidence, "0.8%");
}

#[test]
fn payload_with_both_confidence_keys_prefers_the_fraction() {
    let payload = json!({
        "success": true,
        "applicant_id": "APP-1",
        "risk_score": 25,
        "risk_category": "LOW",
        "default_probability": 0.05,
        "recommendation": "APPROVE",
        "confidence": 0.92,
        "confidence_score": 92.0,
        "reasoning": "Strong credit history"
    });
    let result: ScoreResult = serde_json::from_value(payload).expect("payload parses");

    assert_eq!(result.confidence, Confidence::fraction(0.92));
    let view = ResultView::new(&result, &RiskThresholds::default());
    assert_eq!(view.confidence, "92.0%");
}

#[test]
fn confidence_keeps_the_key_it_arrived_under() {
    let payload = serde_json::to_value(approved_result()).expect("serializes");
    assert_eq!(payload["confidence"], json!(0.92));
    assert!(payload.get("confidence_score").is_none());

    let mut result = approved_result();
    result.confidence = Confidence::percent(87.5);
    let payload = serde_json::to_value(&result).expect("serializes");
    assert_eq!(payload["confidence_score"], json!(87.5));
    assert!(payload.get("confidence").is_none());
}

#[test]
fn payload_without_confidence_is_rejected() {
    let payload = json!({
        "risk_score": 25,
        "risk_category": "LOW",
        "recommendation": "APPROVE"
    });

    assert!(serde_json::from_value::<ScoreResult>(payload).is_err());
}

#[test]
fn whole_scores_print_without_decimals() {
    assert_eq!(format_number(25.0), "25");
    assert_eq!(format_number(60.1), "60.1");
}
