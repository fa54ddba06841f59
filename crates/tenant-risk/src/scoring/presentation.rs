use serde::Serialize;

use super::result::{Recommendation, ResponseShape, RiskCategory, ScoreResult};

/// Score cut points shared with the scoring service.
///
/// Scores below `low` are favourable, `low..=high` need attention, and
/// anything above `high` is treated as high risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskThresholds {
    low: f64,
    high: f64,
}

impl RiskThresholds {
    pub const DEFAULT_LOW: f64 = 30.0;
    pub const DEFAULT_HIGH: f64 = 60.0;

    pub fn new(low: f64, high: f64) -> Option<Self> {
        (low.is_finite() && high.is_finite() && low <= high).then_some(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn tone_for(&self, score: f64) -> Tone {
        if score < self.low {
            Tone::Success
        } else if score <= self.high {
            Tone::Warning
        } else {
            Tone::Destructive
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: Self::DEFAULT_LOW,
            high: Self::DEFAULT_HIGH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Warning,
    Destructive,
    Neutral,
}

impl Tone {
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "tone-success",
            Self::Warning => "tone-warning",
            Self::Destructive => "tone-destructive",
            Self::Neutral => "tone-neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
}

impl Badge {
    pub fn for_category(category: &RiskCategory) -> Self {
        let (label, tone) = match category {
            RiskCategory::Low => ("LOW RISK".to_string(), Tone::Success),
            RiskCategory::Medium => ("MEDIUM RISK".to_string(), Tone::Warning),
            RiskCategory::High => ("HIGH RISK".to_string(), Tone::Destructive),
            RiskCategory::Unrecognized(raw) => (raw.clone(), Tone::Neutral),
        };
        Self { label, tone }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationPanel {
    pub kind: Recommendation,
    /// The service's recommendation text, shown as-is.
    pub text: String,
    pub caption: &'static str,
    pub icon: &'static str,
    pub tone: Tone,
}

impl RecommendationPanel {
    pub fn new(raw: &str) -> Self {
        let kind = Recommendation::classify(raw);
        let (caption, icon, tone) = match kind {
            Recommendation::Approve => (
                "Recommended to proceed with application",
                "check-circle",
                Tone::Success,
            ),
            Recommendation::RequestInfo => (
                "Additional information needed",
                "alert-triangle",
                Tone::Warning,
            ),
            Recommendation::Reject => (
                "Application does not meet criteria",
                "x-circle",
                Tone::Destructive,
            ),
            Recommendation::ManualReview | Recommendation::Unrecognized(_) => (
                "Manual review recommended before a decision",
                "alert-triangle",
                Tone::Warning,
            ),
        };

        Self {
            kind,
            text: raw.to_string(),
            caption,
            icon,
            tone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultDetails {
    Reasoning {
        reasoning: String,
        default_probability: String,
    },
    Model {
        model_version: String,
        inference_time: String,
    },
}

/// Everything the result panel shows, derived from one [`ScoreResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub score: String,
    pub score_tone: Tone,
    pub badge: Badge,
    pub recommendation: RecommendationPanel,
    pub confidence_percent: f64,
    pub confidence: String,
    pub details: ResultDetails,
}

impl ResultView {
    pub fn new(result: &ScoreResult, thresholds: &RiskThresholds) -> Self {
        let confidence_percent = result.confidence_percent();

        let details = match (result.shape(), &result.model_version) {
            (ResponseShape::Instrumented, Some(version)) => ResultDetails::Model {
                model_version: version.clone(),
                inference_time: format!(
                    "{}ms",
                    format_number(result.inference_time_ms.unwrap_or_default())
                ),
            },
            _ => ResultDetails::Reasoning {
                reasoning: result.reasoning.clone(),
                default_probability: format_percent(result.default_probability_percent()),
            },
        };

        Self {
            score: format_number(result.risk_score),
            score_tone: thresholds.tone_for(result.risk_score),
            badge: Badge::for_category(&result.risk_category),
            recommendation: RecommendationPanel::new(&result.recommendation),
            confidence_percent,
            confidence: format_percent(confidence_percent),
            details,
        }
    }
}

/// Shortest decimal rendering: `25.0` prints as `25`.
pub fn format_number(value: f64) -> String {
    value.to_string()
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}
