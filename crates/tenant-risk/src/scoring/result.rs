use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification returned alongside the numeric score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    /// Anything outside LOW/MEDIUM/HIGH, kept verbatim for display.
    Unrecognized(String),
}

impl RiskCategory {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for RiskCategory {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            _ => Self::Unrecognized(raw),
        }
    }
}

impl From<RiskCategory> for String {
    fn from(category: RiskCategory) -> Self {
        match category {
            RiskCategory::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed recommendation vocabulary understood by the result panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Approve,
    RequestInfo,
    Reject,
    ManualReview,
    Unrecognized(String),
}

impl Recommendation {
    /// Exact match on the directive after normalizing case, spaces and hyphens.
    /// Free text that merely mentions a directive is not classified.
    pub fn classify(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        match normalized.as_str() {
            "APPROVE" => Self::Approve,
            "REQUEST_INFO" => Self::RequestInfo,
            "REJECT" => Self::Reject,
            "MANUAL_REVIEW" => Self::ManualReview,
            _ => Self::Unrecognized(raw.to_string()),
        }
    }
}

/// Which of the two payload layouts the scoring service answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// Fractional confidence with a reasoning paragraph.
    Reasoned,
    /// Model version and inference timing, no reasoning.
    Instrumented,
}

/// Confidence as the scoring service sent it.
///
/// `confidence` is a fraction in [0, 1]. Older deployments send a value that
/// is already a percentage as `confidence_score`. When both keys are present
/// the fraction wins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    Fraction { confidence: f64 },
    Percent { confidence_score: f64 },
}

impl Confidence {
    pub const fn fraction(confidence: f64) -> Self {
        Self::Fraction { confidence }
    }

    pub const fn percent(confidence_score: f64) -> Self {
        Self::Percent { confidence_score }
    }

    /// 0–100 scale; only a fraction is multiplied by 100.
    pub fn as_percent(self) -> f64 {
        let percent = match self {
            Self::Fraction { confidence } => confidence * 100.0,
            Self::Percent { confidence_score } => confidence_score,
        };
        percent.clamp(0.0, 100.0)
    }
}

/// Payload returned by the scoring service for one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub applicant_id: String,
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    #[serde(default)]
    pub default_probability: f64,
    pub recommendation: String,
    #[serde(flatten)]
    pub confidence: Confidence,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_time_ms: Option<f64>,
}

impl ScoreResult {
    pub fn recommendation_kind(&self) -> Recommendation {
        Recommendation::classify(&self.recommendation)
    }

    pub fn shape(&self) -> ResponseShape {
        if self.model_version.is_some() && self.reasoning.trim().is_empty() {
            ResponseShape::Instrumented
        } else {
            ResponseShape::Reasoned
        }
    }

    pub fn confidence_percent(&self) -> f64 {
        self.confidence.as_percent()
    }

    pub fn default_probability_percent(&self) -> f64 {
        self.default_probability * 100.0
    }
}
