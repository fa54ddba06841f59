//! Form schema for the application page and the binding rules that turn raw
//! widget text into an [`ApplicationRecord`].
//!
//! Numeric widgets never reject a keystroke: text that does not parse is
//! coerced to the field's fallback. Blocking happens only at submit time, using
//! the same rules a browser applies to `required`, `min`, `max` and `step`.

use std::collections::HashMap;

use serde::Serialize;

use super::application::{
    ApplicationRecord, BedroomCount, EmploymentStatus, LeaseTerm, PropertyType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormSection {
    Personal,
    EmploymentIncome,
    CreditHistory,
    PropertyDetails,
    MarketContext,
}

impl FormSection {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Personal,
            Self::EmploymentIncome,
            Self::CreditHistory,
            Self::PropertyDetails,
            Self::MarketContext,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal Information",
            Self::EmploymentIncome => "Employment & Income",
            Self::CreditHistory => "Credit & Payment History",
            Self::PropertyDetails => "Property Details",
            Self::MarketContext => "Market Context",
        }
    }

    pub fn fields(self) -> impl Iterator<Item = &'static FieldSpec> {
        FIELDS.iter().filter(move |spec| spec.section == self)
    }
}

/// One variant per record field, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    ApplicantId,
    Name,
    Age,
    EmploymentStatus,
    MonthlyIncome,
    EmploymentVerified,
    IncomeVerified,
    CreditScore,
    PreviousEvictions,
    RentalHistoryYears,
    OnTimePaymentsPercent,
    LatePaymentsCount,
    MonthlyRent,
    SecurityDeposit,
    LeaseTermMonths,
    Bedrooms,
    PropertyType,
    Location,
    MarketMedianRent,
    LocalUnemploymentRate,
    InflationRate,
}

impl FieldKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApplicantId => "applicant_id",
            Self::Name => "name",
            Self::Age => "age",
            Self::EmploymentStatus => "employment_status",
            Self::MonthlyIncome => "monthly_income",
            Self::EmploymentVerified => "employment_verified",
            Self::IncomeVerified => "income_verified",
            Self::CreditScore => "credit_score",
            Self::PreviousEvictions => "previous_evictions",
            Self::RentalHistoryYears => "rental_history_years",
            Self::OnTimePaymentsPercent => "on_time_payments_percent",
            Self::LatePaymentsCount => "late_payments_count",
            Self::MonthlyRent => "monthly_rent",
            Self::SecurityDeposit => "security_deposit",
            Self::LeaseTermMonths => "lease_term_months",
            Self::Bedrooms => "bedrooms",
            Self::PropertyType => "property_type",
            Self::Location => "location",
            Self::MarketMedianRent => "market_median_rent",
            Self::LocalUnemploymentRate => "local_unemployment_rate",
            Self::InflationRate => "inflation_rate",
        }
    }

    pub fn spec(self) -> &'static FieldSpec {
        &FIELDS[self as usize]
    }

    /// Current value of this field rendered as widget text.
    pub fn display_value(self, record: &ApplicationRecord) -> String {
        match self {
            Self::ApplicantId => record.applicant_id().to_string(),
            Self::Name => record.name.clone(),
            Self::Age => record.age.to_string(),
            Self::EmploymentStatus => record.employment_status.value().to_string(),
            Self::MonthlyIncome => record.monthly_income.to_string(),
            Self::EmploymentVerified => record.employment_verified.to_string(),
            Self::IncomeVerified => record.income_verified.to_string(),
            Self::CreditScore => record.credit_score.to_string(),
            Self::PreviousEvictions => record.previous_evictions.to_string(),
            Self::RentalHistoryYears => record.rental_history_years.to_string(),
            Self::OnTimePaymentsPercent => record.on_time_payments_percent.to_string(),
            Self::LatePaymentsCount => record.late_payments_count.to_string(),
            Self::MonthlyRent => record.monthly_rent.to_string(),
            Self::SecurityDeposit => record.security_deposit.to_string(),
            Self::LeaseTermMonths => record.lease_term_months.months().to_string(),
            Self::Bedrooms => record.bedrooms.get().to_string(),
            Self::PropertyType => record.property_type.value().to_string(),
            Self::Location => record.location.clone(),
            Self::MarketMedianRent => record.market_median_rent.to_string(),
            Self::LocalUnemploymentRate => record.local_unemployment_rate.to_string(),
            Self::InflationRate => record.inflation_rate.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldControl {
    ReadOnly,
    Text,
    Integer {
        min: i64,
        max: Option<i64>,
        fallback: i64,
    },
    /// Money and count widgets carry no explicit step, so browsers apply 1.
    Decimal {
        min: f64,
        max: Option<f64>,
        step: f64,
        fallback: f64,
    },
    Choice {
        options: &'static [ChoiceOption],
    },
    Checkbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub label: &'static str,
    pub section: FormSection,
    pub control: FieldControl,
    pub required: bool,
    pub placeholder: Option<&'static str>,
}

const EMPLOYMENT_OPTIONS: &[ChoiceOption] = &[
    ChoiceOption { value: "employed", label: "Employed" },
    ChoiceOption { value: "self-employed", label: "Self-Employed" },
    ChoiceOption { value: "unemployed", label: "Unemployed" },
];

const LEASE_TERM_OPTIONS: &[ChoiceOption] = &[
    ChoiceOption { value: "6", label: "6 Months" },
    ChoiceOption { value: "12", label: "12 Months" },
    ChoiceOption { value: "24", label: "24 Months" },
    ChoiceOption { value: "36", label: "36 Months" },
];

const BEDROOM_OPTIONS: &[ChoiceOption] = &[
    ChoiceOption { value: "1", label: "1 Bedroom" },
    ChoiceOption { value: "2", label: "2 Bedrooms" },
    ChoiceOption { value: "3", label: "3 Bedrooms" },
    ChoiceOption { value: "4", label: "4 Bedrooms" },
    ChoiceOption { value: "5", label: "5 Bedrooms" },
];

const PROPERTY_TYPE_OPTIONS: &[ChoiceOption] = &[
    ChoiceOption { value: "apartment", label: "Apartment" },
    ChoiceOption { value: "house", label: "House" },
    ChoiceOption { value: "condo", label: "Condo" },
    ChoiceOption { value: "townhouse", label: "Townhouse" },
];

const fn count() -> FieldControl {
    FieldControl::Integer {
        min: 0,
        max: None,
        fallback: 0,
    }
}

const fn money() -> FieldControl {
    FieldControl::Decimal {
        min: 0.0,
        max: None,
        step: 1.0,
        fallback: 0.0,
    }
}

const fn rate() -> FieldControl {
    FieldControl::Decimal {
        min: 0.0,
        max: Some(100.0),
        step: 0.1,
        fallback: 0.0,
    }
}

const fn field(
    key: FieldKey,
    label: &'static str,
    section: FormSection,
    control: FieldControl,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        key,
        label,
        section,
        control,
        required,
        placeholder: None,
    }
}

const fn with_placeholder(spec: FieldSpec, placeholder: &'static str) -> FieldSpec {
    FieldSpec {
        placeholder: Some(placeholder),
        ..spec
    }
}

use FieldKey as K;
use FormSection as S;

/// Indexed by `FieldKey as usize`.
pub static FIELDS: [FieldSpec; 21] = [
    field(K::ApplicantId, "Applicant ID", S::Personal, FieldControl::ReadOnly, false),
    with_placeholder(
        field(K::Name, "Full Name", S::Personal, FieldControl::Text, true),
        "John Doe",
    ),
    field(
        K::Age,
        "Age",
        S::Personal,
        FieldControl::Integer {
            min: 18,
            max: Some(120),
            fallback: 0,
        },
        true,
    ),
    field(
        K::EmploymentStatus,
        "Employment Status",
        S::EmploymentIncome,
        FieldControl::Choice {
            options: EMPLOYMENT_OPTIONS,
        },
        false,
    ),
    with_placeholder(
        field(K::MonthlyIncome, "Monthly Income ($)", S::EmploymentIncome, money(), true),
        "5000",
    ),
    field(
        K::EmploymentVerified,
        "Employment Verified",
        S::EmploymentIncome,
        FieldControl::Checkbox,
        false,
    ),
    field(
        K::IncomeVerified,
        "Income Verified",
        S::EmploymentIncome,
        FieldControl::Checkbox,
        false,
    ),
    field(
        K::CreditScore,
        "Credit Score (300-850)",
        S::CreditHistory,
        FieldControl::Integer {
            min: 300,
            max: Some(850),
            fallback: 300,
        },
        true,
    ),
    field(
        K::PreviousEvictions,
        "Previous Evictions",
        S::CreditHistory,
        count(),
        false,
    ),
    field(
        K::RentalHistoryYears,
        "Rental History (Years)",
        S::CreditHistory,
        money(),
        true,
    ),
    field(
        K::OnTimePaymentsPercent,
        "On-Time Payments (%)",
        S::CreditHistory,
        FieldControl::Decimal {
            min: 0.0,
            max: Some(100.0),
            step: 1.0,
            fallback: 0.0,
        },
        false,
    ),
    field(
        K::LatePaymentsCount,
        "Late Payments Count",
        S::CreditHistory,
        count(),
        false,
    ),
    with_placeholder(
        field(K::MonthlyRent, "Monthly Rent ($)", S::PropertyDetails, money(), true),
        "2000",
    ),
    field(
        K::SecurityDeposit,
        "Security Deposit ($)",
        S::PropertyDetails,
        money(),
        false,
    ),
    field(
        K::LeaseTermMonths,
        "Lease Term",
        S::PropertyDetails,
        FieldControl::Choice {
            options: LEASE_TERM_OPTIONS,
        },
        false,
    ),
    field(
        K::Bedrooms,
        "Bedrooms",
        S::PropertyDetails,
        FieldControl::Choice {
            options: BEDROOM_OPTIONS,
        },
        false,
    ),
    field(
        K::PropertyType,
        "Property Type",
        S::PropertyDetails,
        FieldControl::Choice {
            options: PROPERTY_TYPE_OPTIONS,
        },
        false,
    ),
    with_placeholder(
        field(K::Location, "Location", S::PropertyDetails, FieldControl::Text, false),
        "City, State",
    ),
    field(
        K::MarketMedianRent,
        "Market Median Rent ($)",
        S::MarketContext,
        money(),
        false,
    ),
    field(
        K::LocalUnemploymentRate,
        "Local Unemployment Rate (%)",
        S::MarketContext,
        rate(),
        false,
    ),
    field(
        K::InflationRate,
        "Inflation Rate (%)",
        S::MarketContext,
        rate(),
        false,
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormInputError {
    #[error("'{value}' is not an option for {field}")]
    InvalidChoice { field: &'static str, value: String },
}

fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(|value| value.trunc() as i64)
    })
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn checkbox_value(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}

fn integer_or_fallback(key: FieldKey, raw: &str) -> i64 {
    let fallback = match key.spec().control {
        FieldControl::Integer { fallback, .. } => fallback,
        _ => 0,
    };
    parse_integer(raw).unwrap_or(fallback)
}

fn decimal_or_fallback(key: FieldKey, raw: &str) -> f64 {
    let fallback = match key.spec().control {
        FieldControl::Decimal { fallback, .. } => fallback,
        _ => 0.0,
    };
    parse_decimal(raw).unwrap_or(fallback)
}

fn invalid_choice(key: FieldKey, raw: &str) -> FormInputError {
    FormInputError::InvalidChoice {
        field: key.as_str(),
        value: raw.to_string(),
    }
}

/// Bind one widget's text onto the record.
///
/// The applicant id is read-only and is never touched here.
pub fn apply_input(
    record: &mut ApplicationRecord,
    key: FieldKey,
    raw: &str,
) -> Result<(), FormInputError> {
    match key {
        FieldKey::ApplicantId => {}
        FieldKey::Name => record.name = raw.to_string(),
        FieldKey::Location => record.location = raw.to_string(),
        FieldKey::Age => record.age = integer_or_fallback(key, raw),
        FieldKey::CreditScore => record.credit_score = integer_or_fallback(key, raw),
        FieldKey::PreviousEvictions => record.previous_evictions = integer_or_fallback(key, raw),
        FieldKey::LatePaymentsCount => record.late_payments_count = integer_or_fallback(key, raw),
        FieldKey::MonthlyIncome => record.monthly_income = decimal_or_fallback(key, raw),
        FieldKey::RentalHistoryYears => {
            record.rental_history_years = decimal_or_fallback(key, raw)
        }
        FieldKey::OnTimePaymentsPercent => {
            record.on_time_payments_percent = decimal_or_fallback(key, raw)
        }
        FieldKey::MonthlyRent => record.monthly_rent = decimal_or_fallback(key, raw),
        FieldKey::SecurityDeposit => record.security_deposit = decimal_or_fallback(key, raw),
        FieldKey::MarketMedianRent => record.market_median_rent = decimal_or_fallback(key, raw),
        FieldKey::LocalUnemploymentRate => {
            record.local_unemployment_rate = decimal_or_fallback(key, raw)
        }
        FieldKey::InflationRate => record.inflation_rate = decimal_or_fallback(key, raw),
        FieldKey::EmploymentVerified => record.employment_verified = checkbox_value(raw),
        FieldKey::IncomeVerified => record.income_verified = checkbox_value(raw),
        FieldKey::EmploymentStatus => {
            record.employment_status =
                EmploymentStatus::from_value(raw).ok_or_else(|| invalid_choice(key, raw))?
        }
        FieldKey::PropertyType => {
            record.property_type =
                PropertyType::from_value(raw).ok_or_else(|| invalid_choice(key, raw))?
        }
        FieldKey::LeaseTermMonths => {
            record.lease_term_months = raw
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(|months| LeaseTerm::try_from(months).ok())
                .ok_or_else(|| invalid_choice(key, raw))?
        }
        FieldKey::Bedrooms => {
            record.bedrooms = raw
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(BedroomCount::new)
                .ok_or_else(|| invalid_choice(key, raw))?
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    Missing,
    BelowMinimum { min: f64 },
    AboveMaximum { max: f64 },
    StepMismatch { step: f64 },
    InvalidChoice { value: String },
}

/// A reason the browser would refuse to submit the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub key: FieldKey,
    pub kind: ViolationKind,
}

impl FieldViolation {
    pub fn message(&self) -> String {
        let label = self.key.spec().label;
        match &self.kind {
            ViolationKind::Missing => format!("{label} is required"),
            ViolationKind::BelowMinimum { min } => format!("{label} must be at least {min}"),
            ViolationKind::AboveMaximum { max } => format!("{label} must be at most {max}"),
            ViolationKind::StepMismatch { step } => {
                format!("{label} must be in increments of {step}")
            }
            ViolationKind::InvalidChoice { value } => {
                format!("'{value}' is not a valid {label}")
            }
        }
    }
}

fn numeric_violation(control: &FieldControl, raw: &str) -> Option<ViolationKind> {
    let (value, min, max, step) = match *control {
        FieldControl::Integer { min, max, .. } => (
            parse_decimal(raw)?,
            min as f64,
            max.map(|max| max as f64),
            1.0,
        ),
        FieldControl::Decimal { min, max, step, .. } => (parse_decimal(raw)?, min, max, step),
        _ => return None,
    };

    if value < min {
        return Some(ViolationKind::BelowMinimum { min });
    }
    if let Some(max) = max.filter(|max| value > *max) {
        return Some(ViolationKind::AboveMaximum { max });
    }
    let steps = (value - min) / step;
    if (steps - steps.round()).abs() > 1e-7 {
        return Some(ViolationKind::StepMismatch { step });
    }
    None
}

/// Result of binding a full browser submission.
#[derive(Debug, Clone)]
pub struct FormSubmission {
    pub record: ApplicationRecord,
    pub violations: Vec<FieldViolation>,
}

impl FormSubmission {
    /// Apply every posted field to a copy of `current` and collect the
    /// violations that would have blocked a native form submit.
    ///
    /// Checkboxes absent from `inputs` are unchecked. Other absent fields keep
    /// their current value unless they are required.
    pub fn bind(current: &ApplicationRecord, inputs: &HashMap<String, String>) -> Self {
        let mut record = current.clone();
        let mut violations = Vec::new();

        for spec in FIELDS.iter() {
            let key = spec.key;
            let raw = inputs.get(key.as_str()).map(String::as_str);

            match (spec.control, raw) {
                (FieldControl::ReadOnly, _) => continue,
                (FieldControl::Checkbox, raw) => {
                    let _ = apply_input(&mut record, key, raw.unwrap_or_default());
                    continue;
                }
                (_, None) => {
                    if spec.required {
                        violations.push(FieldViolation {
                            key,
                            kind: ViolationKind::Missing,
                        });
                    }
                    continue;
                }
                (control, Some(raw)) => {
                    let numeric = matches!(
                        control,
                        FieldControl::Integer { .. } | FieldControl::Decimal { .. }
                    );
                    // Browsers sanitize unparsable number text to an empty value.
                    let empty =
                        raw.is_empty() || (numeric && parse_decimal(raw).is_none());

                    if empty && spec.required {
                        violations.push(FieldViolation {
                            key,
                            kind: ViolationKind::Missing,
                        });
                    } else if let Some(kind) = numeric_violation(&control, raw) {
                        violations.push(FieldViolation { key, kind });
                    }

                    if let Err(FormInputError::InvalidChoice { value, .. }) =
                        apply_input(&mut record, key, raw)
                    {
                        violations.push(FieldViolation {
                            key,
                            kind: ViolationKind::InvalidChoice { value },
                        });
                    }
                }
            }
        }

        Self { record, violations }
    }

    pub fn is_blocked(&self) -> bool {
        !self.violations.is_empty()
    }
}

/// State of the submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitControl {
    pub disabled: bool,
    pub busy: bool,
    pub label: &'static str,
}

impl SubmitControl {
    pub const fn for_loading(loading: bool) -> Self {
        if loading {
            Self {
                disabled: true,
                busy: true,
                label: "Analyzing Risk...",
            }
        } else {
            Self {
                disabled: false,
                busy: false,
                label: "Calculate Risk Score",
            }
        }
    }
}
