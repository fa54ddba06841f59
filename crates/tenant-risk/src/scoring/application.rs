use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier issued once when an application page is opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(pub String);

static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

impl ApplicantId {
    const PREFIX: &'static str = "APP-";

    /// `APP-<unix millis>`, never repeating within this process.
    pub fn generate() -> Self {
        let now = Utc::now().timestamp_millis();
        let mut previous = LAST_ISSUED_MILLIS.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(previous + 1);
            match LAST_ISSUED_MILLIS.compare_exchange_weak(
                previous,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Self(format!("{}{candidate}", Self::PREFIX)),
                Err(actual) => previous = actual,
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentStatus {
    #[default]
    Employed,
    SelfEmployed,
    Unemployed,
}

impl EmploymentStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Employed, Self::SelfEmployed, Self::Unemployed]
    }

    pub const fn value(self) -> &'static str {
        match self {
            Self::Employed => "employed",
            Self::SelfEmployed => "self-employed",
            Self::Unemployed => "unemployed",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Employed => "Employed",
            Self::SelfEmployed => "Self-Employed",
            Self::Unemployed => "Unemployed",
        }
    }

    pub fn from_value(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|status| status.value() == raw.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    Apartment,
    House,
    Condo,
    Townhouse,
}

impl PropertyType {
    pub const fn ordered() -> [Self; 4] {
        [Self::Apartment, Self::House, Self::Condo, Self::Townhouse]
    }

    pub const fn value(self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::House => "house",
            Self::Condo => "condo",
            Self::Townhouse => "townhouse",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Apartment => "Apartment",
            Self::House => "House",
            Self::Condo => "Condo",
            Self::Townhouse => "Townhouse",
        }
    }

    pub fn from_value(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.value() == raw.trim())
    }
}

/// Lease length offered by the form; travels over the wire as a month count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum LeaseTerm {
    Six,
    #[default]
    Twelve,
    TwentyFour,
    ThirtySix,
}

impl LeaseTerm {
    pub const fn ordered() -> [Self; 4] {
        [Self::Six, Self::Twelve, Self::TwentyFour, Self::ThirtySix]
    }

    pub const fn months(self) -> u32 {
        match self {
            Self::Six => 6,
            Self::Twelve => 12,
            Self::TwentyFour => 24,
            Self::ThirtySix => 36,
        }
    }
}

impl TryFrom<u32> for LeaseTerm {
    type Error = String;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        Self::ordered()
            .into_iter()
            .find(|term| term.months() == months)
            .ok_or_else(|| format!("unsupported lease term of {months} months"))
    }
}

impl From<LeaseTerm> for u32 {
    fn from(term: LeaseTerm) -> Self {
        term.months()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BedroomCount(u8);

impl BedroomCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(count: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&count).then_some(Self(count))
    }

    pub fn ordered() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for BedroomCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for BedroomCount {
    type Error = String;

    fn try_from(count: u8) -> Result<Self, Self::Error> {
        Self::new(count).ok_or_else(|| format!("unsupported bedroom count {count}"))
    }
}

impl From<BedroomCount> for u8 {
    fn from(count: BedroomCount) -> Self {
        count.0
    }
}

/// Everything the scoring service receives for one applicant.
///
/// Field names are the wire contract. Numeric fields are signed on purpose:
/// widget minimums are a UI convention and programmatic submissions may carry
/// values outside them unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    applicant_id: ApplicantId,
    pub name: String,
    pub age: i64,
    pub employment_status: EmploymentStatus,
    pub monthly_income: f64,
    pub employment_verified: bool,
    pub income_verified: bool,
    pub credit_score: i64,
    pub previous_evictions: i64,
    pub rental_history_years: f64,
    pub on_time_payments_percent: f64,
    pub late_payments_count: i64,
    pub monthly_rent: f64,
    pub security_deposit: f64,
    pub lease_term_months: LeaseTerm,
    pub bedrooms: BedroomCount,
    pub property_type: PropertyType,
    pub location: String,
    pub market_median_rent: f64,
    pub local_unemployment_rate: f64,
    pub inflation_rate: f64,
}

impl ApplicationRecord {
    /// Fresh record with defaults and a newly issued applicant id.
    pub fn new() -> Self {
        Self::with_applicant_id(ApplicantId::generate())
    }

    pub fn with_applicant_id(applicant_id: ApplicantId) -> Self {
        Self {
            applicant_id,
            name: String::new(),
            age: 30,
            employment_status: EmploymentStatus::default(),
            monthly_income: 0.0,
            employment_verified: false,
            income_verified: false,
            credit_score: 650,
            previous_evictions: 0,
            rental_history_years: 0.0,
            on_time_payments_percent: 100.0,
            late_payments_count: 0,
            monthly_rent: 0.0,
            security_deposit: 0.0,
            lease_term_months: LeaseTerm::default(),
            bedrooms: BedroomCount::default(),
            property_type: PropertyType::default(),
            location: String::new(),
            market_median_rent: 0.0,
            local_unemployment_rate: 5.0,
            inflation_rate: 3.0,
        }
    }

    pub fn applicant_id(&self) -> &ApplicantId {
        &self.applicant_id
    }

    /// Merge a partial JSON object onto a fresh record. Any `applicant_id`
    /// in the input is ignored; the fresh record's id is kept.
    pub fn overlay(partial: &Value) -> Result<Self, serde_json::Error> {
        let base = Self::new();
        let mut merged = match serde_json::to_value(&base)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        if let Value::Object(fields) = partial {
            for (key, value) in fields {
                if key != "applicant_id" {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }

        serde_json::from_value(Value::Object(merged))
    }

    /// Values the form widgets would not have produced.
    pub fn bound_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut check = |field: &str, value: f64, min: f64, max: Option<f64>| {
            if value < min || max.is_some_and(|max| value > max) {
                violations.push(format!("{field}={value}"));
            }
        };

        check("age", self.age as f64, 18.0, Some(120.0));
        check("monthly_income", self.monthly_income, 0.0, None);
        check("credit_score", self.credit_score as f64, 300.0, Some(850.0));
        check("previous_evictions", self.previous_evictions as f64, 0.0, None);
        check("rental_history_years", self.rental_history_years, 0.0, None);
        check(
            "on_time_payments_percent",
            self.on_time_payments_percent,
            0.0,
            Some(100.0),
        );
        check("late_payments_count", self.late_payments_count as f64, 0.0, None);
        check("monthly_rent", self.monthly_rent, 0.0, None);
        check("security_deposit", self.security_deposit, 0.0, None);
        check("market_median_rent", self.market_median_rent, 0.0, None);
        check(
            "local_unemployment_rate",
            self.local_unemployment_rate,
            0.0,
            Some(100.0),
        );
        check("inflation_rate", self.inflation_rate, 0.0, Some(100.0));

        if self.name.is_empty() {
            violations.push("name is empty".to_string());
        }

        violations
    }
}

impl Default for ApplicationRecord {
    fn default() -> Self {
        Self::new()
    }
}
