use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use reqwest::Url;

use crate::scoring::presentation::RiskThresholds;

const DEFAULT_SCORING_BASE_URL: &str = "http://127.0.0.1:8000";
const SCORE_PATH: &str = "/api/score";
const DEFAULT_SESSION_CAPACITY: usize = 1024;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;
        let session_capacity = match env::var("SESSION_CAPACITY") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|capacity| *capacity > 0)
                .ok_or(ConfigError::InvalidSessionCapacity { value: raw })?,
            Err(_) => DEFAULT_SESSION_CAPACITY,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let base_url = env::var("SCORING_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_SCORING_BASE_URL.to_string());
        let endpoint = ScoringConfig::endpoint_for(&base_url)?;

        let timeout = match env::var("SCORING_API_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => None,
        };

        let defaults = RiskThresholds::default();
        let low = parse_threshold("RISK_TIER_LOW", defaults.low())?;
        let high = parse_threshold("RISK_TIER_HIGH", defaults.high())?;
        let thresholds =
            RiskThresholds::new(low, high).ok_or(ConfigError::InvalidThresholds { low, high })?;

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                session_capacity,
            },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig {
                endpoint,
                timeout,
                thresholds,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub session_capacity: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where and how the remote scoring service is reached.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub endpoint: Url,
    /// `None` leaves the request unbounded; only the transport can time it out.
    pub timeout: Option<Duration>,
    pub thresholds: RiskThresholds,
}

impl ScoringConfig {
    /// Resolve the score endpoint below a deployment-provided base URL.
    pub fn endpoint_for(base_url: &str) -> Result<Url, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let invalid = |reason: String| ConfigError::InvalidScoringUrl {
            value: base_url.to_string(),
            reason,
        };

        let base = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }

        Url::parse(&format!("{trimmed}{SCORE_PATH}")).map_err(|err| invalid(err.to_string()))
    }
}

fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidTimeout {
            value: raw.to_string(),
        })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

fn parse_threshold(var: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ConfigError::InvalidThreshold { var, value: raw }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSessionCapacity { value: String },
    InvalidScoringUrl { value: String, reason: String },
    InvalidTimeout { value: String },
    InvalidThreshold { var: &'static str, value: String },
    InvalidThresholds { low: f64, high: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSessionCapacity { value } => {
                write!(f, "SESSION_CAPACITY must be a positive integer, got '{value}'")
            }
            ConfigError::InvalidScoringUrl { value, reason } => {
                write!(f, "SCORING_API_BASE_URL '{value}' is not usable: {reason}")
            }
            ConfigError::InvalidTimeout { value } => write!(
                f,
                "SCORING_API_TIMEOUT_SECS must be a whole number of seconds, got '{value}'"
            ),
            ConfigError::InvalidThreshold { var, value } => {
                write!(f, "{var} must be a finite number, got '{value}'")
            }
            ConfigError::InvalidThresholds { low, high } => write!(
                f,
                "risk tier thresholds must satisfy low <= high (low {low}, high {high})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
