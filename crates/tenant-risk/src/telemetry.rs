use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::{Compact, DefaultFields, Format};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(
                    f,
                    "invalid log level/filter '{}': unable to build EnvFilter",
                    value
                )
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => {
            EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::EnvFilter {
                value: config.log_level.clone(),
                source,
            })
        }
    }
}

/// Compact, uncolored output on stdout.
fn subscriber(
    config: &TelemetryConfig,
) -> Result<SubscriberBuilder<DefaultFields, Format<Compact>, EnvFilter>, TelemetryError> {
    let env_filter = env_filter(config)?;

    Ok(tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false))
}

/// Install the global subscriber.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    subscriber(config)?
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[test]
    fn rejects_malformed_filter_directives() {
        std::env::remove_var("RUST_LOG");
        let config = TelemetryConfig {
            log_level: "tenant_risk=verbose".to_string(),
        };

        match env_filter(&config) {
            Err(TelemetryError::EnvFilter { value, .. }) => assert_eq!(value, "tenant_risk=verbose"),
            other => panic!("expected filter error, got {other:?}"),
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("capture mutex poisoned").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn log_lines_carry_no_color_codes() {
        std::env::remove_var("RUST_LOG");
        let config = TelemetryConfig {
            log_level: "info".to_string(),
        };
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = subscriber(&config)
            .expect("valid filter")
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(applicant_id = "APP-1", "scoring service unavailable");
        });

        let output = String::from_utf8(captured.0.lock().expect("capture mutex poisoned").clone())
            .expect("utf8 log output");
        assert!(output.contains("scoring service unavailable"), "{output}");
        assert!(output.contains("applicant_id=\"APP-1\""), "{output}");
        assert!(!output.contains('\u{1b}'), "{output:?}");
    }
}
