pub mod redactor;
pub mod macros;
pub mod config;

pub use redactor::*;
pub use config::*;

#[doc(hidden)]
pub use tracing as __tracing;

use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt, EnvFilter};

/// Logging bootstrap with PII redaction for authentication events
///
/// Installs a `tracing` subscriber once per process. `RUST_LOG` wins over the
/// configured level. Audit log lines that mention emails or IP addresses are
/// passed through [`PiiRedactor`] by their emitters; the audit records kept by
/// the audit engine are never redacted.
///
/// # Example
///
/// ```rust
/// use logger_redacted::{init, LoggerConfig};
///
/// init(&LoggerConfig::default()).unwrap();
/// tracing::info!("gatehouse started");
/// ```
#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },
}

pub fn init(config: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| LoggerError::InvalidFilter {
            directive: config.log_level.clone(),
            reason: e.to_string(),
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().compact().with_target(true)).try_init()
    };

    // A second initialisation (tests, embedded use) keeps the first subscriber
    if let Err(e) = installed {
        tracing::debug!(error = %e, "Logger already initialised");
    }

    Ok(())
}
