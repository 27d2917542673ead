use std::time::Duration;

use start_verify_core::ParseError;

use crate::monitor::MonitorStage;

/// Errors reported by a vehicle connection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VehicleError {
    #[error("Vehicle rejected request: {0}")]
    Rejected(String),

    #[error("Vehicle connection lost")]
    Disconnected,

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Errors that end a verification run without a verdict.
///
/// Failed mission checks are not errors: they are reported through
/// [`ExecutionVerdict`](start_verify_core::ExecutionVerdict).
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Malformed mission file: {0}")]
    Parse(#[from] ParseError),

    #[error("Timed out after {limit:?} while {stage}")]
    TimedOut { limit: Duration, stage: MonitorStage },

    #[error("Vehicle error: {0}")]
    Vehicle(#[from] VehicleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl VerifyError {
    /// Whether the run failed because the observation pipeline ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, VerifyError::TimedOut { .. })
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
