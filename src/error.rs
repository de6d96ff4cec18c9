use thiserror::Error;

/// Failure outcomes at the crate's I/O boundaries.
///
/// None of these are fatal: callers branch on them, log, and keep running with
/// the previous state or the built-in defaults.
#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Geocoder unavailable: {0}")]
    GeocodeUnavailable(String),

    #[error("Directory merge skipped: {0}")]
    Directory(String),

    #[error("Malformed telemetry payload: {0}")]
    Malformed(String),

    #[error("Telemetry transport error: {0}")]
    Transport(String),

    #[error("Telemetry socket not bound")]
    NotBound,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Replay source error: {0}")]
    Replay(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for sentinel operations
pub type SentinelResult<T> = Result<T, SentinelError>;

impl SentinelError {
    /// Transient errors are retried on the next cycle without any escalation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SentinelError::Transport(_) | SentinelError::NotBound | SentinelError::Io(_)
        )
    }
}
