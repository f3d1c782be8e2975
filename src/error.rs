//! Error types for logrecorder.
//!
//! All errors are strongly typed using thiserror. Configuration problems are
//! reported when a dispatcher is built; the only runtime failure surface is
//! the sink during a flush.

use thiserror::Error;

/// Errors raised while building or validating a recorder configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown severity level '{name}' (expected TRACE, DEBUG, INFO, WARN or ERROR)")]
    UnknownLevel {
        name: String,
    },

    #[error("Invalid value for option '{option}': {reason}")]
    InvalidOption {
        option: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {message}")]
    Parse {
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid-option error.
    #[must_use]
    pub fn invalid(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by a [`Sink`](crate::sink::Sink) write.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize event: {message}")]
    Serialization {
        message: String,
    },

    #[error("Sink '{sink}' is full")]
    Full {
        sink: String,
    },

    #[error("Sink '{sink}' is disconnected")]
    Disconnected {
        sink: String,
    },

    #[error("Sink rejected event: {reason}")]
    Rejected {
        reason: String,
    },
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return Self::Io(err.into());
        }
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

/// One failed write inside a flush.
#[derive(Debug)]
pub struct SinkFailure {
    /// Position of the event inside the flushed batch (the trigger is last).
    pub position: usize,
    /// The sink's error.
    pub error: SinkError,
}

/// A flush completed, but the sink did not accept all of it.
///
/// Delivery is best-effort: every event of the batch was attempted, the sink
/// was asked to flush its own buffers, and the history was emptied regardless.
#[derive(Debug, Error)]
#[error(
    "Flush of {attempted} forwarded events incomplete: {}",
    flush_summary(.failures, .sink_flush.as_ref())
)]
pub struct FlushError {
    /// Number of events the flush tried to forward.
    pub attempted: usize,
    /// Number of events the sink accepted.
    pub delivered: usize,
    /// Every failed write, in batch order.
    pub failures: Vec<SinkFailure>,
    /// Error from the sink's own flush after the batch was written.
    pub sink_flush: Option<SinkError>,
}

impl FlushError {
    /// Returns true if the trigger event itself failed to write.
    #[must_use]
    pub fn trigger_lost(&self) -> bool {
        self.failures
            .iter()
            .any(|f| f.position + 1 == self.attempted)
    }
}

fn flush_summary(failures: &[SinkFailure], sink_flush: Option<&SinkError>) -> String {
    let mut parts = Vec::new();
    if !failures.is_empty() {
        parts.push(format!("{} failed to write", failures.len()));
    }
    if let Some(error) = sink_flush {
        parts.push(format!("sink flush failed: {error}"));
    }
    parts.join("; ")
}

/// Top-level error type for logrecorder.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Flush error: {0}")]
    Flush(#[from] FlushError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl RecorderError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is a flush error.
    #[must_use]
    pub const fn is_flush(&self) -> bool {
        matches!(self, Self::Flush(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for logrecorder operations.
pub type RecorderResult<T> = Result<T, RecorderError>;
