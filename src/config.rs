//! Recorder configuration.
//!
//! Options are supplied when a dispatcher is built and are immutable
//! afterwards. Misconfiguration is reported at that point, never while
//! handling events.

use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::level::Level;

/// Default number of buffered events retained per context.
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Configuration for a [`Dispatcher`](crate::recorder::Dispatcher).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use logrecorder::{Level, RecorderConfig};
///
/// let cfg = RecorderConfig::default()
///     .with_threshold(Level::Warn)
///     .with_max_size(3)
///     .with_max_age(Duration::from_millis(100));
/// assert!(cfg.validate().is_ok());
///
/// let parsed = RecorderConfig::from_json(r#"{"threshold": "warn", "max_size": 3}"#).unwrap();
/// assert_eq!(parsed.threshold, Level::Warn);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecorderConfig {
    /// Minimum severity that causes an immediate flush.
    pub threshold: Level,
    /// Maximum buffered events per context. `0` disables buffering.
    pub max_size: usize,
    /// Maximum age of a buffered event in milliseconds. `None` means unbounded.
    pub max_age_ms: Option<u64>,
    /// Keep the logging call site on forwarded events.
    pub include_caller_data: bool,
    /// Upper bound on tracked contexts. `None` means unbounded.
    pub max_contexts: Option<usize>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            threshold: Level::Error,
            max_size: DEFAULT_MAX_SIZE,
            max_age_ms: None,
            include_caller_data: false,
            max_contexts: None,
        }
    }
}

impl RecorderConfig {
    /// Parses a JSON document. Missing options take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Sets the lowest level that flushes the context's history.
    #[must_use]
    pub fn with_threshold(mut self, threshold: Level) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets how many sub-threshold events each context retains. Zero disables buffering.
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Drops buffered events older than `max_age`, at millisecond precision.
    #[must_use]
    pub fn with_max_age(mut self, max_age: StdDuration) -> Self {
        self.max_age_ms = Some(u64::try_from(max_age.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Keeps buffered events regardless of age.
    #[must_use]
    pub fn with_unbounded_age(mut self) -> Self {
        self.max_age_ms = None;
        self
    }

    /// Keeps the call site on forwarded events.
    #[must_use]
    pub fn with_caller_data(mut self, include: bool) -> Self {
        self.include_caller_data = include;
        self
    }

    /// Bounds the number of tracked contexts, evicting the least recently used.
    #[must_use]
    pub fn with_max_contexts(mut self, max_contexts: usize) -> Self {
        self.max_contexts = Some(max_contexts);
        self
    }

    /// Checks option ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_contexts == Some(0) {
            return Err(ConfigError::invalid("max_contexts", "must be at least 1"));
        }
        self.max_age()?;
        Ok(())
    }

    /// The age limit as a signed duration, if bounded.
    pub fn max_age(&self) -> Result<Option<Duration>, ConfigError> {
        let Some(ms) = self.max_age_ms else {
            return Ok(None);
        };
        i64::try_from(ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .map(Some)
            .ok_or_else(|| ConfigError::invalid("max_age_ms", format!("{ms}ms is out of range")))
    }
}
