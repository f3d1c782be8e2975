//! Trigger decision.

use crate::event::Event;
use crate::level::Level;

/// Decides whether an event flushes its context's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerPolicy {
    threshold: Level,
}

impl TriggerPolicy {
    /// Flush on events at or above `threshold`.
    #[must_use]
    pub const fn new(threshold: Level) -> Self {
        Self { threshold }
    }

    /// The configured threshold.
    #[must_use]
    pub const fn threshold(&self) -> Level {
        self.threshold
    }

    /// True if `event` meets or exceeds the threshold.
    #[must_use]
    pub fn is_trigger<P>(&self, event: &Event<P>) -> bool {
        event.level() >= self.threshold
    }
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self::new(Level::Error)
    }
}
