//! Log events.
//!
//! An [`Event`] is an immutable record: severity, timestamp, calling context
//! and an opaque payload that this crate never inspects. The logging call
//! site is captured when the event is built, so events flushed later still
//! report where they were logged rather than where the flush happened.

use std::panic::Location;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::context::ContextId;
use crate::level::Level;

/// Source location of a logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CallerData {
    /// Source file of the call.
    pub file: &'static str,
    /// Line of the call.
    pub line: u32,
    /// Column of the call.
    pub column: u32,
}

impl CallerData {
    /// Captures the location of the caller.
    #[must_use]
    #[track_caller]
    pub fn capture() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for CallerData {
    fn from(loc: &'static Location<'static>) -> Self {
        Self {
            file: loc.file(),
            line: loc.line(),
            column: loc.column(),
        }
    }
}

/// A single log event.
///
/// # Examples
///
/// ```
/// use logrecorder::{ContextId, Event, Level};
///
/// let event = Event::new(Level::Info, ContextId::current(), "connected");
/// assert_eq!(event.level(), Level::Info);
/// assert_eq!(*event.payload(), "connected");
/// assert!(event.caller().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event<P> {
    timestamp: DateTime<Utc>,
    level: Level,
    context: ContextId,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller: Option<CallerData>,
    payload: P,
}

impl<P> Event<P> {
    /// Creates an event stamped with the current wall-clock time.
    #[must_use]
    #[track_caller]
    pub fn new(level: Level, context: ContextId, payload: P) -> Self {
        Self::at(level, Utc::now(), context, payload)
    }

    /// Creates an event with an explicit timestamp.
    #[must_use]
    #[track_caller]
    pub fn at(level: Level, timestamp: DateTime<Utc>, context: ContextId, payload: P) -> Self {
        Self {
            timestamp,
            level,
            context,
            caller: Some(CallerData::capture()),
            payload,
        }
    }

    /// Severity of the event.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// When the event was logged.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The calling context that logged the event.
    #[must_use]
    pub const fn context(&self) -> ContextId {
        self.context
    }

    /// Where the event was logged, if caller data was retained.
    #[must_use]
    pub const fn caller(&self) -> Option<&CallerData> {
        self.caller.as_ref()
    }

    /// The opaque payload.
    #[must_use]
    pub const fn payload(&self) -> &P {
        &self.payload
    }

    /// Consumes the event, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Replaces the payload, keeping every other field.
    #[must_use]
    pub fn map_payload<Q>(self, f: impl FnOnce(P) -> Q) -> Event<Q> {
        Event {
            timestamp: self.timestamp,
            level: self.level,
            context: self.context,
            caller: self.caller,
            payload: f(self.payload),
        }
    }

    pub(crate) fn without_caller(mut self) -> Self {
        self.caller = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_captures_call_site() {
        let line = line!() + 1;
        let event = Event::new(Level::Debug, ContextId::new(), ());
        let caller = event.caller().unwrap();
        assert!(caller.file.ends_with("event.rs"));
        assert_eq!(caller.line, line);
    }

    #[test]
    fn without_caller_strips_location_only() {
        let ctx = ContextId::new();
        let event = Event::new(Level::Warn, ctx, 7u32).without_caller();
        assert!(event.caller().is_none());
        assert_eq!(event.level(), Level::Warn);
        assert_eq!(event.context(), ctx);
        assert_eq!(event.into_payload(), 7);
    }

    #[test]
    fn map_payload_keeps_metadata() {
        let ts = Utc::now();
        let event = Event::at(Level::Info, ts, ContextId::new(), 2u8);
        let mapped = event.clone().map_payload(|n| format!("n={n}"));
        assert_eq!(mapped.timestamp(), ts);
        assert_eq!(mapped.caller(), event.caller());
        assert_eq!(mapped.payload(), "n=2");
    }

    #[test]
    fn serializes_as_flat_document() {
        let ctx = ContextId::new();
        let event = Event::new(Level::Error, ctx, "boom").without_caller();
        let doc = serde_json::to_value(&event).unwrap();
        assert_eq!(doc["level"], "ERROR");
        assert_eq!(doc["payload"], "boom");
        assert_eq!(doc["context"], ctx.to_string());
        assert!(doc.get("caller").is_none());
    }
}
