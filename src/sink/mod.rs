//! Downstream sinks.
//!
//! A sink receives forwarded events in order. The dispatcher depends only on
//! the [`Sink`] capability, never on a concrete writer.

/// Non-blocking hand-off to a bounded channel.
pub mod channel;
/// Newline-delimited JSON documents.
pub mod json;
/// In-memory event list.
pub mod memory;

use std::sync::Arc;

use crate::error::SinkError;
use crate::event::Event;

pub use channel::ChannelSink;
pub use json::JsonLinesSink;
pub use memory::MemorySink;

/// A write-capable destination for forwarded events.
///
/// Writes for one context arrive in logging order. Writes from different
/// contexts may interleave; a sink that needs a total order must synchronize
/// internally.
pub trait Sink<P>: Send + Sync {
    /// Writes one event.
    fn write(&self, event: Event<P>) -> Result<(), SinkError>;

    /// Flushes buffered output, if the sink buffers. The dispatcher calls
    /// this once after every forwarded batch.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<P, S> Sink<P> for Arc<S>
where
    S: Sink<P> + ?Sized,
{
    fn write(&self, event: Event<P>) -> Result<(), SinkError> {
        (**self).write(event)
    }

    fn flush(&self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

impl<P, S> Sink<P> for Box<S>
where
    S: Sink<P> + ?Sized,
{
    fn write(&self, event: Event<P>) -> Result<(), SinkError> {
        (**self).write(event)
    }

    fn flush(&self) -> Result<(), SinkError> {
        (**self).flush()
    }
}
