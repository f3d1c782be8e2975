use parking_lot::Mutex;

use crate::error::SinkError;
use crate::event::Event;

use super::Sink;

/// Collects forwarded events in memory, in arrival order.
#[derive(Debug)]
pub struct MemorySink<P> {
    events: Mutex<Vec<Event<P>>>,
}

impl<P> MemorySink<P> {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Number of events written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Removes and returns everything written so far.
    pub fn take(&self) -> Vec<Event<P>> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl<P: Clone> MemorySink<P> {
    /// Copies of the written events.
    #[must_use]
    pub fn events(&self) -> Vec<Event<P>> {
        self.events.lock().clone()
    }

    /// Copies of the written payloads.
    #[must_use]
    pub fn payloads(&self) -> Vec<P> {
        self.events.lock().iter().map(|e| e.payload().clone()).collect()
    }
}

impl<P> Default for MemorySink<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Send> Sink<P> for MemorySink<P> {
    fn write(&self, event: Event<P>) -> Result<(), SinkError> {
        self.events.lock().push(event);
        Ok(())
    }
}
