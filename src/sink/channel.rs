use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::error::SinkError;
use crate::event::Event;

use super::Sink;

/// Hands forwarded events to a bounded channel without blocking the caller.
///
/// A consumer (typically a writer thread) drains the receiver. When the
/// channel is full or the receiver is gone the write fails and the event is
/// dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink<P> {
    name: String,
    tx: Sender<Event<P>>,
}

impl<P> ChannelSink<P> {
    /// Creates a sink and the receiver it feeds.
    #[must_use]
    pub fn bounded(name: impl Into<String>, capacity: usize) -> (Self, Receiver<Event<P>>) {
        let (tx, rx) = bounded(capacity.max(1));
        (
            Self {
                name: name.into(),
                tx,
            },
            rx,
        )
    }

    /// Wraps an existing sender.
    #[must_use]
    pub fn from_sender(name: impl Into<String>, tx: Sender<Event<P>>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }
}

impl<P: Send> Sink<P> for ChannelSink<P> {
    fn write(&self, event: Event<P>) -> Result<(), SinkError> {
        self.tx.try_send(event).map_err(|err| match err {
            TrySendError::Full(_) => SinkError::Full {
                sink: self.name.clone(),
            },
            TrySendError::Disconnected(_) => SinkError::Disconnected {
                sink: self.name.clone(),
            },
        })
    }
}
