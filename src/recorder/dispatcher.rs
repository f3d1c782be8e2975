//! Event dispatcher.
//!
//! Sub-threshold events are buffered in their context's history and never
//! reach the sink on their own. A triggering event drains that history and
//! forwards it, followed by the trigger, to the sink. Everything runs on the
//! caller's thread: there is no worker, queue or suspension point.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::RecorderConfig;
use crate::context::ContextId;
use crate::error::{FlushError, RecorderResult, SinkFailure};
use crate::event::Event;
use crate::level::Level;
use crate::sink::Sink;

use super::policy::TriggerPolicy;
use super::registry::Registry;

/// What `handle` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Buffered in the context's history.
    Buffered,
    /// Dropped because buffering is disabled (`max_size = 0`).
    Discarded,
    /// History and trigger were forwarded to the sink.
    Flushed {
        /// Events forwarded, trigger included.
        forwarded: usize,
    },
}

/// Point-in-time dispatcher counters.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    pub buffered: u64,
    pub evicted: u64,
    pub discarded: u64,
    pub flushes: u64,
    pub forwarded: u64,
    pub sink_failures: u64,
    pub evicted_contexts: u64,
}

#[derive(Debug, Default)]
struct Counters {
    buffered: AtomicU64,
    evicted: AtomicU64,
    discarded: AtomicU64,
    flushes: AtomicU64,
    forwarded: AtomicU64,
    sink_failures: AtomicU64,
}

/// Conditional buffering front for a sink.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use logrecorder::{Dispatcher, Level, MemorySink, RecorderConfig};
///
/// let sink = Arc::new(MemorySink::new());
/// let recorder = Dispatcher::new(RecorderConfig::default(), Arc::clone(&sink)).unwrap();
///
/// recorder.log(Level::Debug, "opening").unwrap();
/// recorder.log(Level::Info, "reading").unwrap();
/// assert!(sink.is_empty());
///
/// recorder.log(Level::Error, "failed").unwrap();
/// assert_eq!(sink.payloads(), vec!["opening", "reading", "failed"]);
/// ```
pub struct Dispatcher<P, S> {
    config: RecorderConfig,
    policy: TriggerPolicy,
    registry: Registry<P>,
    sink: S,
    clock: Arc<dyn Clock>,
    counters: Counters,
}

impl<P, S> Dispatcher<P, S>
where
    S: Sink<P>,
{
    /// Builds a dispatcher using the wall clock.
    pub fn new(config: RecorderConfig, sink: S) -> RecorderResult<Self> {
        Self::with_clock(config, sink, Arc::new(SystemClock))
    }

    /// Builds a dispatcher with an explicit time source.
    pub fn with_clock(config: RecorderConfig, sink: S, clock: Arc<dyn Clock>) -> RecorderResult<Self> {
        config.validate()?;
        let max_age = config.max_age()?;
        Ok(Self {
            policy: TriggerPolicy::new(config.threshold),
            registry: Registry::new(config.max_size, max_age, config.max_contexts),
            config,
            sink,
            clock,
            counters: Counters::default(),
        })
    }

    /// Logs `payload` from the current thread's context.
    #[track_caller]
    pub fn log(&self, level: Level, payload: P) -> RecorderResult<Dispatch> {
        self.log_in(ContextId::current(), level, payload)
    }

    /// Logs `payload` on behalf of an explicit context.
    #[track_caller]
    pub fn log_in(&self, context: ContextId, level: Level, payload: P) -> RecorderResult<Dispatch> {
        self.handle(Event::at(level, self.clock.now(), context, payload))
    }

    /// Buffers or flushes a single event.
    ///
    /// A triggering event is always forwarded, and the sink is flushed after
    /// every batch. If any sink write fails the remaining events are still
    /// attempted, the history is still emptied, and the failures are returned
    /// as [`FlushError`].
    ///
    /// With `max_size = 0` nothing is buffered, so no history is created for
    /// the context.
    pub fn handle(&self, event: Event<P>) -> RecorderResult<Dispatch> {
        let event = if self.config.include_caller_data {
            event
        } else {
            event.without_caller()
        };
        let context = event.context();
        let buffering = self.config.max_size > 0;

        if !self.policy.is_trigger(&event) {
            if !buffering {
                self.counters.discarded.fetch_add(1, Ordering::Relaxed);
                return Ok(Dispatch::Discarded);
            }
            let history = self.registry.get_or_create(context);
            let evicted = history.lock().append(event, self.clock.now());
            self.counters.buffered.fetch_add(1, Ordering::Relaxed);
            self.counters.evicted.fetch_add(evicted as u64, Ordering::Relaxed);
            return Ok(Dispatch::Buffered);
        }

        // Release the history before touching the sink.
        let batch = if buffering {
            self.registry.get_or_create(context).lock().drain(self.clock.now())
        } else {
            Vec::new()
        };
        self.flush(context, batch, event)
    }

    fn flush(&self, context: ContextId, batch: Vec<Event<P>>, trigger: Event<P>) -> RecorderResult<Dispatch> {
        let attempted = batch.len() + 1;
        let mut failures = Vec::new();

        for (position, event) in batch.into_iter().chain(std::iter::once(trigger)).enumerate() {
            if let Err(error) = self.sink.write(event) {
                warn!(%context, position, %error, "sink write failed during flush");
                failures.push(SinkFailure { position, error });
            }
        }

        let sink_flush = self.sink.flush().err();
        if let Some(error) = &sink_flush {
            warn!(%context, %error, "sink flush failed");
        }

        let delivered = attempted - failures.len();
        self.counters.flushes.fetch_add(1, Ordering::Relaxed);
        self.counters.forwarded.fetch_add(delivered as u64, Ordering::Relaxed);
        debug!(%context, attempted, delivered, "flushed context history");

        let failed = failures.len() + usize::from(sink_flush.is_some());
        if failed == 0 {
            return Ok(Dispatch::Flushed { forwarded: attempted });
        }
        self.counters.sink_failures.fetch_add(failed as u64, Ordering::Relaxed);
        Err(FlushError {
            attempted,
            delivered,
            failures,
            sink_flush,
        }
        .into())
    }

    /// Discards everything buffered for `context` and stops tracking it.
    ///
    /// Hosts call this when a task or request finishes so short-lived contexts
    /// do not accumulate. Returns true if the context was tracked.
    pub fn forget_context(&self, context: ContextId) -> bool {
        self.registry.remove(context)
    }

    /// Number of events currently buffered for `context`.
    #[must_use]
    pub fn buffered_len(&self, context: ContextId) -> usize {
        self.registry
            .get(context)
            .as_ref()
            .map_or(0, |history| history.lock().len())
    }

    /// Number of contexts with a history.
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.registry.len()
    }

    /// Snapshot of the dispatcher counters.
    #[must_use]
    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            buffered: self.counters.buffered.load(Ordering::Relaxed),
            evicted: self.counters.evicted.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
            flushes: self.counters.flushes.load(Ordering::Relaxed),
            forwarded: self.counters.forwarded.load(Ordering::Relaxed),
            sink_failures: self.counters.sink_failures.load(Ordering::Relaxed),
            evicted_contexts: self.registry.evicted_contexts(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// The trigger policy derived from the configuration.
    #[must_use]
    pub const fn policy(&self) -> &TriggerPolicy {
        &self.policy
    }

    /// The downstream sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }
}

impl<P, S> fmt::Debug for Dispatcher<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("contexts", &self.registry.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
