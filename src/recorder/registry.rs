//! Concurrent mapping from calling context to its history.
//!
//! Creation is the only synchronized step. Without a context bound it is a
//! single insert-if-absent on a sharded map, so contexts never contend with
//! each other and one context can never end up with two histories. With a
//! bound, the histories live in an LRU cache behind one lock, which keeps
//! lookup, promotion and eviction O(1). Once handed out, a history is locked
//! only by its owning context, which keeps that lock uncontended.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Duration;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::context::ContextId;

use super::history::History;

/// A history shared between the registry and its owning context.
pub type SharedHistory<P> = Arc<Mutex<History<P>>>;

#[derive(Debug)]
enum Store<P> {
    Unbounded(DashMap<ContextId, SharedHistory<P>>),
    Bounded(Mutex<LruCache<ContextId, SharedHistory<P>>>),
}

/// Per-context history store.
///
/// Entries are never removed by normal operation. With `max_contexts` set,
/// creating a context beyond the bound evicts the least recently used one and
/// discards its buffered events. The bound is exact: the registry never
/// holds more than `max_contexts` entries.
#[derive(Debug)]
pub struct Registry<P> {
    store: Store<P>,
    max_size: usize,
    max_age: Option<Duration>,
    evicted_contexts: AtomicU64,
}

impl<P> Registry<P> {
    /// Creates an empty registry whose histories use the given bounds.
    ///
    /// A `max_contexts` of zero means no bound.
    #[must_use]
    pub fn new(max_size: usize, max_age: Option<Duration>, max_contexts: Option<usize>) -> Self {
        let store = match max_contexts.and_then(NonZeroUsize::new) {
            Some(cap) => Store::Bounded(Mutex::new(LruCache::new(cap))),
            None => Store::Unbounded(DashMap::new()),
        };
        Self {
            store,
            max_size,
            max_age,
            evicted_contexts: AtomicU64::new(0),
        }
    }

    /// Returns the history for `context`, creating an empty one if absent.
    pub fn get_or_create(&self, context: ContextId) -> SharedHistory<P> {
        match &self.store {
            Store::Unbounded(entries) => {
                if let Some(history) = entries.get(&context) {
                    return Arc::clone(history.value());
                }
                let history = match entries.entry(context) {
                    Entry::Occupied(slot) => return Arc::clone(slot.get()),
                    Entry::Vacant(vacant) => Arc::clone(vacant.insert(self.fresh_history()).value()),
                };
                trace!(%context, "created context history");
                history
            }
            Store::Bounded(cache) => {
                let mut cache = cache.lock();
                if let Some(history) = cache.get(&context) {
                    return Arc::clone(history);
                }
                let history = self.fresh_history();
                let evicted = cache.push(context, Arc::clone(&history));
                drop(cache);

                trace!(%context, "created context history");
                if let Some((victim, discarded)) = evicted {
                    self.evicted_contexts.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        context = %victim,
                        discarded = discarded.lock().len(),
                        "evicted least recently used context"
                    );
                }
                history
            }
        }
    }

    /// Returns the history for `context` without creating one.
    ///
    /// Does not count as a use for LRU ordering.
    #[must_use]
    pub fn get(&self, context: ContextId) -> Option<SharedHistory<P>> {
        match &self.store {
            Store::Unbounded(entries) => entries.get(&context).map(|h| Arc::clone(h.value())),
            Store::Bounded(cache) => cache.lock().peek(&context).map(Arc::clone),
        }
    }

    /// Drops the history for `context`. Returns true if one existed.
    pub fn remove(&self, context: ContextId) -> bool {
        match &self.store {
            Store::Unbounded(entries) => entries.remove(&context).is_some(),
            Store::Bounded(cache) => cache.lock().pop(&context).is_some(),
        }
    }

    /// Returns true if `context` has a history.
    #[must_use]
    pub fn contains(&self, context: ContextId) -> bool {
        match &self.store {
            Store::Unbounded(entries) => entries.contains_key(&context),
            Store::Bounded(cache) => cache.lock().contains(&context),
        }
    }

    /// Number of tracked contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.store {
            Store::Unbounded(entries) => entries.len(),
            Store::Bounded(cache) => cache.lock().len(),
        }
    }

    /// Returns true if no context has been tracked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Contexts evicted because of `max_contexts`.
    #[must_use]
    pub fn evicted_contexts(&self) -> u64 {
        self.evicted_contexts.load(Ordering::Relaxed)
    }

    fn fresh_history(&self) -> SharedHistory<P> {
        Arc::new(Mutex::new(History::new(self.max_size, self.max_age)))
    }
}
