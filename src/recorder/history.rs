//! Bounded per-context event history.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use crate::event::Event;

/// Oldest-first buffer of sub-threshold events for one calling context.
///
/// Eviction is lazy: age is re-checked on every `append` and `drain`, never by
/// a background sweep.
#[derive(Debug)]
pub struct History<P> {
    events: VecDeque<Event<P>>,
    max_size: usize,
    max_age: Option<Duration>,
}

impl<P> History<P> {
    /// Creates an empty history. `max_size = 0` disables retention.
    #[must_use]
    pub fn new(max_size: usize, max_age: Option<Duration>) -> Self {
        Self {
            events: VecDeque::with_capacity(max_size.min(64)),
            max_size,
            max_age,
        }
    }

    /// Buffers `event`, evicting expired entries first and then the oldest
    /// entries until there is room.
    ///
    /// Returns the number of entries evicted. With `max_size = 0` the event is
    /// dropped and nothing is evicted.
    pub fn append(&mut self, event: Event<P>, now: DateTime<Utc>) -> usize {
        if self.max_size == 0 {
            return 0;
        }
        let mut evicted = self.evict_expired(now);
        while self.events.len() >= self.max_size {
            self.events.pop_front();
            evicted += 1;
        }
        self.events.push_back(event);
        evicted
    }

    /// Removes and returns every unexpired entry, oldest first.
    ///
    /// The history is empty afterwards.
    pub fn drain(&mut self, now: DateTime<Utc>) -> Vec<Event<P>> {
        self.evict_expired(now);
        self.events.drain(..).collect()
    }

    /// Number of buffered entries, including ones that may have expired
    /// since the last access.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Configured size bound.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let Some(max_age) = self.max_age else {
            return 0;
        };
        // Entries arrive in timestamp order, but a caller-supplied timestamp may
        // not, so scan the whole buffer instead of stopping at the first survivor.
        let before = self.events.len();
        self.events
            .retain(|event| now.signed_duration_since(event.timestamp()) <= max_age);
        before - self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextId;
    use crate::level::Level;

    fn ev(ts: DateTime<Utc>, msg: &'static str) -> Event<&'static str> {
        Event::at(Level::Debug, ts, ContextId::new(), msg)
    }

    fn payloads(events: Vec<Event<&'static str>>) -> Vec<&'static str> {
        events.into_iter().map(Event::into_payload).collect()
    }

    #[test]
    fn keeps_insertion_order() {
        let now = Utc::now();
        let mut h = History::new(10, None);
        for msg in ["a", "b", "c"] {
            h.append(ev(now, msg), now);
        }
        assert_eq!(payloads(h.drain(now)), vec!["a", "b", "c"]);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let now = Utc::now();
        let mut h = History::new(3, None);
        let mut evicted = 0;
        for msg in ["1", "2", "3", "4", "5"] {
            evicted += h.append(ev(now, msg), now);
            assert!(h.len() <= 3);
        }
        assert_eq!(evicted, 2);
        assert_eq!(payloads(h.drain(now)), vec!["3", "4", "5"]);
    }

    #[test]
    fn zero_size_retains_nothing() {
        let now = Utc::now();
        let mut h = History::new(0, None);
        assert_eq!(h.append(ev(now, "a"), now), 0);
        assert!(h.is_empty());
        assert!(h.drain(now).is_empty());
    }

    #[test]
    fn append_evicts_expired_entries() {
        let t0 = Utc::now();
        let max_age = Duration::milliseconds(100);
        let mut h = History::new(3, Some(max_age));
        h.append(ev(t0, "1"), t0);
        h.append(ev(t0, "2"), t0);

        let t1 = t0 + Duration::milliseconds(150);
        assert_eq!(h.append(ev(t1, "3"), t1), 2);
        assert_eq!(payloads(h.drain(t1)), vec!["3"]);
    }

    #[test]
    fn drain_rechecks_age() {
        let t0 = Utc::now();
        let mut h = History::new(3, Some(Duration::milliseconds(100)));
        h.append(ev(t0, "old"), t0);
        h.append(ev(t0 + Duration::milliseconds(80), "young"), t0 + Duration::milliseconds(80));

        let later = t0 + Duration::milliseconds(120);
        assert_eq!(payloads(h.drain(later)), vec!["young"]);
    }

    #[test]
    fn entry_exactly_at_max_age_survives() {
        let t0 = Utc::now();
        let mut h = History::new(3, Some(Duration::milliseconds(100)));
        h.append(ev(t0, "edge"), t0);
        assert_eq!(payloads(h.drain(t0 + Duration::milliseconds(100))), vec!["edge"]);
    }

    #[test]
    fn drain_empties_history() {
        let now = Utc::now();
        let mut h = History::new(3, None);
        h.append(ev(now, "a"), now);
        assert_eq!(h.drain(now).len(), 1);
        assert!(h.is_empty());
        assert!(h.drain(now).is_empty());
    }
}
