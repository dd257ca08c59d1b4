use std::collections::{HashMap, VecDeque};

/// A buffered event waiting for its partner on the opposite stream.
#[derive(Debug, Clone)]
struct Pending<E> {
    event: E,
    event_time: i64,
}

/// Windowed buffer for one side of the stream-stream join.
///
/// Events are grouped by join key; each key holds a small deque in arrival
/// order, so "first qualifying candidate by arrival order" is a property of
/// the structure rather than of the search. Expiry compares event times
/// only; processing time never enters the window arithmetic.
#[derive(Debug)]
pub struct WindowBuffer<E> {
    entries: HashMap<String, VecDeque<Pending<E>>>,
    len: usize,
}

impl<E> Default for WindowBuffer<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            len: 0,
        }
    }
}

impl<E> WindowBuffer<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total buffered events across all keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of keys currently holding at least one pending event.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Buffers an event under `key`, after any earlier arrivals for it.
    pub fn insert(&mut self, key: &str, event: E, event_time: i64) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .push_back(Pending { event, event_time });
        self.len += 1;
    }

    /// Drops entries under `key` whose event time falls outside
    /// `[pivot - window_ms, pivot + window_ms]`. Entries for other keys are
    /// untouched. Returns the number of entries dropped.
    pub fn prune_key(&mut self, key: &str, pivot: i64, window_ms: i64) -> usize {
        let Some(queue) = self.entries.get_mut(key) else {
            return 0;
        };

        let lower = pivot.saturating_sub(window_ms);
        let upper = pivot.saturating_add(window_ms);
        let before = queue.len();
        queue.retain(|p| p.event_time >= lower && p.event_time <= upper);
        let dropped = before - queue.len();

        if queue.is_empty() {
            self.entries.remove(key);
        }
        self.len -= dropped;
        dropped
    }

    /// Removes and returns the first entry (arrival order) under `key` with
    /// an event time within `window_ms` of `pivot`, bounds inclusive.
    pub fn take_match(&mut self, key: &str, pivot: i64, window_ms: i64) -> Option<E> {
        let queue = self.entries.get_mut(key)?;

        let lower = pivot.saturating_sub(window_ms);
        let upper = pivot.saturating_add(window_ms);
        let position = queue
            .iter()
            .position(|p| p.event_time >= lower && p.event_time <= upper)?;

        let pending = queue.remove(position)?;
        if queue.is_empty() {
            self.entries.remove(key);
        }
        self.len -= 1;
        Some(pending.event)
    }

    /// Drops entries on every key with event time strictly below `horizon`.
    /// Returns the number of entries dropped.
    pub fn sweep(&mut self, horizon: i64) -> usize {
        let mut dropped = 0;
        self.entries.retain(|_, queue| {
            let before = queue.len();
            queue.retain(|p| p.event_time >= horizon);
            dropped += before - queue.len();
            !queue.is_empty()
        });
        self.len -= dropped;
        dropped
    }
}
