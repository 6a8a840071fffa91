//! Epoch-tagged timer queue
//!
//! Nothing here sleeps. Owners poll with the current `Instant` and receive
//! due timers in due order, each carrying the epoch that scheduled it.

use std::time::{Duration, Instant};

use super::session::Epoch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct TimerEntry<K> {
    id: TimerId,
    epoch: Epoch,
    kind: K,
    due: Instant,
    period: Option<Duration>,
}

/// A timer that came due during `pop_due`
#[derive(Debug, Clone, PartialEq)]
pub struct FiredTimer<K> {
    pub id: TimerId,
    pub epoch: Epoch,
    pub kind: K,
    pub due: Instant,
}

#[derive(Debug)]
pub struct TimerQueue<K> {
    entries: Vec<TimerEntry<K>>,
    next_id: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self { entries: Vec::new(), next_id: 0 }
    }
}

impl<K: Clone> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, epoch: Epoch, kind: K, due: Instant, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(TimerEntry { id, epoch, kind, due, period });
        id
    }

    pub fn schedule_once(&mut self, epoch: Epoch, kind: K, due: Instant) -> TimerId {
        self.push(epoch, kind, due, None)
    }

    /// Periodic timer; a zero period is bumped to one millisecond so a poll always terminates
    pub fn schedule_every(&mut self, epoch: Epoch, kind: K, first_due: Instant, period: Duration) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.push(epoch, kind, first_due, Some(period))
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    pub fn cancel_epoch(&mut self, epoch: Epoch) -> usize {
        self.cancel_where(|e, _| e == epoch)
    }

    pub fn cancel_where(&mut self, mut pred: impl FnMut(Epoch, &K) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(e.epoch, &e.kind));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Earliest timer due at or before `now`. Ties resolve in scheduling order.
    /// Periodic timers are re-armed one period after the slot that fired.
    pub fn pop_due(&mut self, now: Instant) -> Option<FiredTimer<K>> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.id.0))
            .map(|(idx, _)| idx)?;

        let entry = &mut self.entries[idx];
        let fired = FiredTimer {
            id: entry.id,
            epoch: entry.epoch,
            kind: entry.kind.clone(),
            due: entry.due,
        };

        match entry.period {
            Some(period) => entry.due += period,
            None => {
                self.entries.remove(idx);
            }
        }

        Some(fired)
    }
}

#[cfg(test)]
#[path = "timers_tests.rs"]
mod tests;
