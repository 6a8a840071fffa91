//! Tests for the epoch-tagged timer queue

#[cfg(test)]
mod tests {
    use crate::player::{Epoch, TimerQueue};
    use std::time::{Duration, Instant};

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_pop_due_in_due_order() {
        let mut timers = TimerQueue::new();
        let epoch = Epoch::default();
        let t0 = Instant::now();
        timers.schedule_once(epoch, "late", t0 + ms(300));
        timers.schedule_once(epoch, "early", t0 + ms(100));
        timers.schedule_once(epoch, "middle", t0 + ms(200));

        assert!(timers.pop_due(t0 + ms(50)).is_none());
        let fired: Vec<_> = std::iter::from_fn(|| timers.pop_due(t0 + ms(1000))).map(|f| f.kind).collect();
        assert_eq!(fired, vec!["early", "middle", "late"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let mut timers = TimerQueue::new();
        let epoch = Epoch::default();
        let due = Instant::now() + ms(10);
        timers.schedule_once(epoch, 1, due);
        timers.schedule_once(epoch, 2, due);

        assert_eq!(timers.pop_due(due).map(|f| f.kind), Some(1));
        assert_eq!(timers.pop_due(due).map(|f| f.kind), Some(2));
    }

    #[test]
    fn test_periodic_rearms_from_fired_slot() {
        let mut timers = TimerQueue::new();
        let epoch = Epoch::default();
        let t0 = Instant::now();
        timers.schedule_every(epoch, "tick", t0 + ms(150), ms(150));

        // A late poll catches up one slot at a time
        let dues: Vec<_> = std::iter::from_fn(|| timers.pop_due(t0 + ms(460))).map(|f| f.due).collect();
        assert_eq!(dues, vec![t0 + ms(150), t0 + ms(300), t0 + ms(450)]);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_due(), Some(t0 + ms(600)));
    }

    #[test]
    fn test_zero_period_still_terminates() {
        let mut timers = TimerQueue::new();
        let t0 = Instant::now();
        timers.schedule_every(Epoch::default(), (), t0, Duration::ZERO);
        let count = std::iter::from_fn(|| timers.pop_due(t0 + ms(5))).count();
        assert_eq!(count, 6);
    }

    #[test]
    fn test_cancel_by_id_and_epoch() {
        let mut timers = TimerQueue::new();
        let old = Epoch::default();
        let current = old.next();
        let t0 = Instant::now();

        let a = timers.schedule_once(old, "a", t0);
        timers.schedule_once(old, "b", t0);
        timers.schedule_once(current, "c", t0);

        assert!(timers.cancel(a));
        assert!(!timers.cancel(a));
        assert_eq!(timers.cancel_epoch(old), 1);
        assert_eq!(timers.len(), 1);

        let fired = timers.pop_due(t0).unwrap();
        assert_eq!(fired.epoch, current);
        assert_eq!(fired.kind, "c");
    }

    #[test]
    fn test_cancel_where_filters_kind() {
        let mut timers = TimerQueue::new();
        let epoch = Epoch::default();
        let t0 = Instant::now();
        timers.schedule_every(epoch, "tick", t0, ms(150));
        timers.schedule_once(epoch, "stage", t0);
        timers.schedule_once(epoch, "timeout", t0);

        let removed = timers.cancel_where(|e, kind| e == epoch && *kind != "timeout");
        assert_eq!(removed, 2);
        assert_eq!(timers.pop_due(t0).map(|f| f.kind), Some("timeout"));
    }

    #[test]
    fn test_clear() {
        let mut timers = TimerQueue::new();
        timers.schedule_every(Epoch::default(), 0u8, Instant::now(), ms(1));
        timers.clear();
        assert!(timers.is_empty());
        assert!(timers.next_due().is_none());
    }
}
