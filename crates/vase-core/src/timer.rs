//! Wall-clock timer queue.
//!
//! Timers here are decoupled from the render loop: they are advanced with
//! real elapsed time so that sequence completion and sensor windows stay
//! correct under frame drops. Every scheduled timer returns a [`TimerId`]
//! that can be cancelled before it fires.

use std::time::Duration;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct PendingTimer<T> {
    id: TimerId,
    due: Duration,
    payload: T,
}

/// A queue of one-shot timers carrying a payload.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    pending: Vec<PendingTimer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Current wall-clock time of this queue.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `payload` to fire after `delay`.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingTimer {
            id,
            due: self.now + delay,
            payload,
        });
        id
    }

    /// Cancels a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advances the clock and returns the payloads of every timer that came due,
    /// ordered by due time (ties in scheduling order).
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now += dt;

        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|t| t.due <= now);
        self.pending = pending;

        due.sort_by_key(|t| (t.due, t.id));
        due.into_iter().map(|t| t.payload).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let mut timers = TimerQueue::new();
        timers.schedule(Duration::from_millis(100), "done");

        assert!(timers.advance(Duration::from_millis(99)).is_empty());
        assert_eq!(timers.advance(Duration::from_millis(1)), vec!["done"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(Duration::from_millis(50), 1);
        assert!(timers.is_pending(id));

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.advance(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_fire_order_by_due_time() {
        let mut timers = TimerQueue::new();
        timers.schedule(Duration::from_millis(300), 'c');
        timers.schedule(Duration::from_millis(100), 'a');
        timers.schedule(Duration::from_millis(200), 'b');
        timers.schedule(Duration::from_millis(100), 'd');

        assert_eq!(
            timers.advance(Duration::from_millis(500)),
            vec!['a', 'd', 'b', 'c']
        );
    }

    #[test]
    fn test_schedule_relative_to_now() {
        let mut timers = TimerQueue::new();
        timers.advance(Duration::from_secs(10));
        timers.schedule(Duration::from_millis(500), ());

        assert!(timers.advance(Duration::from_millis(400)).is_empty());
        assert_eq!(timers.advance(Duration::from_millis(100)).len(), 1);
        assert_eq!(timers.now(), Duration::from_millis(10_500));
    }
}
