//! Repeating deadline timer that ends a timed effect.
//!
//! The timer does not own a thread. Whoever drives the engine calls
//! [`crate::RumbleEffectEngine::poll_timer`] from its periodic tick, and every
//! elapsed interval counts as one firing. A late poll consumes all the
//! intervals it missed at once. Disarming keeps the interval so a later start
//! can arm the same timer again.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Schedule {
    next_due: Instant,
    remaining: u32,
}

/// Outcome of one timer firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// More firings are left before the effect must stop.
    Continue { remaining: u32 },
    /// The last firing happened; the effect must stop now.
    Expired,
    /// The timer was not armed.
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectTimer {
    interval: Duration,
    schedule: Option<Schedule>,
}

impl EffectTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            schedule: None,
        }
    }

    /// Timer for an effect of `duration_us` microseconds per iteration.
    pub fn from_micros(duration_us: u32) -> Self {
        Self::new(Duration::from_micros(u64::from(duration_us)))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Schedules `iterations` firings, the first one interval after `now`.
    /// Arming with zero iterations leaves the timer disarmed.
    pub fn arm(&mut self, iterations: u32, now: Instant) {
        self.schedule = (iterations > 0).then(|| Schedule {
            next_due: now + self.interval,
            remaining: iterations,
        });
    }

    pub fn disarm(&mut self) {
        self.schedule = None;
    }

    pub fn is_armed(&self) -> bool {
        self.schedule.is_some()
    }

    /// Firings left, or `None` when disarmed.
    pub fn remaining(&self) -> Option<u32> {
        self.schedule.map(|s| s.remaining)
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.schedule.map(|s| s.next_due)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.schedule.is_some_and(|s| s.next_due <= now)
    }

    /// Firings that are due by `now`, capped at the firings left. A zero
    /// interval makes every remaining firing due at once.
    pub fn due_count(&self, now: Instant) -> u32 {
        let Some(schedule) = self.schedule else {
            return 0;
        };
        let Some(late) = now.checked_duration_since(schedule.next_due) else {
            return 0;
        };
        if self.interval.is_zero() {
            return schedule.remaining;
        }

        let due = (late.as_nanos() / self.interval.as_nanos()).saturating_add(1);
        u32::try_from(due).map_or(schedule.remaining, |due| due.min(schedule.remaining))
    }

    /// Consumes one firing regardless of the deadline.
    pub fn fire(&mut self) -> TimerTick {
        self.advance(1)
    }

    /// Consumes `firings` firings regardless of the deadline.
    pub fn advance(&mut self, firings: u32) -> TimerTick {
        let Some(mut schedule) = self.schedule else {
            return TimerTick::Idle;
        };

        schedule.remaining = schedule.remaining.saturating_sub(firings);
        if schedule.remaining == 0 {
            self.schedule = None;
            return TimerTick::Expired;
        }

        if let Some(next_due) = self
            .interval
            .checked_mul(firings)
            .and_then(|step| schedule.next_due.checked_add(step))
        {
            schedule.next_due = next_due;
        }
        self.schedule = Some(schedule);
        TimerTick::Continue {
            remaining: schedule.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_10: Duration = Duration::from_millis(10);

    #[test]
    fn test_new_timer_is_disarmed() {
        let timer = EffectTimer::new(MS_10);
        assert!(!timer.is_armed());
        assert_eq!(timer.remaining(), None);
        assert!(!timer.is_due(Instant::now()));
    }

    #[test]
    fn test_fires_until_expired() {
        let start = Instant::now();
        let mut timer = EffectTimer::new(MS_10);
        timer.arm(3, start);

        assert!(!timer.is_due(start));
        assert!(timer.is_due(start + MS_10));

        assert_eq!(timer.fire(), TimerTick::Continue { remaining: 2 });
        assert_eq!(timer.next_due(), Some(start + MS_10 * 2));
        assert_eq!(timer.fire(), TimerTick::Continue { remaining: 1 });
        assert_eq!(timer.fire(), TimerTick::Expired);
        assert!(!timer.is_armed());
        assert_eq!(timer.fire(), TimerTick::Idle);
    }

    #[test]
    fn test_due_count_covers_missed_intervals() {
        let start = Instant::now();
        let mut timer = EffectTimer::new(MS_10);
        timer.arm(5, start);

        assert_eq!(timer.due_count(start), 0);
        assert_eq!(timer.due_count(start + MS_10), 1);
        assert_eq!(timer.due_count(start + MS_10 * 3 + MS_10 / 2), 3);
        assert_eq!(timer.due_count(start + MS_10 * 100), 5);

        assert_eq!(timer.advance(3), TimerTick::Continue { remaining: 2 });
        assert_eq!(timer.next_due(), Some(start + MS_10 * 4));
        assert_eq!(timer.advance(7), TimerTick::Expired);
        assert!(!timer.is_armed());
        assert_eq!(timer.due_count(start + MS_10 * 100), 0);
    }

    #[test]
    fn test_zero_interval_is_due_all_at_once() {
        let start = Instant::now();
        let mut timer = EffectTimer::new(Duration::ZERO);
        timer.arm(u32::MAX - 1, start);
        assert_eq!(timer.due_count(start), u32::MAX - 1);
    }

    #[test]
    fn test_zero_iterations_stays_disarmed() {
        let mut timer = EffectTimer::new(MS_10);
        timer.arm(0, Instant::now());
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_disarm_keeps_interval_and_can_rearm() {
        let now = Instant::now();
        let mut timer = EffectTimer::from_micros(250_000);
        timer.arm(2, now);
        timer.disarm();
        assert!(!timer.is_armed());
        assert_eq!(timer.interval(), Duration::from_millis(250));

        timer.arm(1, now);
        assert_eq!(timer.remaining(), Some(1));
    }
}
