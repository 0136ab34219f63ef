//! Scoped timer resources advanced by dispatched ticks.
//!
//! The shell has no free-running timers: every delay and interval is an owned
//! value a controller advances from `ShellEvent::Tick`, so animations stay
//! deterministic under `run_scripted` and die with their controller.

use std::time::Duration;

/// One-shot delay. Armed with a duration, fires exactly once when the
/// accumulated tick time crosses it, then disarms.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    remaining: Option<Duration>,
}

impl Countdown {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn start(&mut self, delay: Duration) {
        self.remaining = Some(delay);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advance by a tick's elapsed time. Returns true on the tick that
    /// completes the delay.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        match self.remaining {
            Some(remaining) if remaining <= elapsed => {
                self.remaining = None;
                true
            }
            Some(remaining) => {
                self.remaining = Some(remaining - elapsed);
                false
            }
            None => false,
        }
    }
}

/// Fixed-period interval. Fires at most once per `advance` call and keeps the
/// overshoot so long ticks do not drift the schedule.
#[derive(Debug, Clone)]
pub struct RepeatingTimer {
    period: Duration,
    accumulated: Duration,
}

impl RepeatingTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            accumulated: Duration::ZERO,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.accumulated += elapsed;
        if self.accumulated >= self.period {
            // Retain the remainder modulo the period.
            while self.accumulated >= self.period {
                self.accumulated -= self.period;
            }
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_fires_once() {
        let mut countdown = Countdown::idle();
        countdown.start(Duration::from_millis(300));
        assert!(!countdown.advance(Duration::from_millis(200)));
        assert!(countdown.advance(Duration::from_millis(200)));
        assert!(!countdown.advance(Duration::from_millis(200)));
        assert!(!countdown.is_armed());
    }

    #[test]
    fn countdown_cancel_disarms() {
        let mut countdown = Countdown::idle();
        countdown.start(Duration::from_millis(100));
        countdown.cancel();
        assert!(!countdown.advance(Duration::from_millis(500)));
    }

    #[test]
    fn repeating_timer_keeps_remainder() {
        let mut timer = RepeatingTimer::new(Duration::from_secs(1));
        assert!(!timer.advance(Duration::from_millis(600)));
        assert!(timer.advance(Duration::from_millis(600)));
        // 200ms carried over; 800ms completes the next period.
        assert!(timer.advance(Duration::from_millis(800)));
    }

    #[test]
    fn long_tick_fires_once() {
        let mut timer = RepeatingTimer::new(Duration::from_millis(100));
        assert!(timer.advance(Duration::from_millis(950)));
        assert!(!timer.advance(Duration::from_millis(40)));
        assert!(timer.advance(Duration::from_millis(20)));
    }
}
