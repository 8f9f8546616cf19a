//! Whole-second countdown for a timed test session.

use std::fmt;

/// What one countdown tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Still counting down; carries the seconds left after this tick.
    Running { remaining_secs: u32 },
    /// The countdown just hit zero. Reported exactly once per countdown.
    Expired,
    /// Already expired earlier; further ticks are inert.
    Idle,
}

/// Countdown initialized from a test's time limit and driven once per second.
///
/// Expiry is idempotent: exactly one tick yields [`TimerTick::Expired`], no
/// matter how many zero ticks follow. The countdown is torn down by dropping
/// it, which happens whenever a session resets or a new test starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u32,
    expiry_reported: bool,
}

impl Countdown {
    /// Creates a countdown for the given number of seconds.
    #[must_use]
    pub fn from_secs(secs: u32) -> Self {
        Self {
            remaining_secs: secs,
            expiry_reported: false,
        }
    }

    /// Creates a countdown for a time limit expressed in minutes.
    #[must_use]
    pub fn for_minutes(minutes: u32) -> Self {
        Self::from_secs(minutes.saturating_mul(60))
    }

    /// Seconds left before auto-submission.
    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0 && self.expiry_reported
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TimerTick {
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            if self.remaining_secs == 0 {
                self.expiry_reported = true;
                return TimerTick::Expired;
            }
            return TimerTick::Running {
                remaining_secs: self.remaining_secs,
            };
        }

        if self.expiry_reported {
            TimerTick::Idle
        } else {
            self.expiry_reported = true;
            TimerTick::Expired
        }
    }
}

/// Renders seconds as `M:SS` for display alongside the question prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockDisplay(pub u32);

impl fmt::Display for ClockDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.0 / 60;
        let secs = self.0 % 60;
        write!(f, "{minutes}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_minutes_is_nine_hundred_seconds() {
        let countdown = Countdown::for_minutes(15);
        assert_eq!(countdown.remaining_secs(), 900);
        assert!(!countdown.is_expired());
    }

    #[test]
    fn expiry_fires_exactly_once_after_full_run() {
        let mut countdown = Countdown::for_minutes(15);
        let mut expirations = 0;

        for _ in 0..900 {
            if countdown.tick() == TimerTick::Expired {
                expirations += 1;
            }
        }
        assert_eq!(expirations, 1);
        assert!(countdown.is_expired());

        // Further zero ticks must stay inert.
        for _ in 0..5 {
            assert_eq!(countdown.tick(), TimerTick::Idle);
        }
    }

    #[test]
    fn running_ticks_report_remaining_seconds() {
        let mut countdown = Countdown::from_secs(3);
        assert_eq!(countdown.tick(), TimerTick::Running { remaining_secs: 2 });
        assert_eq!(countdown.tick(), TimerTick::Running { remaining_secs: 1 });
        assert_eq!(countdown.tick(), TimerTick::Expired);
        assert_eq!(countdown.tick(), TimerTick::Idle);
    }

    #[test]
    fn zero_length_countdown_still_expires_once() {
        let mut countdown = Countdown::from_secs(0);
        assert_eq!(countdown.tick(), TimerTick::Expired);
        assert_eq!(countdown.tick(), TimerTick::Idle);
    }

    #[test]
    fn clock_display_pads_seconds() {
        assert_eq!(ClockDisplay(900).to_string(), "15:00");
        assert_eq!(ClockDisplay(65).to_string(), "1:05");
        assert_eq!(ClockDisplay(9).to_string(), "0:09");
    }
}
