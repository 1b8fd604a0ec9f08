//! The single alarm slot.
//!
//! Expiry is evaluated lazily: nothing ticks in the background, the slot is
//! only looked at when [`AlarmSlot::check`] runs. A periodic alarm reloads
//! during that check, so a caller that never asks never sees the reload.

use crate::calendar::{DateTime, EpochSeconds};
use crate::error::{Error, Result};

pub const MILLIS_PER_SECOND: u64 = 1000;

/// When an alarm should fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmTarget {
    /// Seconds from now.
    Duration(u64),
    /// A point on the calendar, strictly in the future.
    Absolute(DateTime),
}

impl AlarmTarget {
    /// Duration given in milliseconds, truncated to whole seconds.
    pub const fn from_millis(millis: u64) -> Self {
        AlarmTarget::Duration(millis / MILLIS_PER_SECOND)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmState {
    Disarmed,
    Armed,
}

/// Outcome of looking at an armed slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Expiry {
    /// Not due yet, seconds left.
    Pending(u64),
    /// One-shot alarm was due and is now disarmed.
    Expired,
    /// Periodic alarm was due and has been re-armed for another period.
    Reloaded(u64),
}

impl Expiry {
    /// Seconds until the next occurrence as reported to callers.
    pub const fn remaining(&self) -> u64 {
        match *self {
            Expiry::Pending(left) => left,
            Expiry::Expired => 0,
            Expiry::Reloaded(period) => period,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct AlarmSlot {
    armed: bool,
    period: u64,
    expiry: EpochSeconds,
}

impl AlarmSlot {
    pub const fn new() -> Self {
        Self {
            armed: false,
            period: 0,
            expiry: 0,
        }
    }

    /// Arms the slot relative to `now` and returns the seconds until it fires.
    ///
    /// `periodic` only applies to [`AlarmTarget::Duration`]; absolute alarms
    /// are always one-shot.
    pub fn arm(&mut self, now: EpochSeconds, target: AlarmTarget, periodic: bool) -> Result<u64> {
        if self.armed {
            warn!("alarm already armed, expiry {}", self.expiry);
            return Err(Error::AlreadyArmed);
        }

        let (duration, period) = match target {
            AlarmTarget::Duration(seconds) => (seconds, if periodic { seconds } else { 0 }),
            AlarmTarget::Absolute(at) => {
                let at = at.to_epoch_seconds();
                if at <= now {
                    warn!("alarm time {} is not after now {}", at, now);
                    return Err(Error::TimeInPast);
                }
                if periodic {
                    debug!("absolute alarm ignores repeat");
                }
                (at - now, 0)
            }
        };

        self.expiry = now.saturating_add(duration);
        self.period = period;
        self.armed = true;
        debug!(
            "alarm armed: expiry {} in {}s, period {}s",
            self.expiry, duration, period
        );
        Ok(duration)
    }

    /// Compares the slot against `now`, reloading or disarming a due alarm.
    pub fn check(&mut self, now: EpochSeconds) -> Result<Expiry> {
        if !self.armed {
            return Err(Error::NotArmed);
        }

        let left = self.expiry.saturating_sub(now);
        if left > 0 {
            return Ok(Expiry::Pending(left));
        }

        if self.period != 0 {
            self.expiry = now.saturating_add(self.period);
            debug!("periodic alarm reloaded, next expiry {}", self.expiry);
            Ok(Expiry::Reloaded(self.period))
        } else {
            self.armed = false;
            debug!("one-shot alarm expired at {}", now);
            Ok(Expiry::Expired)
        }
    }

    /// Whether an armed alarm has reached its expiry. Leaves the slot as is.
    pub fn is_due(&self, now: EpochSeconds) -> bool {
        self.armed && self.expiry <= now
    }

    /// Seconds until the alarm is due, see [`AlarmSlot::check`].
    pub fn time_remaining(&mut self, now: EpochSeconds) -> Result<u64> {
        self.check(now).map(|expiry| expiry.remaining())
    }

    pub fn cancel(&mut self) {
        if self.armed {
            debug!("alarm cancelled");
        }
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn state(&self) -> AlarmState {
        if self.armed {
            AlarmState::Armed
        } else {
            AlarmState::Disarmed
        }
    }

    /// Reload interval in seconds, 0 for one-shot alarms.
    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn expiry(&self) -> EpochSeconds {
        self.expiry
    }
}
