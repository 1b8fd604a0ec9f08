//! Hardware time source used by [`Rtc`](crate::rtc::Rtc).

use crate::calendar::{DateTime, DayOfWeek, EPOCH, EpochSeconds};

/// Register-style access to a running calendar clock.
///
/// Implementations are synchronous and assumed to succeed once the
/// underlying peripheral has been brought up.
pub trait Clock {
    /// Current date and time as kept by the hardware.
    fn get_datetime(&self) -> DateTime;

    /// Loads a new date and time. The weekday has already been derived.
    fn set_datetime(&mut self, datetime: DateTime, day_of_week: DayOfWeek);

    fn is_running(&self) -> bool;
}

/// Clock kept in memory and moved forward by hand.
///
/// Stands in for the RTC peripheral on the host. It only starts running
/// once a time has been set, like the hardware after reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftClock {
    datetime: DateTime,
    day_of_week: DayOfWeek,
    running: bool,
}

impl SoftClock {
    pub const fn new() -> Self {
        Self {
            datetime: EPOCH,
            day_of_week: DayOfWeek::Thursday,
            running: false,
        }
    }

    /// A running clock showing `datetime`.
    pub fn starting_at(datetime: DateTime) -> Self {
        Self {
            datetime,
            day_of_week: datetime.day_of_week(),
            running: true,
        }
    }

    /// Moves the clock forward. A stopped clock does not advance.
    pub fn advance(&mut self, seconds: EpochSeconds) {
        if !self.running {
            return;
        }
        let now = self.datetime.to_epoch_seconds().saturating_add(seconds);
        self.datetime = DateTime::from_epoch_seconds(now);
        self.day_of_week = self.datetime.day_of_week();
    }

    /// Weekday last written or derived after advancing.
    pub fn day_of_week(&self) -> DayOfWeek {
        self.day_of_week
    }

    pub fn stop(&mut self) {
        self.running = false;
    }
}

impl Default for SoftClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SoftClock {
    fn get_datetime(&self) -> DateTime {
        self.datetime
    }

    fn set_datetime(&mut self, datetime: DateTime, day_of_week: DayOfWeek) {
        self.datetime = datetime;
        self.day_of_week = day_of_week;
        self.running = true;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
