//! RTC handle: wall clock plus the one alarm slot.

use core::fmt;

use crate::alarm::{AlarmSlot, AlarmState, AlarmTarget, Expiry};
use crate::calendar::{DateTime, EPOCH, EpochSeconds};
use crate::clock::Clock;
use crate::error::{Error, Result};

/// The only RTC there is.
pub const RTC_ID: u8 = 0;
/// The only alarm there is.
pub const ALARM0: u8 = 0;

/// Rejects any RTC identifier other than [`RTC_ID`].
pub fn validate_id(id: u8) -> Result<()> {
    if id != RTC_ID {
        warn!("rejected rtc id {}", id);
        return Err(Error::InvalidIdentifier);
    }
    Ok(())
}

/// Rejects any alarm identifier other than [`ALARM0`].
pub fn validate_alarm_id(id: u8) -> Result<()> {
    if id != ALARM0 {
        warn!("rejected alarm id {}", id);
        return Err(Error::InvalidIdentifier);
    }
    Ok(())
}

/// Owns the hardware clock and the alarm slot.
///
/// There is exactly one per device. Share it through
/// [`SharedRtc`](crate::shared::SharedRtc) when an interrupt handler and a
/// task both need it.
pub struct Rtc<C> {
    clock: C,
    alarm: AlarmSlot,
}

impl<C: Clock> Rtc<C> {
    pub const fn new(clock: C) -> Self {
        Self {
            clock,
            alarm: AlarmSlot::new(),
        }
    }

    /// Writes a new wall-clock time. The alarm slot is not touched.
    pub fn set_clock(&mut self, datetime: DateTime) {
        let day_of_week = datetime.day_of_week();
        info!("rtc set to {}", datetime);
        self.clock.set_datetime(datetime, day_of_week);
    }

    /// Puts the clock back to [`EPOCH`].
    ///
    /// A pending alarm stays armed; call [`Rtc::cancel`] for that.
    pub fn reset_clock_to_reference(&mut self) {
        if self.alarm.is_armed() {
            warn!("rtc reset with alarm still armed");
        }
        self.set_clock(EPOCH);
    }

    pub fn now(&self) -> DateTime {
        self.clock.get_datetime()
    }

    pub fn now_epoch_seconds(&self) -> EpochSeconds {
        self.now().to_epoch_seconds()
    }

    /// Arms the alarm and returns the seconds until it fires.
    pub fn arm(&mut self, target: AlarmTarget, periodic: bool) -> Result<u64> {
        let now = self.now_epoch_seconds();
        self.alarm.arm(now, target, periodic)
    }

    /// Reads the clock and settles a due alarm, reporting what happened.
    pub fn check_alarm(&mut self) -> Result<Expiry> {
        let now = self.now_epoch_seconds();
        self.alarm.check(now)
    }

    /// Whether the alarm is due, without reloading or consuming it.
    pub fn is_alarm_due(&self) -> bool {
        self.alarm.is_due(self.now_epoch_seconds())
    }

    /// Seconds until the alarm fires.
    ///
    /// This is also what reloads a periodic alarm or consumes a one-shot
    /// one. A due periodic alarm reports its full period.
    pub fn time_remaining(&mut self) -> Result<u64> {
        self.check_alarm().map(|expiry| expiry.remaining())
    }

    pub fn cancel(&mut self) {
        self.alarm.cancel();
    }

    pub fn is_armed(&self) -> bool {
        self.alarm.is_armed()
    }

    pub fn alarm_state(&self) -> AlarmState {
        self.alarm.state()
    }

    pub fn alarm(&self) -> &AlarmSlot {
        &self.alarm
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Alarm interrupt callbacks are not wired up.
    pub fn irq(&mut self) -> Result<()> {
        Err(Error::Unsupported)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

impl<C: Clock> fmt::Display for Rtc<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RTC(id={}, running={})", RTC_ID, self.is_running())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DayOfWeek;
    use crate::clock::SoftClock;

    fn rtc_at(datetime: DateTime) -> Rtc<SoftClock> {
        Rtc::new(SoftClock::starting_at(datetime))
    }

    #[test]
    fn test_set_clock_derives_weekday() {
        let mut rtc = Rtc::new(SoftClock::new());
        assert!(!rtc.is_running());
        rtc.set_clock(DateTime::new(2024, 1, 1, 9, 30, 0));
        assert!(rtc.is_running());
        assert_eq!(rtc.clock().day_of_week(), DayOfWeek::Monday);
        assert_eq!(rtc.now(), DateTime::new(2024, 1, 1, 9, 30, 0));
    }

    #[test]
    fn test_reset_goes_back_to_epoch_and_keeps_alarm() {
        let mut rtc = rtc_at(DateTime::new(2020, 2, 2, 2, 2, 2));
        rtc.arm(AlarmTarget::Duration(60), false).unwrap();
        rtc.reset_clock_to_reference();
        assert_eq!(rtc.now(), EPOCH);
        assert_eq!(rtc.now_epoch_seconds(), 0);
        assert_eq!(rtc.clock().day_of_week(), DayOfWeek::Thursday);
        assert!(rtc.is_armed());
    }

    #[test]
    fn test_duration_alarm_fires_once() {
        let mut rtc = rtc_at(EPOCH);
        assert_eq!(rtc.arm(AlarmTarget::from_millis(5000), false), Ok(5));

        let left = rtc.time_remaining().unwrap();
        assert!(left > 0 && left <= 5);

        rtc.clock_mut().advance(5);
        assert_eq!(rtc.now(), DateTime::new(2015, 1, 1, 0, 0, 5));
        assert_eq!(rtc.time_remaining(), Ok(0));
        assert_eq!(rtc.alarm_state(), AlarmState::Disarmed);
        assert_eq!(rtc.time_remaining(), Err(Error::NotArmed));
    }

    #[test]
    fn test_due_one_shot_waits_for_time_remaining() {
        let mut rtc = rtc_at(EPOCH);
        rtc.arm(AlarmTarget::from_millis(5000), false).unwrap();
        assert!(!rtc.is_alarm_due());

        rtc.clock_mut().advance(5);
        assert!(rtc.is_alarm_due());
        assert!(rtc.is_alarm_due());
        assert_eq!(rtc.alarm_state(), AlarmState::Armed);
        assert_eq!(rtc.time_remaining(), Ok(0));
        assert!(!rtc.is_alarm_due());
        assert_eq!(rtc.time_remaining(), Err(Error::NotArmed));
    }

    #[test]
    fn test_periodic_alarm_reloads() {
        let mut rtc = rtc_at(EPOCH);
        rtc.arm(AlarmTarget::from_millis(5000), true).unwrap();

        rtc.clock_mut().advance(7);
        assert_eq!(rtc.check_alarm(), Ok(Expiry::Reloaded(5)));
        assert_eq!(rtc.alarm_state(), AlarmState::Armed);
        assert_eq!(rtc.alarm().expiry(), 12);

        rtc.clock_mut().advance(5);
        assert_eq!(rtc.time_remaining(), Ok(5));
        assert!(rtc.is_armed());
    }

    #[test]
    fn test_absolute_alarm_in_past() {
        let mut rtc = rtc_at(DateTime::new(2015, 6, 1, 12, 0, 0));
        let target = AlarmTarget::Absolute(DateTime::new(2015, 6, 1, 11, 59, 59));
        assert_eq!(rtc.arm(target, false), Err(Error::TimeInPast));
        assert!(!rtc.is_armed());
    }

    #[test]
    fn test_absolute_alarm_counts_down() {
        let mut rtc = rtc_at(DateTime::new(2015, 6, 1, 12, 0, 0));
        let target = AlarmTarget::Absolute(DateTime::new(2015, 6, 2, 12, 0, 0));
        assert_eq!(rtc.arm(target, true), Ok(86_400));
        rtc.clock_mut().advance(86_000);
        assert_eq!(rtc.time_remaining(), Ok(400));
    }

    #[test]
    fn test_exclusive_until_cancel() {
        let mut rtc = rtc_at(EPOCH);
        rtc.arm(AlarmTarget::Duration(30), false).unwrap();
        assert_eq!(rtc.arm(AlarmTarget::Duration(1), true), Err(Error::AlreadyArmed));
        rtc.cancel();
        rtc.cancel();
        assert!(!rtc.is_armed());
        assert_eq!(rtc.arm(AlarmTarget::Duration(1), true), Ok(1));
    }

    #[test]
    fn test_irq_is_unsupported() {
        let mut rtc = rtc_at(EPOCH);
        assert_eq!(rtc.irq(), Err(Error::Unsupported));
    }

    #[test]
    fn test_ids() {
        assert_eq!(validate_id(0), Ok(()));
        assert_eq!(validate_id(1), Err(Error::InvalidIdentifier));
        assert_eq!(validate_alarm_id(ALARM0), Ok(()));
        assert_eq!(validate_alarm_id(2), Err(Error::InvalidIdentifier));
    }

    #[test]
    fn test_status_string() {
        let mut rtc = Rtc::new(SoftClock::new());
        assert_eq!(rtc.to_string(), "RTC(id=0, running=false)");
        rtc.set_clock(EPOCH);
        assert_eq!(rtc.to_string(), "RTC(id=0, running=true)");
    }
}
