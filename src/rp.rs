//! [`Clock`] backed by the RP2040 RTC peripheral.

use embassy_rp::Peripheral;
use embassy_rp::peripherals::RTC;
use embassy_rp::rtc;

use crate::calendar::{DateTime, DayOfWeek, EPOCH};
use crate::clock::Clock;

pub struct RpClock<'d> {
    rtc: rtc::Rtc<'d, RTC>,
}

impl<'d> RpClock<'d> {
    pub fn new(rtc: impl Peripheral<P = RTC> + 'd) -> Self {
        let mut rtc = rtc::Rtc::new(rtc);
        // Same every-4-years rule as the calendar module.
        rtc.set_leap_year_check(true);
        Self { rtc }
    }
}

impl From<DayOfWeek> for rtc::DayOfWeek {
    fn from(day: DayOfWeek) -> Self {
        match day {
            DayOfWeek::Sunday => rtc::DayOfWeek::Sunday,
            DayOfWeek::Monday => rtc::DayOfWeek::Monday,
            DayOfWeek::Tuesday => rtc::DayOfWeek::Tuesday,
            DayOfWeek::Wednesday => rtc::DayOfWeek::Wednesday,
            DayOfWeek::Thursday => rtc::DayOfWeek::Thursday,
            DayOfWeek::Friday => rtc::DayOfWeek::Friday,
            DayOfWeek::Saturday => rtc::DayOfWeek::Saturday,
        }
    }
}

impl Clock for RpClock<'_> {
    fn get_datetime(&self) -> DateTime {
        match self.rtc.now() {
            Ok(t) => DateTime::new(t.year, t.month, t.day, t.hour, t.minute, t.second),
            Err(e) => {
                // Only happens before the first set_datetime.
                warn!("rtc read failed: {}", defmt::Debug2Format(&e));
                EPOCH
            }
        }
    }

    fn set_datetime(&mut self, datetime: DateTime, day_of_week: DayOfWeek) {
        let t = rtc::DateTime {
            year: datetime.year,
            month: datetime.month,
            day: datetime.day,
            day_of_week: day_of_week.into(),
            hour: datetime.hour,
            minute: datetime.minute,
            second: datetime.second,
        };
        if let Err(e) = self.rtc.set_datetime(t) {
            error!("rtc rejected {}: {}", datetime, defmt::Debug2Format(&e));
        }
    }

    fn is_running(&self) -> bool {
        self.rtc.is_running()
    }
}
