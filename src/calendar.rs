//! Calendar arithmetic.
//!
//! Dates are turned into a day count with the civil-to-Julian formula that
//! treats January and February as months 13 and 14 of the previous year.
//! Only the every-4-years leap rule is applied, no century correction. The
//! RP2040 RTC counts leap days the same way, so the two stay in step until
//! 2100.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Whole seconds elapsed since [`EPOCH`].
pub type EpochSeconds = u64;

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Thursday, 2015-01-01 00:00:00.
pub const EPOCH: DateTime = DateTime::new(2015, 1, 1, 0, 0, 0);

/// Day count of [`EPOCH`] as returned by [`to_modified_julian_day`].
pub const EPOCH_MJD: i64 = 736_012;
pub const EPOCH_DAY_OF_WEEK: DayOfWeek = DayOfWeek::Thursday;

// Day count of 1 March of year 0 (month 3, day 1 of the shifted calendar).
const MARCH_FIRST_OFFSET: i64 = 93;
const DAYS_PER_4_YEARS: i64 = 4 * 365 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DayOfWeek {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl DayOfWeek {
    /// Maps any index onto a weekday, wrapping modulo 7.
    pub const fn from_index(index: u8) -> Self {
        match index % 7 {
            0 => DayOfWeek::Sunday,
            1 => DayOfWeek::Monday,
            2 => DayOfWeek::Tuesday,
            3 => DayOfWeek::Wednesday,
            4 => DayOfWeek::Thursday,
            5 => DayOfWeek::Friday,
            _ => DayOfWeek::Saturday,
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// A calendar date and time of day, without timezone or sub-second part.
///
/// Fields are not range checked. Out-of-range values still convert through
/// the day-count formula and give a defined, if meaningless, result. The day
/// of the week is always derived, see [`DateTime::day_of_week`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    #[serde(default)]
    pub hour: u8,
    #[serde(default)]
    pub minute: u8,
    #[serde(default)]
    pub second: u8,
}

impl DateTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        derive_day_of_week(self.year, self.month, self.day)
    }

    pub fn to_epoch_seconds(&self) -> EpochSeconds {
        to_epoch_seconds(self)
    }

    pub fn from_epoch_seconds(seconds: EpochSeconds) -> Self {
        from_epoch_seconds(seconds)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Day count of a calendar date.
///
/// Not an astronomical MJD, only an intermediate value for differences
/// between dates.
pub fn to_modified_julian_day(year: u16, month: u8, day: u8) -> i64 {
    let (mut year, mut month) = (i64::from(year), i64::from(month));
    if month < 3 {
        year -= 1;
        month += 12;
    }
    year * 365 + year.div_euclid(4) + (month * 153 + 3) / 5 + i64::from(day)
}

/// Seconds since [`EPOCH`]. Dates before the epoch saturate to 0.
pub fn to_epoch_seconds(datetime: &DateTime) -> EpochSeconds {
    let days = to_modified_julian_day(datetime.year, datetime.month, datetime.day) - EPOCH_MJD;
    let seconds = days * SECONDS_PER_DAY
        + i64::from(datetime.hour) * 3600
        + i64::from(datetime.minute) * 60
        + i64::from(datetime.second);
    EpochSeconds::try_from(seconds).unwrap_or(0)
}

/// Inverse of [`to_epoch_seconds`] for in-range dates.
pub fn from_epoch_seconds(seconds: EpochSeconds) -> DateTime {
    let days = (seconds / SECONDS_PER_DAY as u64) as i64;
    let time_of_day = seconds % SECONDS_PER_DAY as u64;

    // Count from 1 March of year 0 so the leap day is the last day of a year.
    let shifted = days + EPOCH_MJD - MARCH_FIRST_OFFSET;
    let cycles = shifted / DAYS_PER_4_YEARS;
    let day_of_cycle = shifted % DAYS_PER_4_YEARS;
    let year_of_cycle = (day_of_cycle / 365).min(3);
    let day_of_year = day_of_cycle - year_of_cycle * 365;

    let month_index = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_index + 2) / 5 + 1;
    let (month, carry) = if month_index < 10 {
        (month_index + 3, 0)
    } else {
        (month_index - 9, 1)
    };
    let year = cycles * 4 + year_of_cycle + carry;

    DateTime {
        year: u16::try_from(year).unwrap_or(u16::MAX),
        month: month as u8,
        day: day as u8,
        hour: (time_of_day / 3600) as u8,
        minute: (time_of_day % 3600 / 60) as u8,
        second: (time_of_day % 60) as u8,
    }
}

pub fn derive_day_of_week(year: u16, month: u8, day: u8) -> DayOfWeek {
    let days = to_modified_julian_day(year, month, day) - EPOCH_MJD;
    let offset = days.rem_euclid(7) as u8;
    DayOfWeek::from_index(offset + EPOCH_DAY_OF_WEEK.index())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            2 if year % 4 == 0 => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    fn next_day(dt: DateTime) -> DateTime {
        let mut next = dt;
        if dt.day < days_in_month(dt.year, dt.month) {
            next.day += 1;
        } else if dt.month < 12 {
            next.month += 1;
            next.day = 1;
        } else {
            next.year += 1;
            next.month = 1;
            next.day = 1;
        }
        next
    }

    #[test]
    fn test_epoch_is_zero() {
        assert_eq!(to_modified_julian_day(2015, 1, 1), EPOCH_MJD);
        assert_eq!(to_epoch_seconds(&EPOCH), 0);
        assert_eq!(EPOCH.day_of_week(), DayOfWeek::Thursday);
    }

    #[test]
    fn test_known_offsets() {
        assert_eq!(DateTime::new(2015, 1, 2, 0, 0, 0).to_epoch_seconds(), 86_400);
        assert_eq!(DateTime::new(2015, 1, 1, 0, 0, 5).to_epoch_seconds(), 5);
        assert_eq!(DateTime::new(2015, 1, 1, 1, 2, 3).to_epoch_seconds(), 3723);
        assert_eq!(
            DateTime::new(2015, 3, 1, 0, 0, 0).to_epoch_seconds(),
            59 * 86_400
        );
        assert_eq!(
            DateTime::new(2016, 1, 1, 0, 0, 0).to_epoch_seconds(),
            365 * 86_400
        );
        assert_eq!(
            DateTime::new(2016, 3, 1, 0, 0, 0).to_epoch_seconds(),
            (365 + 31 + 29) * 86_400
        );
    }

    #[test]
    fn test_known_weekdays() {
        assert_eq!(derive_day_of_week(2016, 2, 29), DayOfWeek::Monday);
        assert_eq!(derive_day_of_week(2024, 1, 1), DayOfWeek::Monday);
        assert_eq!(derive_day_of_week(2015, 6, 1), DayOfWeek::Monday);
        assert_eq!(derive_day_of_week(2021, 12, 25), DayOfWeek::Saturday);
    }

    #[test]
    fn test_before_epoch_saturates() {
        assert_eq!(DateTime::new(2014, 12, 31, 23, 59, 59).to_epoch_seconds(), 0);
        assert_eq!(derive_day_of_week(2014, 12, 31), DayOfWeek::Wednesday);
    }

    #[test]
    fn test_out_of_range_fields_still_convert() {
        // 25:00 on day one lands one hour into day two.
        assert_eq!(
            DateTime::new(2015, 1, 1, 25, 0, 0).to_epoch_seconds(),
            DateTime::new(2015, 1, 2, 1, 0, 0).to_epoch_seconds()
        );
    }

    #[test]
    fn test_day_walk_is_monotonic_and_invertible() {
        let mut date = EPOCH;
        let mut previous = to_epoch_seconds(&date);
        assert_eq!(from_epoch_seconds(previous), date);

        for _ in 0..(25 * 366) {
            let next = next_day(date);
            let seconds = to_epoch_seconds(&next);
            assert!(seconds > previous, "{} not after {}", next, date);
            assert_eq!(seconds - previous, SECONDS_PER_DAY as u64);
            assert_eq!(from_epoch_seconds(seconds), next);
            assert_eq!(
                next.day_of_week().index(),
                (date.day_of_week().index() + 1) % 7
            );
            date = next;
            previous = seconds;
        }
    }

    #[test]
    fn test_time_of_day_boundaries_are_monotonic() {
        let pairs = [
            (DateTime::new(2015, 1, 1, 23, 59, 59), DateTime::new(2015, 1, 2, 0, 0, 0)),
            (DateTime::new(2016, 2, 28, 23, 59, 59), DateTime::new(2016, 2, 29, 0, 0, 0)),
            (DateTime::new(2016, 12, 31, 23, 59, 59), DateTime::new(2017, 1, 1, 0, 0, 0)),
            (DateTime::new(2020, 5, 17, 9, 59, 59), DateTime::new(2020, 5, 17, 10, 0, 0)),
            (DateTime::new(2020, 5, 17, 10, 0, 59), DateTime::new(2020, 5, 17, 10, 1, 0)),
        ];
        for (before, after) in pairs {
            let a = before.to_epoch_seconds();
            let b = after.to_epoch_seconds();
            assert_eq!(b, a + 1, "{} -> {}", before, after);
            assert_eq!(from_epoch_seconds(a), before);
            assert_eq!(from_epoch_seconds(b), after);
        }

        let day = DateTime::new(2019, 8, 8, 0, 0, 0).to_epoch_seconds();
        let mut previous = day;
        for second in 1..(SECONDS_PER_DAY as u64) {
            let dt = from_epoch_seconds(day + second);
            let seconds = dt.to_epoch_seconds();
            assert!(seconds > previous);
            assert_eq!(seconds, day + second);
            previous = seconds;
        }
    }

    #[test]
    fn test_week_rotation_has_no_repeats() {
        let mut date = DateTime::new(2023, 12, 28, 0, 0, 0);
        let mut seen = [false; 7];
        for _ in 0..7 {
            let dow = date.day_of_week().index() as usize;
            assert!(!seen[dow]);
            seen[dow] = true;
            date = next_day(date);
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_inverse_keeps_time_of_day() {
        let dt = DateTime::new(2031, 7, 14, 13, 45, 59);
        assert_eq!(from_epoch_seconds(dt.to_epoch_seconds()), dt);
        assert_eq!(DateTime::new(2015, 6, 1, 12, 0, 0).to_string(), "2015-06-01 12:00:00");
    }
}
