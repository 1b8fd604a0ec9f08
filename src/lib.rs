//! Real-time clock with a single one-shot or periodic alarm.
//!
//! Wall-clock time lives in the hardware RTC; the alarm is kept in memory
//! as an absolute second count since 2015-01-01 and is settled lazily each
//! time it is queried.
#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to the other modules.
mod fmt;

pub mod alarm;
pub mod calendar;
pub mod clock;
pub mod command;
pub mod error;
#[cfg(feature = "firmware")]
pub mod rp;
pub mod rtc;
pub mod shared;

pub use alarm::{AlarmSlot, AlarmState, AlarmTarget, Expiry};
pub use calendar::{DateTime, DayOfWeek, EPOCH, EpochSeconds};
pub use clock::{Clock, SoftClock};
pub use error::{Error, Result};
pub use rtc::Rtc;
pub use shared::SharedRtc;
