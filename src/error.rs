use core::fmt;

/// Errors reported by the RTC and its alarm slot.
///
/// None of these are retried internally; a failed call leaves the alarm
/// slot exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An RTC or alarm identifier other than 0 was requested.
    InvalidIdentifier,
    /// `arm` was called while an alarm is still pending.
    AlreadyArmed,
    /// The alarm was queried while nothing is pending.
    NotArmed,
    /// An absolute alarm time is not strictly after the current time.
    TimeInPast,
    /// Alarm interrupt registration is not available.
    Unsupported,
    /// A command request could not be parsed or is missing an argument.
    InvalidArgument,
}

impl Error {
    /// Stable name used in command replies.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Error::InvalidIdentifier => "invalid_identifier",
            Error::AlreadyArmed => "already_armed",
            Error::NotArmed => "not_armed",
            Error::TimeInPast => "time_in_past",
            Error::Unsupported => "unsupported",
            Error::InvalidArgument => "invalid_argument",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidIdentifier => f.write_str("RTC and alarm id must be 0"),
            Error::AlreadyArmed => f.write_str("RTC(alarm_id=0) already active"),
            Error::NotArmed => f.write_str("RTC(alarm_id=0) not active"),
            Error::TimeInPast => f.write_str("time already passed"),
            Error::Unsupported => f.write_str("RTC.irq() not implemented"),
            Error::InvalidArgument => f.write_str("invalid argument"),
        }
    }
}

impl core::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
