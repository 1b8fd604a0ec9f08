//! Line protocol for driving the RTC from outside.
//!
//! One JSON object per request, one JSON object per reply. Alarm times are
//! exchanged in milliseconds and truncated to whole seconds on the way in.
//!
//! Requests look like `{"op":"alarm","ms":5000,"repeat":true}` or
//! `{"op":"init","datetime":{"year":2015,"month":1,"day":1}}`. `rtc` and
//! `alarm_id` may be given and must be 0.

use core::fmt::Write;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmTarget, MILLIS_PER_SECOND};
use crate::calendar::DateTime;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::rtc::{Rtc, validate_alarm_id, validate_id};

pub const REPLY_CAPACITY: usize = 128;
pub const STATUS_CAPACITY: usize = 32;

pub type ReplyLine = heapless::String<REPLY_CAPACITY>;
pub type StatusLine = heapless::String<STATUS_CAPACITY>;

/// year, month, day, hour, minute, second, microsecond (always 0), tzinfo (always null)
pub type NowTuple = (u16, u8, u8, u8, u8, u8, u32, Option<u8>);

const FALLBACK_REPLY: &str = r#"{"ok":false}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Init,
    Deinit,
    Now,
    Alarm,
    AlarmLeft,
    Cancel,
    Irq,
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Request {
    pub op: Op,
    #[serde(default)]
    pub rtc: u8,
    #[serde(default)]
    pub alarm_id: u8,
    #[serde(default)]
    pub datetime: Option<DateTime>,
    #[serde(default)]
    pub ms: Option<u64>,
    #[serde(default)]
    pub at: Option<DateTime>,
    #[serde(default)]
    pub repeat: bool,
}

impl Request {
    pub fn parse(line: &[u8]) -> Result<Self> {
        serde_json_core::from_slice::<Request>(line)
            .map(|(request, _)| request)
            .map_err(|_| Error::InvalidArgument)
    }

    /// Exactly one of `ms` and `at` selects the alarm kind.
    pub fn alarm_target(&self) -> Result<AlarmTarget> {
        match (self.ms, self.at) {
            (Some(ms), None) => Ok(AlarmTarget::from_millis(ms)),
            (None, Some(at)) => Ok(AlarmTarget::Absolute(at)),
            _ => Err(Error::InvalidArgument),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Reply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub now: Option<NowTuple>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl Reply {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    pub fn millis(seconds: u64) -> Self {
        Self {
            ms: Some(seconds.saturating_mul(MILLIS_PER_SECOND)),
            ..Self::ok()
        }
    }

    pub fn error(error: Error) -> Self {
        warn!("command failed: {}", error.as_str());
        Self {
            error: Some(error.as_str()),
            ..Default::default()
        }
    }
}

fn now_tuple(dt: DateTime) -> NowTuple {
    (dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second, 0, None)
}

pub fn execute<C: Clock>(rtc: &mut Rtc<C>, request: &Request) -> Result<Reply> {
    validate_id(request.rtc)?;

    match request.op {
        Op::Init => {
            let datetime = request.datetime.ok_or(Error::InvalidArgument)?;
            rtc.set_clock(datetime);
            Ok(Reply::ok())
        }
        Op::Deinit => {
            rtc.reset_clock_to_reference();
            Ok(Reply::ok())
        }
        Op::Now => Ok(Reply {
            now: Some(now_tuple(rtc.now())),
            ..Reply::ok()
        }),
        Op::Alarm => {
            validate_alarm_id(request.alarm_id)?;
            let target = request.alarm_target()?;
            let seconds = rtc.arm(target, request.repeat)?;
            Ok(Reply::millis(seconds))
        }
        Op::AlarmLeft => {
            validate_alarm_id(request.alarm_id)?;
            let seconds = rtc.time_remaining()?;
            Ok(Reply::millis(seconds))
        }
        Op::Cancel => {
            validate_alarm_id(request.alarm_id)?;
            rtc.cancel();
            Ok(Reply {
                armed: Some(false),
                ..Reply::ok()
            })
        }
        Op::Irq => {
            rtc.irq()?;
            Ok(Reply::ok())
        }
        Op::Status => {
            let mut status = StatusLine::new();
            write!(status, "{}", rtc).map_err(|_| Error::InvalidArgument)?;
            Ok(Reply {
                status: Some(status),
                armed: Some(rtc.is_armed()),
                ..Reply::ok()
            })
        }
    }
}

/// Parses one request line, runs it and serializes the reply.
pub fn handle_line<C: Clock>(rtc: &mut Rtc<C>, line: &[u8]) -> ReplyLine {
    let reply = Request::parse(line)
        .and_then(|request| execute(rtc, &request))
        .unwrap_or_else(Reply::error);
    serialize(&reply)
}

/// Reply line for a request rejected before it reached the RTC.
pub fn error_line(error: Error) -> ReplyLine {
    serialize(&Reply::error(error))
}

fn serialize(reply: &Reply) -> ReplyLine {
    serde_json_core::to_string::<Reply, REPLY_CAPACITY>(reply).unwrap_or_else(|_| {
        error!("reply does not fit into {} bytes", REPLY_CAPACITY);
        ReplyLine::from_str(FALLBACK_REPLY).unwrap_or_default()
    })
}
