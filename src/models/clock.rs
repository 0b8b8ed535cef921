//! Time-of-day helpers: `HH:MM` parsing/formatting and minute arithmetic that wraps at midnight.

use crate::models::error::ScheduleError;
use chrono::{Duration, NaiveTime};

const CLOCK_FORMAT: &str = "%H:%M";

/// Parse `HH:MM` (or `HH:MM:SS`, as a relational store hands times back).
pub fn parse_clock(raw: &str) -> Result<NaiveTime, ScheduleError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, CLOCK_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ScheduleError::InvalidTime(raw.to_string()))
}

/// Format as zero-padded `HH:MM`.
pub fn format_clock(time: NaiveTime) -> String {
    time.format(CLOCK_FORMAT).to_string()
}

/// Add minutes to a time of day. Wraps modulo 24h; the day overflow is dropped.
pub fn add_minutes(time: NaiveTime, minutes: i64) -> NaiveTime {
    let (wrapped, _dropped_secs) = time.overflowing_add_signed(Duration::minutes(minutes));
    wrapped
}

/// String form of [`add_minutes`]: `add_minutes_to_time("23:30", 90)` is `"01:00"`.
pub fn add_minutes_to_time(time: &str, minutes: i64) -> Result<String, ScheduleError> {
    Ok(format_clock(add_minutes(parse_clock(time)?, minutes)))
}

/// Serde adapter for a required `HH:MM` field.
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_clock(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_clock(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for an optional `HH:MM` field.
pub mod hh_mm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_some(&super::format_clock(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|r| super::parse_clock(&r).map_err(serde::de::Error::custom))
            .transpose()
    }
}
