//! Canonical `YYYY-MM-DD` date keys.
//!
//! Every component that needs a calendar date goes through [`DateKey`] and
//! [`normalize_date_key`]. There is no other date-formatting path in the crate.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, Result};

static DATE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date key pattern is valid"));

/// A calendar date with no time or timezone component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Parse a strict `YYYY-MM-DD` key. Impossible dates (`2026-02-30`) are rejected.
    pub fn parse(key: &str) -> Result<Self> {
        if !DATE_KEY_RE.is_match(key) {
            return Err(EngineError::InvalidDateKey(key.to_string()));
        }
        NaiveDate::parse_from_str(key, "%Y-%m-%d")
            .map(DateKey)
            .map_err(|_| EngineError::InvalidDateKey(key.to_string()))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(DateKey)
            .ok_or_else(|| EngineError::InvalidDateKey(format!("{year:04}-{month:02}-{day:02}")))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Noon UTC on this date. Arithmetic and weekday lookups are anchored
    /// here so no offset can push the result across a day boundary.
    fn noon_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(NaiveTime::MIN)) + Duration::hours(12)
    }

    /// Shift by `days` (negative moves backward).
    pub fn add_days(&self, days: i64) -> Result<Self> {
        Duration::try_days(days)
            .and_then(|delta| self.noon_utc().checked_add_signed(delta))
            .map(|shifted| DateKey(shifted.date_naive()))
            .ok_or_else(|| {
                EngineError::Validation(format!("adding {days} days to {self} overflows"))
            })
    }

    /// Day of week, 0 = Sunday through 6 = Saturday.
    pub fn day_of_week(&self) -> u8 {
        self.noon_utc().weekday().num_days_from_sunday() as u8
    }

    /// Whole days from `self` to `other` (negative if `other` is earlier).
    pub fn days_until(&self, other: DateKey) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        DateKey::parse(s)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Anything a caller may hand over as "a date".
#[derive(Debug, Clone, Copy)]
pub enum DateInput<'a> {
    /// A `YYYY-MM-DD` key or an ISO timestamp string (`YYYY-MM-DDT...`).
    Text(&'a str),
    /// A timestamp. UTC-midnight values are stored DATE columns.
    Timestamp(DateTime<Utc>),
    /// An already-parsed calendar date.
    Date(NaiveDate),
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(text: &'a str) -> Self {
        DateInput::Text(text)
    }
}

impl<'a> From<&'a String> for DateInput<'a> {
    fn from(text: &'a String) -> Self {
        DateInput::Text(text.as_str())
    }
}

impl From<DateTime<Utc>> for DateInput<'_> {
    fn from(ts: DateTime<Utc>) -> Self {
        DateInput::Timestamp(ts)
    }
}

impl From<NaiveDate> for DateInput<'_> {
    fn from(date: NaiveDate) -> Self {
        DateInput::Date(date)
    }
}

impl From<DateKey> for DateInput<'_> {
    fn from(key: DateKey) -> Self {
        DateInput::Date(key.0)
    }
}

/// Normalize a date input, reading non-midnight timestamps in the host's
/// local zone.
pub fn normalize_date_key<'a>(input: impl Into<DateInput<'a>>) -> Result<DateKey> {
    normalize_date_key_with(input, &Local)
}

/// Normalize a date input, reading non-midnight timestamps in `local`.
///
/// - `YYYY-MM-DD` strings are returned as-is (after validation).
/// - Strings with a `T` keep only the part before it; they are never
///   re-read through a timezone.
/// - Timestamps at exactly `00:00:00.000` UTC are DATE values: the UTC date wins.
/// - Any other timestamp is a wall-clock instant: the date in `local` wins.
pub fn normalize_date_key_with<'a, Z: TimeZone>(
    input: impl Into<DateInput<'a>>,
    local: &Z,
) -> Result<DateKey> {
    match input.into() {
        DateInput::Text(text) => {
            let trimmed = text.trim();
            if DATE_KEY_RE.is_match(trimmed) {
                return DateKey::parse(trimmed);
            }
            match trimmed.split_once('T') {
                Some((date_part, _)) if DATE_KEY_RE.is_match(date_part) => {
                    DateKey::parse(date_part)
                }
                _ => Err(EngineError::InvalidDateKey(text.to_string())),
            }
        }
        DateInput::Timestamp(ts) => {
            // Stored timestamps carry millisecond precision
            let at_midnight = ts.num_seconds_from_midnight() == 0 && ts.timestamp_subsec_millis() == 0;
            if at_midnight {
                Ok(DateKey(ts.date_naive()))
            } else {
                Ok(DateKey(ts.with_timezone(local).date_naive()))
            }
        }
        DateInput::Date(date) => Ok(DateKey(date)),
    }
}

/// Shift a `YYYY-MM-DD` key by `days`. Malformed keys are rejected before any arithmetic.
pub fn add_days_to_date_key(key: &str, days: i64) -> Result<DateKey> {
    DateKey::parse(key)?.add_days(days)
}
