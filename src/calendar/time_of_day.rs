//! Departure times as `HH:MM` wall-clock values.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use regex::Regex;

use crate::error::{EngineError, Result};

static HH_MM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("time pattern is valid"));

static HH_MM_SS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d):([0-5]\d)$").expect("time pattern is valid")
});

/// A 24-hour wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Strict `HH:MM`, zero-padded.
    pub fn parse(text: &str) -> Result<Self> {
        let caps = HH_MM_RE
            .captures(text)
            .ok_or_else(|| EngineError::InvalidTime(text.to_string()))?;
        Self::from_captures(text, &caps)
    }

    /// `HH:MM`, or `HH:MM:SS` as stored in TIME columns. Seconds are dropped.
    pub fn parse_lenient(text: &str) -> Result<Self> {
        let text = text.trim();
        match HH_MM_SS_RE.captures(text) {
            Some(caps) => Self::from_captures(text, &caps),
            None => Self::parse(text),
        }
    }

    fn from_captures(text: &str, caps: &regex::Captures<'_>) -> Result<Self> {
        let hour = caps[1].parse::<u32>();
        let minute = caps[2].parse::<u32>();
        match (hour, minute) {
            (Ok(h), Ok(m)) => Self::from_hm(h, m),
            _ => Err(EngineError::InvalidTime(text.to_string())),
        }
    }

    pub fn from_hm(hour: u32, minute: u32) -> Result<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(TimeOfDay)
            .ok_or_else(|| EngineError::InvalidTime(format!("{hour:02}:{minute:02}")))
    }

    /// Truncates seconds.
    pub fn from_naive(time: NaiveTime) -> Self {
        TimeOfDay(time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time))
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for TimeOfDay {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        TimeOfDay::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeOfDay::parse_lenient(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strict() {
        assert_eq!(TimeOfDay::parse("09:00").unwrap().to_string(), "09:00");
        assert_eq!(TimeOfDay::parse("23:59").unwrap().to_string(), "23:59");
        assert_eq!(TimeOfDay::parse("00:00").unwrap().to_string(), "00:00");
    }

    #[test]
    fn test_parse_rejects_bad_times() {
        for bad in ["9:00", "24:00", "12:60", "09:00:00", "0900", "", "ab:cd"] {
            assert!(TimeOfDay::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_parse_lenient_drops_seconds() {
        assert_eq!(TimeOfDay::parse_lenient("14:30:45").unwrap().to_string(), "14:30");
        assert_eq!(TimeOfDay::parse_lenient(" 07:05 ").unwrap().to_string(), "07:05");
        assert!(TimeOfDay::parse_lenient("7:05").is_err());
    }

    #[test]
    fn test_ordering() {
        let early = TimeOfDay::parse("08:30").unwrap();
        let late = TimeOfDay::parse("14:00").unwrap();
        assert!(early < late);
    }

    #[test]
    fn test_deserialize_accepts_time_column() {
        let t: TimeOfDay = serde_json::from_str("\"09:00:00\"").unwrap();
        assert_eq!(t, TimeOfDay::from_hm(9, 0).unwrap());
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"09:00\"");
    }

    #[test]
    fn test_from_naive_truncates() {
        let t = TimeOfDay::from_naive(NaiveTime::from_hms_opt(10, 15, 42).unwrap());
        assert_eq!(t.to_string(), "10:15");
    }
}
