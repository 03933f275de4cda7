//! Schedule rows supplied by the storage layer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::calendar::{DateKey, TimeOfDay};
use crate::error::{EngineError, Result};

fn default_true() -> bool {
    true
}

/// Recurrence rule: which weekdays, within a date span, a tour may run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub id: String,
    pub tour_id: String,
    pub start_date: DateKey,
    #[serde(default)]
    pub end_date: Option<DateKey>,
    /// 0 = Sunday through 6 = Saturday
    pub days_of_week: BTreeSet<u8>,
    #[serde(default)]
    pub max_participants_override: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl AvailabilityWindow {
    /// Whether the window applies on `date`. Ignores `is_active`.
    pub fn covers(&self, date: DateKey) -> bool {
        if date < self.start_date {
            return false;
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }
        self.days_of_week.contains(&date.day_of_week())
    }

    /// Length of the `[start, end]` span in days; open-ended windows are unbounded.
    pub fn span_days(&self) -> i64 {
        match self.end_date {
            Some(end) => self.start_date.days_until(end),
            None => i64::MAX,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if let Some(end) = self.end_date {
            if end < self.start_date {
                errors.push(format!("endDate {end} is before startDate {}", self.start_date));
            }
        }
        if let Some(day) = self.days_of_week.iter().find(|d| **d > 6) {
            errors.push(format!("daysOfWeek contains {day}, expected 0..=6"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Configuration {
                message: format!("availability window {} is invalid", self.id),
                errors,
            })
        }
    }
}

/// One daily departure slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureTime {
    pub id: String,
    pub tour_id: String,
    pub time: TimeOfDay,
    #[serde(default)]
    pub label: Option<String>,
}

/// A date on which the tour does not run, whatever the windows say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackoutDate {
    pub id: String,
    pub tour_id: String,
    pub date: DateKey,
    #[serde(default)]
    pub reason: Option<String>,
}

/// All schedule rows for one tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourSchedule {
    pub tour_id: String,
    #[serde(default)]
    pub windows: Vec<AvailabilityWindow>,
    #[serde(default)]
    pub departure_times: Vec<DepartureTime>,
    #[serde(default)]
    pub blackout_dates: Vec<BlackoutDate>,
}

impl TourSchedule {
    pub fn new(tour_id: impl Into<String>) -> Self {
        Self {
            tour_id: tour_id.into(),
            windows: Vec::new(),
            departure_times: Vec::new(),
            blackout_dates: Vec::new(),
        }
    }
}
