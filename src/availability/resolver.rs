//! Expands availability windows and departure times into bookable runs.

use std::cmp::{Ordering, Reverse};
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use super::models::{AvailabilityWindow, DepartureTime, TourSchedule};
use crate::calendar::{run_start_utc, DateKey, TimeOfDay};
use crate::error::{EngineError, Result};
use crate::tour_run::TourRunKey;

/// One bookable departure produced by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRun {
    pub key: TourRunKey,
    pub tour_id: String,
    pub date: DateKey,
    pub time: TimeOfDay,
    pub departure_id: String,
    pub departure_label: Option<String>,
    /// Every active window covering this date, in schedule order.
    pub window_ids: Vec<String>,
    /// Capacity override from the winning window (see [`effective_override`]).
    pub max_participants_override: Option<u32>,
}

/// Reject inverted ranges and, when `max_days` is set, ranges wider than it.
pub fn validate_range(from: DateKey, to: DateKey, max_days: Option<u32>) -> Result<()> {
    if from > to {
        return Err(EngineError::InvalidDateRange {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    if let Some(max) = max_days {
        let days = from.days_until(to) + 1;
        if days > i64::from(max) {
            return Err(EngineError::Validation(format!(
                "date range {from}..{to} spans {days} days, limit is {max}"
            )));
        }
    }
    Ok(())
}

/// Resolve the runs of one tour within `[from, to]` (inclusive).
///
/// Output is sorted by `(date, time)` and holds each run key once. Blackout
/// dates remove every run on that date regardless of window coverage.
pub fn resolve_runs(schedule: &TourSchedule, from: DateKey, to: DateKey) -> Result<Vec<ResolvedRun>> {
    validate_range(from, to, None)?;
    let tour_id = schedule.tour_id.as_str();

    let windows: Vec<&AvailabilityWindow> = schedule
        .windows
        .iter()
        .filter(|w| w.is_active && w.tour_id == tour_id)
        .collect();
    for window in &windows {
        window.validate()?;
    }

    let departures = distinct_departures(&schedule.departure_times, tour_id);
    if windows.is_empty() || departures.is_empty() {
        debug!(tour_id, "no active windows or departure times");
        return Ok(Vec::new());
    }

    let blackouts: BTreeSet<DateKey> = schedule
        .blackout_dates
        .iter()
        .filter(|b| b.tour_id == tour_id)
        .map(|b| b.date)
        .collect();

    let mut runs = Vec::new();
    let mut blacked_out = 0usize;
    let mut date = from;
    loop {
        if blackouts.contains(&date) {
            blacked_out += 1;
        } else {
            let covering: Vec<&AvailabilityWindow> =
                windows.iter().copied().filter(|w| w.covers(date)).collect();
            if !covering.is_empty() {
                let max_participants_override = effective_override(&covering);
                let window_ids: Vec<String> = covering.iter().map(|w| w.id.clone()).collect();
                for departure in &departures {
                    runs.push(ResolvedRun {
                        key: TourRunKey::new(tour_id, date, departure.time)?,
                        tour_id: tour_id.to_string(),
                        date,
                        time: departure.time,
                        departure_id: departure.id.clone(),
                        departure_label: departure.label.clone(),
                        window_ids: window_ids.clone(),
                        max_participants_override,
                    });
                }
            }
        }
        if date == to {
            break;
        }
        date = date.add_days(1)?;
    }

    debug!(
        tour_id,
        from = %from,
        to = %to,
        runs = runs.len(),
        blacked_out,
        "resolved tour runs"
    );
    Ok(runs)
}

/// Resolve several tours at once, ordered by `(date, time, tour_id)`.
pub fn resolve_many(schedules: &[TourSchedule], from: DateKey, to: DateKey) -> Result<Vec<ResolvedRun>> {
    validate_range(from, to, None)?;
    let mut runs = Vec::new();
    for schedule in schedules {
        runs.extend(resolve_runs(schedule, from, to)?);
    }
    runs.sort_by(|a, b| a.key.cmp(&b.key));
    runs.dedup_by(|a, b| a.key == b.key);
    Ok(runs)
}

/// Drop runs whose local departure in `tz` is not after `now`.
///
/// Runs at a wall-clock time skipped by DST have no start instant and are kept.
pub fn drop_departed(runs: Vec<ResolvedRun>, tz: &Tz, now: DateTime<Utc>) -> Vec<ResolvedRun> {
    runs.into_iter()
        .filter(|run| match run_start_utc(run.date, run.time, tz) {
            Ok(start) => start > now,
            Err(_) => true,
        })
        .collect()
}

/// Capacity override for a run covered by several windows.
///
/// Only windows that define an override compete. The narrowest
/// `[startDate, endDate]` span wins (open-ended spans are unbounded); ties go
/// to the later `startDate`, then to the lexicographically smaller id.
pub fn effective_override(covering: &[&AvailabilityWindow]) -> Option<u32> {
    covering
        .iter()
        .filter(|w| w.max_participants_override.is_some())
        .min_by(|a, b| override_rank(a, b))
        .and_then(|w| w.max_participants_override)
}

fn override_rank(a: &AvailabilityWindow, b: &AvailabilityWindow) -> Ordering {
    (a.span_days(), Reverse(a.start_date), &a.id).cmp(&(b.span_days(), Reverse(b.start_date), &b.id))
}

/// Departures of `tour_id` with one entry per distinct time, sorted by time.
fn distinct_departures<'a>(departures: &'a [DepartureTime], tour_id: &str) -> Vec<&'a DepartureTime> {
    let mut seen = BTreeSet::new();
    let mut distinct: Vec<&DepartureTime> = departures
        .iter()
        .filter(|d| d.tour_id == tour_id)
        .filter(|d| seen.insert(d.time))
        .collect();
    distinct.sort_by_key(|d| d.time);
    distinct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::models::BlackoutDate;
    use chrono::TimeZone;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn window(id: &str, start: &str, end: Option<&str>, days: &[u8], cap: Option<u32>) -> AvailabilityWindow {
        AvailabilityWindow {
            id: id.to_string(),
            tour_id: "t1".to_string(),
            start_date: key(start),
            end_date: end.map(key),
            days_of_week: days.iter().copied().collect(),
            max_participants_override: cap,
            is_active: true,
        }
    }

    fn departure(id: &str, time: &str) -> DepartureTime {
        DepartureTime {
            id: id.to_string(),
            tour_id: "t1".to_string(),
            time: TimeOfDay::parse(time).unwrap(),
            label: None,
        }
    }

    fn blackout(date: &str) -> BlackoutDate {
        BlackoutDate {
            id: format!("b-{date}"),
            tour_id: "t1".to_string(),
            date: key(date),
            reason: Some("maintenance".to_string()),
        }
    }

    fn january_schedule() -> TourSchedule {
        let mut schedule = TourSchedule::new("t1");
        schedule
            .windows
            .push(window("w1", "2026-01-01", Some("2026-01-31"), &[1, 2, 3, 4, 5], None));
        schedule.departure_times.push(departure("d1", "09:00"));
        schedule.blackout_dates.push(blackout("2026-01-15"));
        schedule
    }

    // ==================== end-to-end ====================

    #[test]
    fn test_january_weekdays_minus_blackout() {
        let runs = resolve_runs(&january_schedule(), key("2026-01-01"), key("2026-01-31")).unwrap();

        // 22 weekdays in January 2026, minus the blackout on Thursday the 15th
        assert_eq!(runs.len(), 21);
        assert!(runs.iter().all(|r| (1..=5).contains(&r.date.day_of_week())));
        assert!(runs.iter().all(|r| r.date != key("2026-01-15")));
        assert_eq!(runs[0].key.to_string(), "t1|2026-01-01|09:00");
        assert_eq!(runs[20].key.to_string(), "t1|2026-01-30|09:00");
    }

    #[test]
    fn test_blackout_beats_every_window() {
        let mut schedule = TourSchedule::new("t1");
        schedule
            .windows
            .push(window("w1", "2026-03-01", None, &[0, 1, 2, 3, 4, 5, 6], Some(8)));
        schedule
            .windows
            .push(window("w2", "2026-03-10", Some("2026-03-10"), &[2], Some(4)));
        schedule.departure_times.push(departure("d1", "08:00"));
        schedule.departure_times.push(departure("d2", "13:00"));
        schedule.blackout_dates.push(blackout("2026-03-10"));

        let runs = resolve_runs(&schedule, key("2026-03-09"), key("2026-03-11")).unwrap();
        assert_eq!(runs.len(), 4);
        assert!(runs.iter().all(|r| r.date != key("2026-03-10")));
    }

    #[test]
    fn test_sorted_by_date_then_time() {
        let mut schedule = TourSchedule::new("t1");
        schedule
            .windows
            .push(window("w1", "2026-02-01", None, &[0, 1, 2, 3, 4, 5, 6], None));
        schedule.departure_times.push(departure("d2", "15:00"));
        schedule.departure_times.push(departure("d1", "07:30"));

        let runs = resolve_runs(&schedule, key("2026-02-01"), key("2026-02-02")).unwrap();
        let keys: Vec<String> = runs.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "t1|2026-02-01|07:30",
                "t1|2026-02-01|15:00",
                "t1|2026-02-02|07:30",
                "t1|2026-02-02|15:00",
            ]
        );
    }

    #[test]
    fn test_overlapping_windows_emit_once() {
        let mut schedule = TourSchedule::new("t1");
        schedule
            .windows
            .push(window("w1", "2026-02-01", None, &[0, 1, 2, 3, 4, 5, 6], None));
        schedule
            .windows
            .push(window("w2", "2026-02-01", Some("2026-02-28"), &[0, 1, 2, 3, 4, 5, 6], None));
        schedule.departure_times.push(departure("d1", "10:00"));
        schedule.departure_times.push(departure("d1-dup", "10:00"));

        let runs = resolve_runs(&schedule, key("2026-02-03"), key("2026-02-03")).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].window_ids, vec!["w1".to_string(), "w2".to_string()]);
        assert_eq!(runs[0].departure_id, "d1");
    }

    #[test]
    fn test_inactive_and_foreign_rows_ignored() {
        let mut schedule = january_schedule();
        schedule.windows[0].is_active = false;
        let mut foreign = window("w2", "2026-01-01", None, &[0, 6], None);
        foreign.tour_id = "t2".to_string();
        schedule.windows.push(foreign);

        let runs = resolve_runs(&schedule, key("2026-01-01"), key("2026-01-31")).unwrap();
        assert!(runs.is_empty());
    }

    #[test]
    fn test_empty_inputs_are_not_errors() {
        let schedule = TourSchedule::new("t1");
        assert!(resolve_runs(&schedule, key("2026-01-01"), key("2026-12-31"))
            .unwrap()
            .is_empty());

        let mut no_times = january_schedule();
        no_times.departure_times.clear();
        assert!(resolve_runs(&no_times, key("2026-01-01"), key("2026-01-31"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = resolve_runs(&january_schedule(), key("2026-02-01"), key("2026-01-01")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_validate_range_limit() {
        assert!(validate_range(key("2026-01-01"), key("2026-12-31"), Some(365)).is_ok());
        assert!(validate_range(key("2026-01-01"), key("2027-01-01"), Some(365)).is_err());
        assert!(validate_range(key("2026-01-01"), key("2026-01-01"), Some(1)).is_ok());
    }

    #[test]
    fn test_invalid_window_is_configuration_error() {
        let mut schedule = january_schedule();
        schedule.windows[0].end_date = Some(key("2025-01-01"));
        let err = resolve_runs(&schedule, key("2026-01-01"), key("2026-01-31")).unwrap_err();
        assert!(matches!(err, EngineError::Configuration { .. }));
    }

    // ==================== override policy ====================

    #[test]
    fn test_override_narrowest_window_wins() {
        let season = window("season", "2026-06-01", Some("2026-08-31"), &[6], Some(30));
        let festival = window("festival", "2026-07-01", Some("2026-07-07"), &[6], Some(12));
        let open = window("open", "2026-01-01", None, &[6], Some(50));
        assert_eq!(effective_override(&[&open, &season, &festival]), Some(12));
        assert_eq!(effective_override(&[&open, &season]), Some(30));
        assert_eq!(effective_override(&[&open]), Some(50));
    }

    #[test]
    fn test_override_ties_prefer_later_start_then_id() {
        let a = window("a", "2026-07-01", Some("2026-07-10"), &[6], Some(10));
        let b = window("b", "2026-07-02", Some("2026-07-11"), &[6], Some(20));
        assert_eq!(effective_override(&[&a, &b]), Some(20));

        let c = window("c", "2026-07-02", Some("2026-07-11"), &[6], Some(30));
        assert_eq!(effective_override(&[&c, &b]), Some(20));
    }

    #[test]
    fn test_override_ignores_windows_without_one() {
        let narrow = window("narrow", "2026-07-04", Some("2026-07-04"), &[6], None);
        let wide = window("wide", "2026-01-01", None, &[6], Some(16));
        assert_eq!(effective_override(&[&narrow, &wide]), Some(16));
        assert_eq!(effective_override(&[&narrow]), None);
    }

    #[test]
    fn test_override_flows_into_runs() {
        let mut schedule = TourSchedule::new("t1");
        schedule
            .windows
            .push(window("base", "2026-07-01", None, &[0, 1, 2, 3, 4, 5, 6], Some(20)));
        schedule
            .windows
            .push(window("holiday", "2026-07-04", Some("2026-07-04"), &[6], Some(6)));
        schedule.departure_times.push(departure("d1", "09:00"));

        let runs = resolve_runs(&schedule, key("2026-07-03"), key("2026-07-04")).unwrap();
        assert_eq!(runs[0].max_participants_override, Some(20));
        assert_eq!(runs[1].max_participants_override, Some(6));
    }

    // ==================== multi-tour and departed ====================

    #[test]
    fn test_resolve_many_interleaves_tours() {
        let first = january_schedule();
        let mut second = TourSchedule::new("t0");
        let mut w = window("x", "2026-01-01", None, &[1, 2, 3, 4, 5], None);
        w.tour_id = "t0".to_string();
        second.windows.push(w);
        let mut d = departure("dx", "09:00");
        d.tour_id = "t0".to_string();
        second.departure_times.push(d);

        let runs = resolve_many(&[first, second], key("2026-01-05"), key("2026-01-05")).unwrap();
        let keys: Vec<String> = runs.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(keys, vec!["t0|2026-01-05|09:00", "t1|2026-01-05|09:00"]);
    }

    #[test]
    fn test_drop_departed() {
        let runs = resolve_runs(&january_schedule(), key("2026-01-05"), key("2026-01-06")).unwrap();
        // 09:00 in Cancun is 14:00 UTC
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 14, 30, 0).unwrap();
        let upcoming = drop_departed(runs, &Tz::America__Cancun, now);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].date, key("2026-01-06"));
    }
}
