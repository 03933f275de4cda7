//! Calendar normalization.
//!
//! Date keys, departure times and organization-timezone extraction.

pub mod date_key;
pub mod time_of_day;
pub mod timezone;

pub use date_key::{
    add_days_to_date_key, normalize_date_key, normalize_date_key_with, DateInput, DateKey,
};
pub use time_of_day::TimeOfDay;
pub use timezone::{
    date_key_in, parse_timezone, resolve_timezone, run_start_utc, today_in, wall_clock_time,
};
