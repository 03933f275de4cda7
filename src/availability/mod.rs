//! Availability resolution for tour runs.

pub mod models;
pub mod resolver;

pub use models::{AvailabilityWindow, BlackoutDate, DepartureTime, TourSchedule};
pub use resolver::{
    drop_departed, effective_override, resolve_many, resolve_runs, validate_range, ResolvedRun,
};
