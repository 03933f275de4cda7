//! Tour availability and pricing engine.
//!
//! Turns stored schedule rows into bookable tour runs, evaluates remaining
//! capacity, prices parties against five pricing models and formats money
//! per currency. Everything is pure and synchronous; the `api` module wraps
//! the engine in an axum router for the binary.

pub mod api;
pub mod availability;
pub mod cache;
pub mod calendar;
pub mod capacity;
pub mod config;
pub mod engine;
pub mod error;
pub mod money;
pub mod pricing;
pub mod tour_run;

pub use engine::TourEngine;
pub use error::{EngineError, ErrorKind, Result};
