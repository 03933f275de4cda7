//! JSON adapter exposing the engine over HTTP.
//!
//! Engine endpoints are mounted under `/api/v1`; `/health` sits at the root.

pub mod requests;
pub mod responses;
pub mod routes;

use std::sync::Arc;

use axum::Router;

use crate::engine::TourEngine;

/// Shared state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TourEngine>,
}

impl AppState {
    pub fn new(engine: TourEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Builds the complete router with all endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::routes())
        .merge(routes::system_routes())
        .with_state(state)
}
