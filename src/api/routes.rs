//! Route handlers for the JSON adapter.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::debug;

use super::requests::{
    BasePriceRequest, FormatMoneyRequest, MinorUnitsRequest, QuoteRequest,
    RemainingCapacityRequest, ResolveAvailabilityRequest,
};
use super::responses::{
    BasePriceResponse, FormatMoneyResponse, HealthResponse, MinorUnitsResponse, QuoteResponse,
    RemainingCapacityResponse, ResolveAvailabilityResponse, TourRunKeyResponse,
};
use super::AppState;
use crate::calendar::DateKey;
use crate::capacity::CapacityModel;
use crate::error::Result;
use crate::money::{self, FormatOptions};
use crate::tour_run;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: state.engine.cache().stats(),
    })
}

/// `POST /availability/resolve`
pub async fn resolve_availability(
    State(state): State<AppState>,
    Json(req): Json<ResolveAvailabilityRequest>,
) -> Result<Json<ResolveAvailabilityResponse>> {
    let from = DateKey::parse(&req.from)?;
    let to = DateKey::parse(&req.to)?;
    let runs = state.engine.resolve_runs(&req.schedule, from, to)?;

    Ok(Json(ResolveAvailabilityResponse {
        tour_id: req.schedule.tour_id,
        from: from.to_string(),
        to: to.to_string(),
        count: runs.len(),
        runs,
    }))
}

/// `GET /tour-runs/:key`
pub async fn decode_tour_run(Path(key): Path<String>) -> Result<Json<TourRunKeyResponse>> {
    let decoded = tour_run::decode(&key)?;
    Ok(Json(TourRunKeyResponse {
        key: decoded.to_string(),
        tour_id: decoded.tour_id().to_string(),
        date: decoded.date().to_string(),
        time: decoded.time().to_string(),
    }))
}

/// `POST /capacity/remaining`
pub async fn remaining_capacity(
    State(state): State<AppState>,
    Json(req): Json<RemainingCapacityRequest>,
) -> Result<Json<RemainingCapacityResponse>> {
    let remaining = state.engine.remaining_capacity(
        &req.capacity_model,
        req.booked_count,
        req.capacity_override,
    )?;
    Ok(Json(RemainingCapacityResponse {
        remaining,
        overbooked: remaining < 0,
    }))
}

/// `POST /pricing/quote`
pub async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let breakdown = state.engine.quote(&req.pricing_model, &req.party)?;
    let minor = breakdown.total.to_minor_units()?;
    debug!(pricing_type = %breakdown.pricing_type, total_minor = minor, "quote served");
    Ok(Json(QuoteResponse::new(breakdown, minor)))
}

/// `POST /pricing/base-price`
pub async fn base_price(
    State(state): State<AppState>,
    Json(req): Json<BasePriceRequest>,
) -> Result<Json<BasePriceResponse>> {
    let base_price = state.engine.base_price(&req.pricing_model)?;
    Ok(Json(BasePriceResponse {
        base_price: base_price.into(),
    }))
}

/// `POST /money/minor-units`
pub async fn minor_units(Json(req): Json<MinorUnitsRequest>) -> Result<Json<MinorUnitsResponse>> {
    let currency = money::currency::normalize_code(&req.currency);
    Ok(Json(MinorUnitsResponse {
        minor_units: money::to_minor_units(req.amount, &currency)?,
        decimals: money::get_decimal_places(&currency),
        currency,
    }))
}

/// `POST /money/format`
pub async fn format_money(
    State(state): State<AppState>,
    Json(req): Json<FormatMoneyRequest>,
) -> Result<Json<FormatMoneyResponse>> {
    let options = FormatOptions {
        display: req.display,
        trim_zero_fraction: req.trim_zero_fraction,
    };
    let formatted = state.engine.format_money(req.amount, &req.currency, options)?;
    Ok(Json(FormatMoneyResponse {
        formatted,
        currency: money::currency::normalize_code(&req.currency),
    }))
}

/// Routes mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/availability/resolve", post(resolve_availability))
        .route("/tour-runs/:key", get(decode_tour_run))
        .route("/capacity/remaining", post(remaining_capacity))
        .route("/pricing/quote", post(quote))
        .route("/pricing/base-price", post(base_price))
        .route("/money/minor-units", post(minor_units))
        .route("/money/format", post(format_money))
}

/// Routes mounted at the root.
pub fn system_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
