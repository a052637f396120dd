//! Axum router and all HTTP handlers for hc-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers.  Handlers are `pub(crate)` so the scenario tests in
//! `tests/` compose the router directly.
//!
//! Client mistakes (bad anchor, bad date, malformed table) are 400. A schedule
//! fault means the calendar itself is inconsistent, so it is a 500 with code
//! `SCHEDULE_UNAVAILABLE` and no partial result.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Datelike;
use hc_md::{
    assemble_forecast, format_ts, parse_candles, parse_date, parse_exchange_ts,
    parse_securities_and_marketdata, prepare_forecast_input, validate_values, ForecastError,
};
use hc_schedule::{allocate_series, ScheduleError, TradingCalendar};
use tracing::{error, info};

use crate::{
    api_types::{
        AssembleRequest, CalendarDayResponse, ErrorResponse, HealthResponse, PrepareRequest,
        ScheduleRequest, SecuritiesRequest, StatusResponse,
    },
    state::{uptime_secs, AppState},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/status", get(status_handler))
        .route("/v1/calendar/:date", get(calendar_day))
        .route("/v1/schedule", post(schedule))
        .route("/v1/forecast/prepare", post(forecast_prepare))
        .route("/v1/forecast/assemble", post(forecast_assemble))
        .route("/v1/securities", post(securities))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn reject(status: StatusCode, code: &str, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            code: code.to_string(),
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn bad_request(code: &str, error: impl ToString) -> Response {
    reject(StatusCode::BAD_REQUEST, code, error)
}

/// Body decode failures are always 400 here, regardless of the rejection
/// kind axum picked.
fn bad_body(rej: JsonRejection) -> Response {
    bad_request("BAD_REQUEST", rej.body_text())
}

fn schedule_unavailable(e: &ScheduleError) -> Response {
    error!(error = %e, "schedule fault");
    reject(
        StatusCode::INTERNAL_SERVER_ERROR,
        "SCHEDULE_UNAVAILABLE",
        format!("SCHEDULE_UNAVAILABLE: {e}"),
    )
}

fn forecast_failure(e: ForecastError) -> Response {
    match e {
        ForecastError::Schedule(inner) => schedule_unavailable(&inner),
        ForecastError::InsufficientHistory { .. } => bad_request("INSUFFICIENT_HISTORY", e),
        ForecastError::NonFiniteValue { .. } => bad_request("NON_FINITE_VALUE", e),
        ForecastError::InvalidPolicy(_) => {
            reject(StatusCode::INTERNAL_SERVER_ERROR, "INVALID_POLICY", e)
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

pub(crate) async fn status_handler(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StatusResponse {
            daemon_uptime_secs: uptime_secs(),
            config_hash: st.config_hash.clone(),
            timezone: st.timezone.name().to_string(),
            holidays: st.calendar.holidays().iter().map(|d| d.to_string()).collect(),
            max_search_days: st.calendar.max_search_days(),
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/calendar/:date
// ---------------------------------------------------------------------------

pub(crate) async fn calendar_day(
    State(st): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Response {
    let date = match parse_date(&raw) {
        Ok(d) => d,
        Err(e) => return bad_request("BAD_DATE", e),
    };
    let class = st.calendar.classify(date);
    (
        StatusCode::OK,
        Json(CalendarDayResponse {
            date: date.to_string(),
            weekday: date.weekday().to_string(),
            class,
            window: st.calendar.window_for(class),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// POST /v1/schedule
// ---------------------------------------------------------------------------

pub(crate) async fn schedule(
    State(st): State<Arc<AppState>>,
    body: Result<Json<ScheduleRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rej) => return bad_body(rej),
    };
    let anchor = match parse_exchange_ts(&req.anchor, st.timezone) {
        Ok(ts) => ts,
        Err(e) => return bad_request("BAD_ANCHOR", e),
    };
    if let Err(e) = validate_values(&req.values) {
        return bad_request("NON_FINITE_VALUE", e);
    }

    match allocate_series(st.calendar.as_ref(), anchor, req.start_next_hour, &req.values) {
        Ok(slots) => {
            info!(
                anchor = %format_ts(anchor),
                start_next_hour = req.start_next_hour,
                count = slots.len(),
                "schedule"
            );
            (StatusCode::OK, Json(slots)).into_response()
        }
        Err(e) => schedule_unavailable(&e),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/forecast/prepare
// ---------------------------------------------------------------------------

pub(crate) async fn forecast_prepare(
    State(st): State<Arc<AppState>>,
    body: Result<Json<PrepareRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rej) => return bad_body(rej),
    };
    let candles = match parse_candles(&req.candles) {
        Ok(c) => c,
        Err(e) => return bad_request("BAD_CANDLES", e),
    };
    match prepare_forecast_input(&candles, &st.forecast) {
        Ok(input) => (StatusCode::OK, Json(input)).into_response(),
        Err(e) => forecast_failure(e),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/forecast/assemble
// ---------------------------------------------------------------------------

pub(crate) async fn forecast_assemble(
    State(st): State<Arc<AppState>>,
    body: Result<Json<AssembleRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rej) => return bad_body(rej),
    };
    match assemble_forecast(st.calendar.as_ref(), &req.input, &req.predictions) {
        Ok(slots) => (StatusCode::OK, Json(slots)).into_response(),
        Err(e) => forecast_failure(e),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/securities
// ---------------------------------------------------------------------------

pub(crate) async fn securities(body: Result<Json<SecuritiesRequest>, JsonRejection>) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rej) => return bad_body(rej),
    };
    match parse_securities_and_marketdata(&req.securities, &req.marketdata) {
        Ok(merged) => (StatusCode::OK, Json(merged)).into_response(),
        Err(e) => bad_request("BAD_SECURITIES", e),
    }
}
