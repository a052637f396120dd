//! Request and response types for all hc-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded
//! by Axum and decoded by tests.  No business logic lives here.

use hc_md::{ForecastInput, IssTable};
use hc_schedule::{TradingDayClass, TradingWindow};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /v1/health  /v1/status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

/// Which calendar the daemon is serving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub daemon_uptime_secs: u64,
    pub config_hash: String,
    pub timezone: String,
    pub holidays: Vec<String>,
    pub max_search_days: u32,
}

// ---------------------------------------------------------------------------
// Errors (4xx / 5xx)
// ---------------------------------------------------------------------------

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code, e.g. `BAD_ANCHOR`, `SCHEDULE_UNAVAILABLE`.
    pub code: String,
    pub error: String,
}

// ---------------------------------------------------------------------------
// /v1/calendar/:date
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDayResponse {
    pub date: String,
    pub weekday: String,
    pub class: TradingDayClass,
    /// `null` on holidays.
    pub window: Option<TradingWindow>,
}

// ---------------------------------------------------------------------------
// /v1/schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// `YYYY-MM-DD HH:MM:SS` (exchange-local) or RFC 3339.
    pub anchor: String,
    #[serde(default)]
    pub start_next_hour: bool,
    pub values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// /v1/forecast/*
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareRequest {
    pub candles: IssTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembleRequest {
    pub input: ForecastInput,
    pub predictions: Vec<f64>,
}

// ---------------------------------------------------------------------------
// /v1/securities
// ---------------------------------------------------------------------------

/// The two ISS blocks of a `securities.json?iss.only=securities,marketdata` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritiesRequest {
    pub securities: IssTable,
    pub marketdata: IssTable,
}
