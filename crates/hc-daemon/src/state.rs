//! Shared runtime state for hc-daemon.
//!
//! Everything here is immutable after boot: the calendar is built once from
//! config and shared by reference across concurrent handlers.

use std::sync::Arc;

use anyhow::Result;
use chrono_tz::Tz;
use hc_config::AppConfig;
use hc_md::ForecastPolicy;
use hc_schedule::Calendar;

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            service: "hc-daemon",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub build: BuildInfo,
    pub config_hash: String,
    pub calendar: Arc<Calendar>,
    pub forecast: ForecastPolicy,
    /// Zone RFC 3339 anchors are converted into.
    pub timezone: Tz,
}

impl AppState {
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        Ok(Self {
            build: BuildInfo::current(),
            config_hash: cfg.config_hash().to_string(),
            calendar: Arc::new(cfg.calendar.build_calendar()?),
            forecast: cfg.forecast,
            timezone: cfg.calendar.timezone,
        })
    }

    /// State for an explicit calendar, e.g. one built in a test.
    pub fn with_calendar(calendar: Calendar) -> Self {
        Self {
            build: BuildInfo::current(),
            config_hash: String::new(),
            calendar: Arc::new(calendar),
            forecast: ForecastPolicy::default(),
            timezone: hc_md::DEFAULT_EXCHANGE_TZ,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_calendar(Calendar::moex_default())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}
