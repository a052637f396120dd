//! Typed settings read from the merged config by JSON pointer.
//!
//! Absent keys take defaults. Present keys with the wrong shape are errors,
//! never silently defaulted.

use std::net::SocketAddr;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveTime;
use chrono_tz::Tz;
use hc_md::ForecastPolicy;
use hc_schedule::{Calendar, HolidaySet, TradingWindow, DEFAULT_MAX_SEARCH_DAYS};
use serde_json::Value;

use crate::{load_layered_yaml, load_layered_yaml_from_strings, LoadedConfig};

/// IANA zone assumed for exchange-local time when the config names none.
pub const DEFAULT_TIMEZONE: Tz = hc_md::DEFAULT_EXCHANGE_TZ;

const TIME_FORMAT: &str = "%H:%M:%S";

// ---------------------------------------------------------------------------
// Calendar settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSettings {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl WindowSettings {
    fn to_window(self, which: &str) -> Result<TradingWindow> {
        TradingWindow::new(self.open, self.close)
            .map_err(|e| anyhow!("calendar.{which}: {e}"))
    }
}

impl From<TradingWindow> for WindowSettings {
    fn from(w: TradingWindow) -> Self {
        Self {
            open: w.open,
            close: w.close,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSettings {
    pub holidays: HolidaySet,
    pub ordinary: WindowSettings,
    pub non_trading: WindowSettings,
    pub max_search_days: u32,
    pub timezone: Tz,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            holidays: HolidaySet::moex_2025(),
            ordinary: TradingWindow::ordinary_default().into(),
            non_trading: TradingWindow::non_trading_default().into(),
            max_search_days: DEFAULT_MAX_SEARCH_DAYS,
            timezone: DEFAULT_TIMEZONE,
        }
    }
}

impl CalendarSettings {
    pub fn from_json(cfg: &Value) -> Result<Self> {
        let d = Self::default();

        let holidays = match cfg.pointer("/calendar/holidays") {
            None | Some(Value::Null) => d.holidays,
            Some(Value::Array(items)) => {
                let raw = items
                    .iter()
                    .map(|v| {
                        v.as_str()
                            .ok_or_else(|| anyhow!("calendar.holidays: entries must be strings, got {v}"))
                    })
                    .collect::<Result<Vec<&str>>>()?;
                HolidaySet::parse(&raw).map_err(|e| anyhow!("calendar.holidays: {e}"))?
            }
            Some(other) => bail!("calendar.holidays must be a list, got {other}"),
        };

        let ordinary = WindowSettings {
            open: read_time(cfg, "/calendar/ordinary/open")?.unwrap_or(d.ordinary.open),
            close: read_time(cfg, "/calendar/ordinary/close")?.unwrap_or(d.ordinary.close),
        };
        let non_trading = WindowSettings {
            open: read_time(cfg, "/calendar/non_trading/open")?.unwrap_or(d.non_trading.open),
            close: read_time(cfg, "/calendar/non_trading/close")?.unwrap_or(d.non_trading.close),
        };

        let max_search_days = match cfg.pointer("/calendar/max_search_days") {
            None | Some(Value::Null) => d.max_search_days,
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow!("calendar.max_search_days must be a positive integer, got {v}"))?,
        };

        let timezone = match cfg.pointer("/calendar/timezone") {
            None | Some(Value::Null) => d.timezone,
            Some(v) => {
                let name = v
                    .as_str()
                    .ok_or_else(|| anyhow!("calendar.timezone must be a string, got {v}"))?;
                name.parse::<Tz>()
                    .map_err(|e| anyhow!("calendar.timezone '{name}': {e}"))?
            }
        };

        Ok(Self {
            holidays,
            ordinary,
            non_trading,
            max_search_days,
            timezone,
        })
    }

    pub fn build_calendar(&self) -> Result<Calendar> {
        let ordinary = self.ordinary.to_window("ordinary")?;
        let non_trading = self.non_trading.to_window("non_trading")?;
        Calendar::new(self.holidays.clone())
            .with_windows(ordinary, non_trading)
            .with_max_search_days(self.max_search_days)
            .map_err(|e| anyhow!("calendar: {e}"))
    }
}

fn read_time(cfg: &Value, pointer: &str) -> Result<Option<NaiveTime>> {
    match cfg.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
            .map(Some)
            .with_context(|| format!("{pointer}: '{s}' is not HH:MM:SS")),
        Some(other) => bail!("{pointer} must be an 'HH:MM:SS' string, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Everything the binaries read from config.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub loaded: LoadedConfig,
    pub calendar: CalendarSettings,
    pub forecast: ForecastPolicy,
    pub daemon_addr: Option<SocketAddr>,
}

impl AppConfig {
    /// Load and merge `paths`; an empty list yields all defaults.
    pub fn load(paths: &[&str]) -> Result<Self> {
        let loaded = if paths.is_empty() {
            load_layered_yaml_from_strings(&[])?
        } else {
            load_layered_yaml(paths)?
        };
        Self::from_loaded(loaded)
    }

    pub fn from_loaded(loaded: LoadedConfig) -> Result<Self> {
        let cfg = &loaded.config_json;
        let calendar = CalendarSettings::from_json(cfg)?;

        let forecast = match cfg.pointer("/forecast") {
            None | Some(Value::Null) => ForecastPolicy::default(),
            Some(v) => serde_json::from_value::<ForecastPolicy>(v.clone())
                .context("forecast section is malformed")?,
        };
        forecast.validate().map_err(|e| anyhow!("{e}"))?;

        let daemon_addr = match cfg.pointer("/daemon/addr") {
            None | Some(Value::Null) => None,
            Some(v) => {
                let raw = v
                    .as_str()
                    .ok_or_else(|| anyhow!("daemon.addr must be a string, got {v}"))?;
                Some(
                    raw.parse::<SocketAddr>()
                        .with_context(|| format!("daemon.addr '{raw}' is not host:port"))?,
                )
            }
        };

        Ok(Self {
            loaded,
            calendar,
            forecast,
            daemon_addr,
        })
    }

    pub fn config_hash(&self) -> &str {
        &self.loaded.config_hash
    }
}
