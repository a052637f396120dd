//! hc-md
//!
//! Market-data boundary: decodes exchange ISS tables, parses caller-supplied
//! timestamps, and turns a candle history into model input plus the anchor
//! the slot allocator starts from.
//!
//! It does **not** fetch anything; callers hand in already-retrieved JSON.

pub mod forecast;
pub mod iss;
pub mod timestamp;

pub use forecast::{
    assemble_forecast, prepare_forecast_input, validate_values, ForecastError, ForecastInput,
    ForecastPolicy,
};
pub use iss::{
    parse_candles, parse_securities_and_marketdata, Candle, CandlesResponse, IssError, IssTable,
    SecuritySnapshot,
};
pub use timestamp::{format_ts, parse_date, parse_exchange_ts, TimestampError, DEFAULT_EXCHANGE_TZ};
