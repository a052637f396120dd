//! Decoding of exchange ISS tables.
//!
//! ISS returns every block as a column list plus positional rows:
//!
//! ```json
//! { "columns": ["open", "close", "high", "low", "value", "volume", "begin", "end"],
//!   "data": [[310.1, 311.0, 311.2, 309.8, 1.2e9, 3851020, "2025-06-11 10:00:00", "2025-06-11 10:59:59"]] }
//! ```
//!
//! ## Candle column contract
//!
//! | Column   | Required | Notes                          |
//! |----------|----------|--------------------------------|
//! | `begin`  | yes      | `YYYY-MM-DD HH:MM:SS`, exchange-local |
//! | `end`    | yes      | `YYYY-MM-DD HH:MM:SS`, exchange-local |
//! | `close`  | yes      | number (or numeric string)     |
//! | `open`, `high`, `low`, `value`, `volume` | no | `null` allowed |

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use hc_schedule::{ts_format, TS_FORMAT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum IssError {
    /// A required column is absent from the table header.
    MissingColumn(String),
    /// Row length differs from the header length.
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },
    /// A cell could not be decoded into the expected type.
    Field {
        row: usize,
        column: &'static str,
        raw: String,
    },
    /// A marketdata row references a SECID missing from securities.
    UnknownSecurity(String),
}

impl fmt::Display for IssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssError::MissingColumn(col) => write!(f, "iss table missing column '{col}'"),
            IssError::RowWidth { row, expected, got } => write!(
                f,
                "iss row {row}: expected {expected} cells, got {got}"
            ),
            IssError::Field { row, column, raw } => {
                write!(f, "iss row {row}: cannot decode '{column}' from {raw}")
            }
            IssError::UnknownSecurity(secid) => {
                write!(f, "marketdata row for unknown SECID '{secid}'")
            }
        }
    }
}

impl std::error::Error for IssError {}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// One ISS block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssTable {
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

impl IssTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require_column(&self, name: &str) -> Result<usize, IssError> {
        self.column(name)
            .ok_or_else(|| IssError::MissingColumn(name.to_string()))
    }

    fn checked_row(&self, row: usize) -> Result<&[Value], IssError> {
        let cells = &self.data[row];
        if cells.len() != self.columns.len() {
            return Err(IssError::RowWidth {
                row,
                expected: self.columns.len(),
                got: cells.len(),
            });
        }
        Ok(cells)
    }

    /// Zip every row with the column names.
    pub fn rows(&self) -> Result<Vec<Map<String, Value>>, IssError> {
        let mut out = Vec::with_capacity(self.data.len());
        for i in 0..self.data.len() {
            let cells = self.checked_row(i)?;
            let row: Map<String, Value> = self
                .columns
                .iter()
                .cloned()
                .zip(cells.iter().cloned())
                .collect();
            out.push(row);
        }
        Ok(out)
    }
}

/// Top level of the candles endpoint payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandlesResponse {
    pub candles: IssTable,
}

// ---------------------------------------------------------------------------
// Candles
// ---------------------------------------------------------------------------

/// Decoded hourly candle. Timestamps are exchange-local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(with = "ts_format")]
    pub begin: NaiveDateTime,
    #[serde(with = "ts_format")]
    pub end: NaiveDateTime,
    pub open: Option<f64>,
    pub close: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub value: Option<f64>,
    pub volume: Option<f64>,
}

fn cell_repr(v: &Value) -> String {
    v.to_string()
}

fn num_cell(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|x| x.is_finite())
}

fn required_num(cells: &[Value], idx: usize, row: usize, column: &'static str) -> Result<f64, IssError> {
    num_cell(&cells[idx]).ok_or_else(|| IssError::Field {
        row,
        column,
        raw: cell_repr(&cells[idx]),
    })
}

fn optional_num(
    cells: &[Value],
    idx: Option<usize>,
    row: usize,
    column: &'static str,
) -> Result<Option<f64>, IssError> {
    let Some(idx) = idx else { return Ok(None) };
    match &cells[idx] {
        Value::Null => Ok(None),
        v => num_cell(v).map(Some).ok_or_else(|| IssError::Field {
            row,
            column,
            raw: cell_repr(v),
        }),
    }
}

fn ts_cell(cells: &[Value], idx: usize, row: usize, column: &'static str) -> Result<NaiveDateTime, IssError> {
    cells[idx]
        .as_str()
        .and_then(|s| NaiveDateTime::parse_from_str(s.trim(), TS_FORMAT).ok())
        .ok_or_else(|| IssError::Field {
            row,
            column,
            raw: cell_repr(&cells[idx]),
        })
}

/// Decode a candles block, preserving row order.
pub fn parse_candles(table: &IssTable) -> Result<Vec<Candle>, IssError> {
    let begin = table.require_column("begin")?;
    let end = table.require_column("end")?;
    let close = table.require_column("close")?;
    let open = table.column("open");
    let high = table.column("high");
    let low = table.column("low");
    let value = table.column("value");
    let volume = table.column("volume");

    let mut out = Vec::with_capacity(table.data.len());
    for row in 0..table.data.len() {
        let cells = table.checked_row(row)?;
        out.push(Candle {
            begin: ts_cell(cells, begin, row, "begin")?,
            end: ts_cell(cells, end, row, "end")?,
            open: optional_num(cells, open, row, "open")?,
            close: required_num(cells, close, row, "close")?,
            high: optional_num(cells, high, row, "high")?,
            low: optional_num(cells, low, row, "low")?,
            value: optional_num(cells, value, row, "value")?,
            volume: optional_num(cells, volume, row, "volume")?,
        });
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Securities + marketdata
// ---------------------------------------------------------------------------

/// Static and live blocks for one instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecuritySnapshot {
    pub securities: Map<String, Value>,
    pub marketdata: Option<Map<String, Value>>,
}

fn secid_of(row: &Map<String, Value>, idx: usize) -> Result<String, IssError> {
    match row.get("SECID") {
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(IssError::Field {
            row: idx,
            column: "SECID",
            raw: other.map(cell_repr).unwrap_or_else(|| "null".to_string()),
        }),
    }
}

/// Merge the `securities` and `marketdata` blocks by `SECID`.
pub fn parse_securities_and_marketdata(
    securities: &IssTable,
    marketdata: &IssTable,
) -> Result<BTreeMap<String, SecuritySnapshot>, IssError> {
    securities.require_column("SECID")?;
    marketdata.require_column("SECID")?;

    let mut out: BTreeMap<String, SecuritySnapshot> = BTreeMap::new();
    for (i, row) in securities.rows()?.into_iter().enumerate() {
        let secid = secid_of(&row, i)?;
        out.insert(
            secid,
            SecuritySnapshot {
                securities: row,
                marketdata: None,
            },
        );
    }

    for (i, row) in marketdata.rows()?.into_iter().enumerate() {
        let secid = secid_of(&row, i)?;
        let snap = out
            .get_mut(&secid)
            .ok_or_else(|| IssError::UnknownSecurity(secid.clone()))?;
        snap.marketdata = Some(row);
    }
    Ok(out)
}
