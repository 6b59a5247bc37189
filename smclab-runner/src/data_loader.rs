//! Candle loading from JSON and CSV sources.
//!
//! Fetching is somebody else's job; these readers only decode what a
//! collaborator already saved or streamed.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use smclab_core::domain::{parse_candles, Candle, CandleError, RawCandle, RawNumber};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid candle JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid candle CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("candle error: {0}")]
    Candle(#[from] CandleError),
}

/// Reads a JSON array of `{time, open, high, low, close, volume?}` records.
/// Prices may be numbers or numeric strings.
pub fn candles_from_json<R: Read>(reader: R) -> Result<Vec<Candle>, LoadError> {
    let raw: Vec<RawCandle> = serde_json::from_reader(reader)?;
    Ok(parse_candles(&raw)?)
}

/// One CSV row. Columns are matched by header name.
#[derive(Debug, Deserialize)]
struct CsvRow {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

impl From<CsvRow> for RawCandle {
    fn from(row: CsvRow) -> Self {
        RawCandle {
            time: row.time,
            open: RawNumber::Number(row.open),
            high: RawNumber::Number(row.high),
            low: RawNumber::Number(row.low),
            close: RawNumber::Number(row.close),
            volume: row.volume.map(RawNumber::Number),
        }
    }
}

/// Reads a headed CSV with `time,open,high,low,close[,volume]` columns.
pub fn candles_from_csv<R: Read>(reader: R) -> Result<Vec<Candle>, LoadError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let raw = rdr
        .deserialize::<CsvRow>()
        .map(|row| row.map(RawCandle::from))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parse_candles(&raw)?)
}

/// Loads a `.csv` file as CSV and anything else as JSON.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let file = std::fs::File::open(path)?;
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        candles_from_csv(file)
    } else {
        candles_from_json(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_accepts_numbers_and_strings() {
        let json = r#"[
            {"time": 1000, "open": "100.5", "high": 101, "low": "99.25", "close": 100, "volume": "12"},
            {"time": 2000, "open": 100, "high": 102, "low": 99, "close": "101.5"}
        ]"#;
        let candles = candles_from_json(json.as_bytes()).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open, 100.5);
        assert_eq!(candles[0].low, 99.25);
        assert_eq!(candles[0].volume, 12.0);
        assert_eq!(candles[1].close, 101.5);
        assert_eq!(candles[1].volume, 0.0);
    }

    #[test]
    fn json_reports_bad_numbers() {
        let json = r#"[{"time": 1, "open": "abc", "high": 1, "low": 1, "close": 1}]"#;
        let err = candles_from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Candle(_)));
    }

    #[test]
    fn csv_with_and_without_volume() {
        let csv = "time,open,high,low,close,volume\n1000,1.0,2.0,0.5,1.5,10\n2000,1.5,2.5,1.0,2.0,\n";
        let candles = candles_from_csv(csv.as_bytes()).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].volume, 10.0);
        assert_eq!(candles[1].volume, 0.0);
        assert_eq!(candles[1].time, 2000);
    }

    #[test]
    fn csv_rejects_malformed_rows() {
        let csv = "time,open,high,low,close\n1000,x,2.0,0.5,1.5\n";
        assert!(matches!(candles_from_csv(csv.as_bytes()), Err(LoadError::Csv(_))));
    }
}
