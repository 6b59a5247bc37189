//! Candle: the OHLCV unit every detector and strategy consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV candle. `time` is the open time in epoch milliseconds.
///
/// Candles are immutable once parsed. Series are expected in ascending time
/// order; the core does not enforce monotonicity or gap-freeness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Absolute distance between open and close.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// Upper edge of the body.
    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    /// Lower edge of the body.
    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    /// Open time as a UTC timestamp, `None` when out of chrono's range.
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time)
    }
}

/// A price field that arrives either as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn parse(&self, field: &'static str) -> Result<f64, CandleError> {
        let value = match self {
            RawNumber::Number(n) => *n,
            RawNumber::Text(s) => {
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| CandleError::InvalidNumber {
                        field,
                        value: s.clone(),
                    })?
            }
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CandleError::NonFinite { field })
        }
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

/// Candle record as delivered by an exchange feed, before normalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandle {
    pub time: i64,
    pub open: RawNumber,
    pub high: RawNumber,
    pub low: RawNumber,
    pub close: RawNumber,
    #[serde(default)]
    pub volume: Option<RawNumber>,
}

impl TryFrom<&RawCandle> for Candle {
    type Error = CandleError;

    fn try_from(raw: &RawCandle) -> Result<Self, Self::Error> {
        let volume = match &raw.volume {
            Some(v) => v.parse("volume")?,
            None => 0.0,
        };
        Ok(Candle {
            time: raw.time,
            open: raw.open.parse("open")?,
            high: raw.high.parse("high")?,
            low: raw.low.parse("low")?,
            close: raw.close.parse("close")?,
            volume,
        })
    }
}

impl TryFrom<RawCandle> for Candle {
    type Error = CandleError;

    fn try_from(raw: RawCandle) -> Result<Self, Self::Error> {
        Candle::try_from(&raw)
    }
}

/// Normalises a raw series, reporting the first record that fails.
pub fn parse_candles(raw: &[RawCandle]) -> Result<Vec<Candle>, CandleError> {
    raw.iter()
        .enumerate()
        .map(|(index, r)| {
            Candle::try_from(r).map_err(|source| CandleError::AtIndex {
                index,
                source: Box::new(source),
            })
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum CandleError {
    #[error("field `{field}` is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("field `{field}` is not finite")]
    NonFinite { field: &'static str },

    #[error("candle {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<CandleError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Candle {
        Candle::new(1_700_000_000_000, 100.0, 106.0, 97.0, 104.0, 12.5)
    }

    #[test]
    fn derived_properties() {
        let c = sample();
        assert!(c.is_bullish());
        assert!(!c.is_bearish());
        assert_eq!(c.body(), 4.0);
        assert_eq!(c.range(), 9.0);
        assert_eq!(c.upper_wick(), 2.0);
        assert_eq!(c.lower_wick(), 3.0);
    }

    #[test]
    fn doji_is_neither_bullish_nor_bearish() {
        let c = Candle::new(0, 100.0, 101.0, 99.0, 100.0, 0.0);
        assert!(!c.is_bullish());
        assert!(!c.is_bearish());
        assert_eq!(c.body(), 0.0);
    }

    #[test]
    fn open_time_converts_millis() {
        let t = sample().open_time().unwrap();
        assert_eq!(t.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn raw_candle_accepts_strings_and_numbers() {
        let json = r#"[
            {"time": 1, "open": "100.5", "high": 101, "low": "99.25", "close": 100.75, "volume": "42"},
            {"time": 2, "open": 100.75, "high": 102.0, "low": 100.0, "close": 101.5}
        ]"#;
        let raw: Vec<RawCandle> = serde_json::from_str(json).unwrap();
        let candles = parse_candles(&raw).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open, 100.5);
        assert_eq!(candles[0].high, 101.0);
        assert_eq!(candles[0].volume, 42.0);
        assert_eq!(candles[1].volume, 0.0);
    }

    #[test]
    fn bad_field_reports_index() {
        let raw = vec![
            RawCandle {
                time: 1,
                open: 1.0.into(),
                high: 1.0.into(),
                low: 1.0.into(),
                close: 1.0.into(),
                volume: None,
            },
            RawCandle {
                time: 2,
                open: "abc".into(),
                high: 1.0.into(),
                low: 1.0.into(),
                close: 1.0.into(),
                volume: None,
            },
        ];
        match parse_candles(&raw) {
            Err(CandleError::AtIndex { index, source }) => {
                assert_eq!(index, 1);
                assert!(matches!(*source, CandleError::InvalidNumber { field: "open", .. }));
            }
            other => panic!("expected AtIndex error, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_string_rejected() {
        let raw = RawCandle {
            time: 1,
            open: "NaN".into(),
            high: 1.0.into(),
            low: 1.0.into(),
            close: 1.0.into(),
            volume: None,
        };
        assert!(matches!(
            Candle::try_from(raw),
            Err(CandleError::NonFinite { field: "open" })
        ));
    }
}
