//! Strategy parameters, validated before any candle is processed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::detect::DetectorConfig;

/// Where an order block entry is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntryMethod {
    /// Near edge of the block: top for bullish, bottom for bearish.
    #[default]
    Edge,
    /// Open of the order block candle.
    Open,
    /// Midpoint of the block.
    Midpoint,
}

impl EntryMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryMethod::Edge => "edge",
            EntryMethod::Open => "open",
            EntryMethod::Midpoint => "50%",
        }
    }
}

impl fmt::Display for EntryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryMethod {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edge" => Ok(EntryMethod::Edge),
            "open" => Ok(EntryMethod::Open),
            "50%" => Ok(EntryMethod::Midpoint),
            other => Err(ParamError::UnknownEntryMethod(other.to_string())),
        }
    }
}

impl TryFrom<String> for EntryMethod {
    type Error = ParamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntryMethod> for String {
    fn from(value: EntryMethod) -> Self {
        value.as_str().to_string()
    }
}

/// Everything a strategy backtest needs besides the candles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub risk_reward_ratio: f64,
    pub entry_method: EntryMethod,
    /// Fraction of a fair value gap that must be filled before entering.
    pub fill_threshold: f64,
    /// Fibonacci ratios traded by the retracement strategy.
    pub target_levels: Vec<f64>,
    pub fib_lookback: usize,
    pub fib_tolerance_percent: f64,
    pub detector: DetectorConfig,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            risk_reward_ratio: 2.0,
            entry_method: EntryMethod::Edge,
            fill_threshold: 0.5,
            target_levels: vec![0.618, 0.786],
            fib_lookback: 100,
            fib_tolerance_percent: 0.5,
            detector: DetectorConfig::default(),
        }
    }
}

impl StrategyParams {
    /// Fails fast on the first out-of-range value.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.risk_reward_ratio.is_finite() && self.risk_reward_ratio > 0.0) {
            return Err(ParamError::InvalidRiskReward(self.risk_reward_ratio));
        }
        if self.target_levels.is_empty() {
            return Err(ParamError::EmptyTargetLevels);
        }
        if let Some(&bad) = self.target_levels.iter().find(|r| !r.is_finite()) {
            return Err(ParamError::InvalidTargetLevel(bad));
        }
        if !(0.0..=1.0).contains(&self.fill_threshold) {
            return Err(ParamError::InvalidFillThreshold(self.fill_threshold));
        }
        if !(self.fib_tolerance_percent.is_finite() && self.fib_tolerance_percent >= 0.0) {
            return Err(ParamError::InvalidTolerance(self.fib_tolerance_percent));
        }
        if self.fib_lookback == 0 {
            return Err(ParamError::InvalidLookback);
        }

        let d = &self.detector;
        if d.swing_length == 0 {
            return Err(ParamError::InvalidSwingLength);
        }
        if !(d.min_strength.is_finite() && d.min_strength >= 0.0) {
            return Err(ParamError::InvalidMinStrength(d.min_strength));
        }
        if !(d.min_gap_atr_ratio.is_finite() && d.min_gap_atr_ratio >= 0.0) {
            return Err(ParamError::InvalidGapRatio(d.min_gap_atr_ratio));
        }
        if d.atr_period == 0 {
            return Err(ParamError::InvalidAtrPeriod);
        }
        Ok(())
    }

    /// Deterministic BLAKE3 hash of the canonical JSON form.
    pub fn fingerprint(&self) -> String {
        crate::fingerprint::hash_json(self)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("risk_reward_ratio must be a positive finite number, got {0}")]
    InvalidRiskReward(f64),

    #[error("unknown entry_method {0:?} (expected edge, open or 50%)")]
    UnknownEntryMethod(String),

    #[error("target_levels must not be empty")]
    EmptyTargetLevels,

    #[error("target level {0} is not finite")]
    InvalidTargetLevel(f64),

    #[error("fill_threshold must lie in [0, 1], got {0}")]
    InvalidFillThreshold(f64),

    #[error("fib_tolerance_percent must be non-negative, got {0}")]
    InvalidTolerance(f64),

    #[error("fib_lookback must be at least 1")]
    InvalidLookback,

    #[error("swing_length must be at least 1")]
    InvalidSwingLength,

    #[error("min_strength must be non-negative, got {0}")]
    InvalidMinStrength(f64),

    #[error("min_gap_atr_ratio must be non-negative, got {0}")]
    InvalidGapRatio(f64),

    #[error("atr_period must be at least 1")]
    InvalidAtrPeriod,
}
