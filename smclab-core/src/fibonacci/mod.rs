//! Fibonacci retracement and extension levels.

pub mod confluence;

pub use confluence::{find_confluence, ConfluenceZone, LevelSource};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::{Candle, InsufficientData};

/// Standard retracement ratios.
pub const RETRACEMENT_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Standard extension ratios.
pub const EXTENSION_RATIOS: [f64; 10] = [0.0, 0.618, 1.0, 1.272, 1.414, 1.618, 2.0, 2.618, 3.618, 4.236];

/// Default auto-retracement window.
pub const DEFAULT_LOOKBACK: usize = 50;

/// Closes compared when inferring the auto-retracement direction.
const DIRECTION_WINDOW: usize = 10;

const RATIO_EPSILON: f64 = 1e-9;

const RETRACEMENT_LABELS: [(f64, &str); 7] = [
    (0.0, "0%"),
    (0.236, "23.6%"),
    (0.382, "38.2%"),
    (0.5, "50%"),
    (0.618, "61.8%"),
    (0.786, "78.6%"),
    (1.0, "100%"),
];

const EXTENSION_LABELS: [(f64, &str); 10] = [
    (0.0, "0.0"),
    (0.618, "0.618"),
    (1.0, "1.0"),
    (1.272, "1.272"),
    (1.414, "1.414"),
    (1.618, "1.618"),
    (2.0, "2.0"),
    (2.618, "2.618"),
    (3.618, "3.618"),
    (4.236, "4.236"),
];

/// True when two ratios denote the same level.
pub fn same_ratio(a: f64, b: f64) -> bool {
    (a - b).abs() < RATIO_EPSILON
}

fn label_for(ratio: f64, table: &[(f64, &str)]) -> String {
    table
        .iter()
        .find(|(r, _)| same_ratio(*r, ratio))
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| format!("{ratio:.3}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Uptrend,
    Downtrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevel {
    pub ratio: f64,
    pub price: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciRetracement {
    pub swing_high: f64,
    pub swing_low: f64,
    pub direction: Direction,
    pub levels: Vec<FibonacciLevel>,
}

impl FibonacciRetracement {
    pub fn range(&self) -> f64 {
        self.swing_high - self.swing_low
    }

    /// Levels whose ratio is one of `ratios`.
    pub fn levels_matching(&self, ratios: &[f64]) -> Vec<FibonacciLevel> {
        self.levels
            .iter()
            .filter(|l| ratios.iter().any(|r| same_ratio(*r, l.ratio)))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciExtension {
    pub point_a: f64,
    pub point_b: f64,
    pub point_c: f64,
    pub direction: Direction,
    pub levels: Vec<FibonacciLevel>,
}

/// Level calculator with configurable ratio sets.
#[derive(Debug, Clone, PartialEq)]
pub struct FibonacciAnalyzer {
    retracement_ratios: Vec<f64>,
    extension_ratios: Vec<f64>,
}

impl Default for FibonacciAnalyzer {
    fn default() -> Self {
        Self {
            retracement_ratios: RETRACEMENT_RATIOS.to_vec(),
            extension_ratios: EXTENSION_RATIOS.to_vec(),
        }
    }
}

impl FibonacciAnalyzer {
    pub fn with_ratios(retracement_ratios: Vec<f64>, extension_ratios: Vec<f64>) -> Self {
        Self {
            retracement_ratios,
            extension_ratios,
        }
    }

    /// Uptrend levels hang down from the high, downtrend levels rise from the low.
    pub fn retracement(&self, swing_high: f64, swing_low: f64, direction: Direction) -> FibonacciRetracement {
        let range = swing_high - swing_low;
        let levels = self
            .retracement_ratios
            .iter()
            .map(|&ratio| FibonacciLevel {
                ratio,
                price: match direction {
                    Direction::Uptrend => swing_high - range * ratio,
                    Direction::Downtrend => swing_low + range * ratio,
                },
                label: label_for(ratio, &RETRACEMENT_LABELS),
            })
            .collect();

        FibonacciRetracement {
            swing_high,
            swing_low,
            direction,
            levels,
        }
    }

    /// Projects the A→B leg from C.
    pub fn extension(&self, point_a: f64, point_b: f64, point_c: f64, direction: Direction) -> FibonacciExtension {
        let leg = (point_b - point_a).abs();
        let levels = self
            .extension_ratios
            .iter()
            .map(|&ratio| FibonacciLevel {
                ratio,
                price: match direction {
                    Direction::Uptrend => point_c + leg * ratio,
                    Direction::Downtrend => point_c - leg * ratio,
                },
                label: label_for(ratio, &EXTENSION_LABELS),
            })
            .collect();

        FibonacciExtension {
            point_a,
            point_b,
            point_c,
            direction,
            levels,
        }
    }

    /// Retracement over the last `lookback` candles.
    ///
    /// The swing high/low are the window's extreme high/low. The direction is
    /// up when the last close is above the close ten candles earlier.
    pub fn auto_retracement(
        &self,
        candles: &[Candle],
        lookback: usize,
    ) -> Result<FibonacciRetracement, InsufficientData> {
        InsufficientData::check(lookback.max(1), candles.len())?;

        let window = &candles[candles.len() - lookback.max(1)..];
        let swing_high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let swing_low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

        let recent = &window[window.len().saturating_sub(DIRECTION_WINDOW)..];
        let direction = match (recent.first(), recent.last()) {
            (Some(first), Some(last)) if last.close > first.close => Direction::Uptrend,
            _ => Direction::Downtrend,
        };

        Ok(self.retracement(swing_high, swing_low, direction))
    }
}

/// Nearest level within `tolerance_percent` of `price`.
///
/// Distance is measured relative to the level's price; ties go to the first
/// level in input order.
pub fn nearest_level(
    price: f64,
    levels: &[FibonacciLevel],
    tolerance_percent: f64,
) -> Option<&FibonacciLevel> {
    levels
        .iter()
        .filter_map(|level| {
            let distance = (price - level.price).abs();
            let distance_percent = distance / level.price * 100.0;
            (distance_percent <= tolerance_percent).then_some((level, distance))
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .map(|(level, _)| level)
}
