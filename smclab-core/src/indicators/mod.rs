//! Indicator series over candles.
//!
//! Indicators are pure functions: candle history in, numeric series out, one
//! value per candle with `f64::NAN` during warmup. No value at index t may
//! depend on candles after t.

pub mod atr;
pub mod ema;
pub mod rsi;
pub mod sma;

pub use atr::{rolling_atr, static_atr, true_range};
pub use ema::{ema_of_series, Ema};
pub use rsi::Rsi;
pub use sma::sma_of_series;

use crate::domain::Candle;

/// A named indicator producing one value per candle.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_50", "rsi_14").
    fn name(&self) -> &str;

    /// Number of candles needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series.
    ///
    /// Returns a `Vec<f64>` of the same length as `candles`; the first
    /// `lookback()` values are `f64::NAN`.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;

    /// Latest finite value, if any.
    fn last_value(&self, candles: &[Candle]) -> Option<f64> {
        self.compute(candles)
            .last()
            .copied()
            .filter(|v| v.is_finite())
    }
}

/// Create synthetic candles from close prices for testing.
///
/// open = prev_close (or close for the first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, one-hour spacing.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                time: 1_700_000_000_000 + i as i64 * 3_600_000,
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
