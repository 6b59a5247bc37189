//! Relative Strength Index (RSI).
//!
//! Wilder smoothing of average gains and losses.
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        let mut result = vec![f64::NAN; n];
        let p = self.period;

        if n < p + 1 {
            return result;
        }

        let changes: Vec<f64> = candles.windows(2).map(|w| w[1].close - w[0].close).collect();

        let mut avg_gain = changes[..p].iter().filter(|c| **c > 0.0).sum::<f64>() / p as f64;
        let mut avg_loss = -changes[..p].iter().filter(|c| **c < 0.0).sum::<f64>() / p as f64;
        result[p] = compute_rsi(avg_gain, avg_loss);

        for (i, &ch) in changes.iter().enumerate().skip(p) {
            avg_gain = (avg_gain * (p as f64 - 1.0) + ch.max(0.0)) / p as f64;
            avg_loss = (avg_loss * (p as f64 - 1.0) + (-ch).max(0.0)) / p as f64;
            result[i + 1] = compute_rsi(avg_gain, avg_loss);
        }

        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    if avg_gain == 0.0 {
        return 0.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}
