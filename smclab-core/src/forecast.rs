//! Moving-average price projection, the fallback when no statistical
//! forecasting model is available.

use serde::{Deserialize, Serialize};

use crate::domain::{Candle, InsufficientData};
use crate::indicators::sma_of_series;

/// Candles needed before a projection is attempted.
pub const MIN_FORECAST_CANDLES: usize = 100;

const FAST_MA: usize = 7;
const SLOW_MA: usize = 25;
const VOLATILITY_WINDOW: usize = 20;
const UP_DRIFT: f64 = 1.001;
const DOWN_DRIFT: f64 = 0.999;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub step: usize,
    pub timestamp: i64,
    pub predicted_price: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Percent, decaying with distance.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub current_price: f64,
    pub drift: f64,
    pub volatility: f64,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Percent change from the current price to the last projected point.
    pub fn change_percent(&self) -> f64 {
        self.points
            .last()
            .map(|p| (p.predicted_price - self.current_price) / self.current_price * 100.0)
            .unwrap_or(0.0)
    }
}

/// Projects `periods_ahead` candles forward.
///
/// SMA-7 above SMA-25 compounds a +0.1% drift per step, otherwise -0.1%.
/// Bands are `±2·price·vol·√step`, where vol is the sample standard deviation
/// of the last 20 log returns. Timestamps continue the last candle spacing.
pub fn moving_average_forecast(
    candles: &[Candle],
    periods_ahead: usize,
) -> Result<Forecast, InsufficientData> {
    InsufficientData::check(MIN_FORECAST_CANDLES, candles.len())?;

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let fast = sma_of_series(&closes, FAST_MA);
    let slow = sma_of_series(&closes, SLOW_MA);
    let drift = match (fast.last(), slow.last()) {
        (Some(f), Some(s)) if f > s => UP_DRIFT,
        _ => DOWN_DRIFT,
    };

    let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    let volatility = sample_std(&returns[returns.len() - VOLATILITY_WINDOW..]);

    let n = candles.len();
    let last = candles[n - 1];
    let step_ms = last.time - candles[n - 2].time;

    let mut price = last.close;
    let points = (1..=periods_ahead)
        .map(|step| {
            price *= drift;
            let band = 2.0 * price * volatility * (step as f64).sqrt();
            ForecastPoint {
                step,
                timestamp: last.time + step as i64 * step_ms,
                predicted_price: price,
                lower_bound: price - band,
                upper_bound: price + band,
                confidence: (70.0 - 3.0 * step as f64).max(30.0),
            }
        })
        .collect();

    Ok(Forecast {
        current_price: last.close,
        drift,
        volatility,
        points,
    })
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
