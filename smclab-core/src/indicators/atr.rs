//! True range and the two ATR flavours used by the detectors.
//!
//! The order block detector normalises each candidate by a rolling ATR, while
//! the fair value gap detector uses one static ATR for the whole series.

use crate::domain::Candle;

/// TR[0] = high - low; TR[t] = max(high-low, |high-prev_close|, |low-prev_close|).
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let hl = c.high - c.low;
            match i.checked_sub(1).map(|p| candles[p].close) {
                Some(pc) => hl.max((c.high - pc).abs()).max((c.low - pc).abs()),
                None => hl,
            }
        })
        .collect()
}

/// Mean of the `period` true ranges strictly before each index.
///
/// `result[i]` is NaN for `i < period`.
pub fn rolling_atr(candles: &[Candle], period: usize) -> Vec<f64> {
    let n = candles.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }
    let tr = true_range(candles);
    for i in period..n {
        let sum: f64 = tr[i - period..i].iter().sum();
        result[i] = sum / period as f64;
    }
    result
}

/// One ATR for the whole series: mean TR over candles `1..=min(period, len-1)`.
///
/// Returns 0.0 for fewer than two candles.
pub fn static_atr(candles: &[Candle], period: usize) -> f64 {
    let window = period.min(candles.len().saturating_sub(1));
    if window == 0 {
        return 0.0;
    }
    let tr = true_range(candles);
    let sum: f64 = tr[1..=window].iter().sum();
    sum / window as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(0, open, high, low, close, 0.0)
    }

    #[test]
    fn true_range_uses_previous_close() {
        let candles = vec![
            candle(10.0, 12.0, 9.0, 11.0),
            // gap up: |high - prev_close| = 15 - 11 = 4 > high-low = 2
            candle(14.0, 15.0, 13.0, 14.5),
            // gap down: |low - prev_close| = 14.5 - 10 = 4.5
            candle(11.0, 12.0, 10.0, 11.5),
        ];
        let tr = true_range(&candles);
        assert_approx(tr[0], 3.0, DEFAULT_EPSILON);
        assert_approx(tr[1], 4.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 4.5, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_atr_excludes_current_candle() {
        let candles = make_candles(&[10.0, 10.0, 10.0, 20.0]);
        // make_candles: flat closes give TR = 2.0 each.
        let atr = rolling_atr(&candles, 3);
        assert!(atr[0].is_nan());
        assert!(atr[2].is_nan());
        // Window is TR[0..3], the big candle at 3 is not included.
        assert_approx(atr[3], 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn static_atr_skips_first_candle() {
        let candles = vec![
            candle(10.0, 30.0, 0.0, 10.0), // TR 30, ignored
            candle(10.0, 11.0, 9.0, 10.0),  // TR 2
            candle(10.0, 14.0, 10.0, 12.0), // TR 4
        ];
        assert_approx(static_atr(&candles, 14), 3.0, DEFAULT_EPSILON);
        assert_approx(static_atr(&candles, 1), 2.0, DEFAULT_EPSILON);
        assert_eq!(static_atr(&candles[..1], 14), 0.0);
    }

    #[test]
    fn rolling_atr_first_value_at_period() {
        let candles = make_candles(&[1.0; 20]);
        let values = rolling_atr(&candles, 14);
        assert!(values[13].is_nan());
        assert!(values[14].is_finite());
        assert!(rolling_atr(&candles, 0).iter().all(|v| v.is_nan()));
    }
}
