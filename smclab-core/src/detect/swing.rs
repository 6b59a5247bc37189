//! Swing point detection.

use crate::domain::{Candle, SwingPoint};

/// Finds swing highs and lows with a symmetric window of `n` candles.
///
/// A candle at `i` (with `n <= i < len - n`) is a swing high when its high is
/// strictly above the highs of the `n` candles on each side; equal highs
/// disqualify it. Swing lows mirror this on lows. Both lists are index-ordered.
pub fn find_swing_points(candles: &[Candle], n: usize) -> (Vec<SwingPoint>, Vec<SwingPoint>) {
    let mut highs = Vec::new();
    let mut lows = Vec::new();

    let len = candles.len();
    if len <= 2 * n {
        return (highs, lows);
    }

    for i in n..len - n {
        let c = &candles[i];
        let is_high = (1..=n).all(|j| c.high > candles[i - j].high && c.high > candles[i + j].high);
        let is_low = (1..=n).all(|j| c.low < candles[i - j].low && c.low < candles[i + j].low);

        if is_high {
            highs.push(SwingPoint {
                time: c.time,
                price: c.high,
                index: i,
                is_high: true,
            });
        }
        if is_low {
            lows.push(SwingPoint {
                time: c.time,
                price: c.low,
                index: i,
                is_high: false,
            });
        }
    }

    (highs, lows)
}

/// Merges highs and lows into one index-ordered list. A candle that is both a
/// swing high and a swing low contributes the high first.
pub fn merge_swings(highs: &[SwingPoint], lows: &[SwingPoint]) -> Vec<SwingPoint> {
    let mut all: Vec<SwingPoint> = highs.iter().chain(lows.iter()).copied().collect();
    all.sort_by_key(|s| s.index);
    all
}
