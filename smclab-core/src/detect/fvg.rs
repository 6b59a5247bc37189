//! Fair value gap detection.

use crate::domain::insufficient::MIN_FVG_CANDLES;
use crate::domain::{Bias, Candle, FairValueGap};
use crate::indicators::static_atr;

use super::DetectorConfig;

/// Detects three-candle imbalances of at least `static_atr * min_gap_atr_ratio`.
///
/// Bullish when `low[i] > high[i-2]`, bearish when `high[i] < low[i-2]`.
/// Gaps are returned in index order without truncation.
pub fn find_fair_value_gaps(candles: &[Candle], config: &DetectorConfig) -> Vec<FairValueGap> {
    if candles.len() < MIN_FVG_CANDLES {
        return Vec::new();
    }

    let min_gap = static_atr(candles, config.atr_period) * config.min_gap_atr_ratio;
    let mut gaps = Vec::new();

    for (offset, window) in candles.windows(3).enumerate() {
        let (first, last) = (&window[0], &window[2]);
        let gap = if last.low > first.high {
            Some((Bias::Bullish, last.low, first.high))
        } else if last.high < first.low {
            Some((Bias::Bearish, first.low, last.high))
        } else {
            None
        };

        if let Some((bias, top, bottom)) = gap {
            if top - bottom >= min_gap {
                gaps.push(FairValueGap {
                    bias,
                    time_start: first.time,
                    time_end: last.time,
                    top,
                    bottom,
                    index_start: offset,
                    index_end: offset + 2,
                    filled: false,
                    fill_percentage: 0.0,
                });
            }
        }
    }

    gaps
}
