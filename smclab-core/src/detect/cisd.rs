//! CISD (change in state of delivery) detection: liquidity sweeps that
//! reverse back across the swept swing.

use crate::domain::insufficient::MIN_CISD_CANDLES;
use crate::domain::{Bias, Candle, CisdZone, SwingPoint};

use super::swing::merge_swings;
use super::DetectorConfig;

/// Scans up to `cisd_scan_window` candles after every swing for the first
/// sweep-and-reverse candle.
///
/// Below a swing low: the sweeping candle must close back above it, or the
/// next candle must be bullish and close above it. Above a swing high the rule
/// is mirrored. Each swing yields at most one zone; one candle may back the
/// zones of several swings.
pub fn find_cisd_zones(
    candles: &[Candle],
    highs: &[SwingPoint],
    lows: &[SwingPoint],
    config: &DetectorConfig,
) -> Vec<CisdZone> {
    let len = candles.len();
    if len < MIN_CISD_CANDLES {
        return Vec::new();
    }

    let mut zones = Vec::new();

    for swing in merge_swings(highs, lows) {
        // `cisd_scan_window` candles after the swing, inclusive of the last.
        let start = swing.index + 1;
        let end = (swing.index + config.cisd_scan_window + 1).min(len);

        for i in start..end {
            let candle = &candles[i];
            let next = candles.get(i + 1);

            let reversal = if swing.is_high {
                candle.high > swing.price
                    && (candle.close < swing.price
                        || next.is_some_and(|n| n.close < swing.price && n.is_bearish()))
            } else {
                candle.low < swing.price
                    && (candle.close > swing.price
                        || next.is_some_and(|n| n.close > swing.price && n.is_bullish()))
            };

            if reversal {
                zones.push(CisdZone {
                    bias: if swing.is_high { Bias::Bearish } else { Bias::Bullish },
                    time: candle.time,
                    top: candle.high,
                    bottom: candle.low,
                    candle_index: i,
                    liquidity_swept_level: swing.price,
                });
                break;
            }
        }
    }

    zones
}
