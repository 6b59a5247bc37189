//! Order block detection.
//!
//! A bearish candle followed by a strong rally is a bullish order block; a
//! bullish candle followed by a strong drop is a bearish one. "Strong" means
//! at least two of the next three candles agree with the move and the move
//! spans `min_strength` rolling ATRs.

use crate::domain::insufficient::MIN_ORDER_BLOCK_CANDLES;
use crate::domain::{Bias, Candle, OrderBlock};
use crate::indicators::rolling_atr;
use std::cmp::Ordering;

use super::DetectorConfig;

/// Candles after the candidate that confirm the move.
const CONFIRMATION_CANDLES: usize = 3;

/// Detects order blocks, strongest first, truncated to `max_order_blocks`.
///
/// Ranking is by `(strength, time)` descending; equal keys keep detection order.
pub fn find_order_blocks(candles: &[Candle], config: &DetectorConfig) -> Vec<OrderBlock> {
    let len = candles.len();
    if len < MIN_ORDER_BLOCK_CANDLES {
        return Vec::new();
    }

    let atr = rolling_atr(candles, config.atr_period);
    let mut blocks = Vec::new();

    let start = config.atr_period + CONFIRMATION_CANDLES;
    let end = len.saturating_sub(CONFIRMATION_CANDLES);

    for i in start..end {
        let current = &candles[i];
        let next = &candles[i + 1..=i + CONFIRMATION_CANDLES];
        let atr_i = atr[i];

        if current.is_bearish() {
            let confirming = next.iter().filter(|c| c.is_bullish()).count();
            let reach = next.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
            let strength = normalised_move(reach - current.close, atr_i);
            if confirming >= 2 && strength >= config.min_strength {
                blocks.push(OrderBlock {
                    bias: Bias::Bullish,
                    time: current.time,
                    top: current.body_top(),
                    bottom: current.low,
                    candle_index: i,
                    strength: strength.min(1.0),
                    tested: false,
                    broken: false,
                });
            }
        } else if current.is_bullish() {
            let confirming = next.iter().filter(|c| c.is_bearish()).count();
            let reach = next.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            let strength = normalised_move(current.close - reach, atr_i);
            if confirming >= 2 && strength >= config.min_strength {
                blocks.push(OrderBlock {
                    bias: Bias::Bearish,
                    time: current.time,
                    top: current.high,
                    bottom: current.body_bottom(),
                    candle_index: i,
                    strength: strength.min(1.0),
                    tested: false,
                    broken: false,
                });
            }
        }
    }

    blocks.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(Ordering::Equal)
            .then(b.time.cmp(&a.time))
    });
    blocks.truncate(config.max_order_blocks);
    blocks
}

fn normalised_move(distance: f64, atr: f64) -> f64 {
    if atr > 0.0 {
        distance / atr
    } else {
        0.0
    }
}
