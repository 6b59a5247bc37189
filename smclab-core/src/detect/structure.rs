//! Trend classification and structure breaks (BOS / CHoCH).

use crate::domain::insufficient::MIN_STRUCTURE_CANDLES;
use crate::domain::{Bias, BreakKind, Candle, StructureBreak, SwingPoint, Trend};

use super::swing::merge_swings;

/// Swings per side considered when reading the trend.
const TREND_SWINGS: usize = 3;

/// Bullish when the last three highs and lows both rise strictly, bearish when
/// both fall strictly, neutral otherwise or with fewer than two of either.
pub fn detect_trend(highs: &[SwingPoint], lows: &[SwingPoint]) -> Trend {
    if highs.len() < 2 || lows.len() < 2 {
        return Trend::Neutral;
    }

    let recent_highs = last_prices(highs);
    let recent_lows = last_prices(lows);

    let rising = |p: &[f64]| p.windows(2).all(|w| w[0] < w[1]);
    let falling = |p: &[f64]| p.windows(2).all(|w| w[0] > w[1]);

    if rising(&recent_highs) && rising(&recent_lows) {
        Trend::Bullish
    } else if falling(&recent_highs) && falling(&recent_lows) {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}

fn last_prices(swings: &[SwingPoint]) -> Vec<f64> {
    let mut sorted = swings.to_vec();
    sorted.sort_by_key(|s| s.index);
    let skip = sorted.len().saturating_sub(TREND_SWINGS);
    sorted[skip..].iter().map(|s| s.price).collect()
}

/// Finds the first close beyond each swing before the next swing forms.
///
/// For each consecutive pair of merged swings, candles strictly between them
/// are scanned. A close above a swing high is a bullish break, a close below a
/// swing low a bearish one. Breaks that agree with `detect_trend` are BOS, the
/// rest CHoCH.
pub fn find_structure_breaks(
    candles: &[Candle],
    highs: &[SwingPoint],
    lows: &[SwingPoint],
) -> Vec<StructureBreak> {
    if candles.len() < MIN_STRUCTURE_CANDLES || highs.is_empty() || lows.is_empty() {
        return Vec::new();
    }

    let trend = detect_trend(highs, lows);
    let swings = merge_swings(highs, lows);
    let mut breaks = Vec::new();

    for pair in swings.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let end = curr.index.min(candles.len());
        let start = (prev.index + 1).min(end);

        let hit = candles[start..end].iter().enumerate().find_map(|(k, c)| {
            let direction = if prev.is_high && c.close > prev.price {
                Bias::Bullish
            } else if !prev.is_high && c.close < prev.price {
                Bias::Bearish
            } else {
                return None;
            };
            Some((start + k, c, direction))
        });

        if let Some((index, candle, direction)) = hit {
            let aligned = matches!(
                (direction, trend),
                (Bias::Bullish, Trend::Bullish) | (Bias::Bearish, Trend::Bearish)
            );
            breaks.push(StructureBreak {
                kind: if aligned { BreakKind::Bos } else { BreakKind::Choch },
                direction,
                time: candle.time,
                price: candle.close,
                index,
                broken_level: prev.price,
            });
        }
    }

    breaks
}
