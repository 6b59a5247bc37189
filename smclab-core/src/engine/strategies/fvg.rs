//! Fair value gap fill strategy.
//!
//! A gap is consumed the first time it produces an entry. Consumption lives
//! in a per-run [`ConsumedGaps`] set, so the detector output itself stays
//! untouched and can be shared between runs.

use std::collections::BTreeMap;
use tracing::debug;

use super::{check_inputs, BacktestError, EDGE_STOP_BUFFER};
use crate::detect::SmcAnalyzer;
use crate::domain::{Bias, Candle, FairValueGap, Side, Trade};
use crate::engine::lifecycle::{simulate, EntryOrder, EntrySignal};
use crate::engine::params::StrategyParams;

/// Gaps already used for an entry, keyed by position in the gap list, with
/// the filled fraction at entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumedGaps {
    fills: BTreeMap<usize, f64>,
}

impl ConsumedGaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, gap: usize) -> bool {
        self.fills.contains_key(&gap)
    }

    pub fn len(&self) -> usize {
        self.fills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    /// Filled fraction recorded when `gap` was consumed.
    pub fn fill_fraction(&self, gap: usize) -> Option<f64> {
        self.fills.get(&gap).copied()
    }

    fn consume(&mut self, gap: usize, fraction: f64) {
        self.fills.insert(gap, fraction);
    }

    /// Writes `filled` / `fill_percentage` onto a gap list for reporting.
    pub fn apply(&self, gaps: &mut [FairValueGap]) {
        for (&i, &fraction) in &self.fills {
            if let Some(gap) = gaps.get_mut(i) {
                gap.filled = true;
                gap.fill_percentage = fraction * 100.0;
            }
        }
    }
}

/// Enters when a candle closes at least `fill_threshold` of the way into an
/// unfilled gap. Fills are at the close.
pub struct GapFill<'a> {
    gaps: &'a [FairValueGap],
    consumed: &'a mut ConsumedGaps,
    fill_threshold: f64,
    risk_reward: f64,
}

impl<'a> GapFill<'a> {
    pub fn new(gaps: &'a [FairValueGap], consumed: &'a mut ConsumedGaps, params: &StrategyParams) -> Self {
        Self {
            gaps,
            consumed,
            fill_threshold: params.fill_threshold,
            risk_reward: params.risk_reward_ratio,
        }
    }
}

impl EntrySignal for GapFill<'_> {
    fn scan(&mut self, candles: &[Candle], index: usize) -> Option<EntryOrder> {
        let candle = &candles[index];

        for (i, gap) in self.gaps.iter().enumerate() {
            if gap.index_end >= index || gap.filled || self.consumed.contains(i) {
                continue;
            }
            let size = gap.size();

            let setup = match gap.bias {
                Bias::Bullish if candle.low <= gap.top && candle.close > gap.bottom => {
                    let fill = (candle.close - gap.bottom) / size;
                    (fill >= self.fill_threshold).then(|| {
                        let stop = gap.bottom * (1.0 - EDGE_STOP_BUFFER);
                        (fill, EntryOrder::bracket(Side::Buy, candle.close, stop, self.risk_reward, "Bullish FVG fill"))
                    })
                }
                Bias::Bearish if candle.high >= gap.bottom && candle.close < gap.top => {
                    let fill = (gap.top - candle.close) / size;
                    (fill >= self.fill_threshold).then(|| {
                        let stop = gap.top * (1.0 + EDGE_STOP_BUFFER);
                        (fill, EntryOrder::bracket(Side::Sell, candle.close, stop, self.risk_reward, "Bearish FVG fill"))
                    })
                }
                _ => None,
            };

            if let Some((fill, Some(order))) = setup {
                self.consumed.consume(i, fill);
                return Some(order.with_metadata("fvg_size", size));
            }
        }
        None
    }
}

/// Backtests gap fills against a fresh detection.
pub fn backtest_fair_value_gaps(candles: &[Candle], params: &StrategyParams) -> Result<Vec<Trade>, BacktestError> {
    check_inputs(candles, params)?;
    let gaps = SmcAnalyzer::new(params.detector.clone())
        .analyze(candles)
        .into_patterns()
        .map(|p| p.fair_value_gaps)
        .unwrap_or_default();
    backtest_fair_value_gaps_with(candles, &gaps, params, &mut ConsumedGaps::new())
}

/// Backtests gap fills over a caller-supplied gap list.
///
/// Gaps already in `consumed`, or flagged `filled`, are skipped; gaps used by
/// this run are added to `consumed`.
pub fn backtest_fair_value_gaps_with(
    candles: &[Candle],
    gaps: &[FairValueGap],
    params: &StrategyParams,
    consumed: &mut ConsumedGaps,
) -> Result<Vec<Trade>, BacktestError> {
    check_inputs(candles, params)?;
    let already = consumed.len();
    let trades = simulate(candles, &mut GapFill::new(gaps, consumed, params));
    debug!(
        gaps = gaps.len(),
        consumed = consumed.len() - already,
        trades = trades.len(),
        "fair value gap backtest"
    );
    Ok(trades)
}
