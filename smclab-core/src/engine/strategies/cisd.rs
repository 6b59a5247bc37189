//! CISD retest strategy.

use tracing::debug;

use super::{check_inputs, BacktestError, SWEEP_STOP_BUFFER};
use crate::detect::SmcAnalyzer;
use crate::domain::{Bias, Candle, CisdZone, Side, Trade};
use crate::engine::lifecycle::{simulate, EntryOrder, EntrySignal};
use crate::engine::params::StrategyParams;

/// Enters when price comes back into a sweep-and-reverse candle's range
/// within `retest_window` candles of it. Stops sit just past the swept level.
pub struct CisdRetest<'a> {
    zones: &'a [CisdZone],
    retest_window: usize,
    risk_reward: f64,
}

impl<'a> CisdRetest<'a> {
    pub fn new(zones: &'a [CisdZone], params: &StrategyParams) -> Self {
        Self {
            zones,
            retest_window: params.detector.cisd_retest_window,
            risk_reward: params.risk_reward_ratio,
        }
    }
}

impl EntrySignal for CisdRetest<'_> {
    fn scan(&mut self, candles: &[Candle], index: usize) -> Option<EntryOrder> {
        let candle = &candles[index];

        for zone in self.zones {
            if zone.candle_index >= index || index - zone.candle_index > self.retest_window {
                continue;
            }
            if candle.low > zone.top || candle.high < zone.bottom {
                continue;
            }

            let order = match zone.bias {
                Bias::Bullish => {
                    let entry = zone.top.min(candle.open);
                    let stop = zone.liquidity_swept_level * (1.0 - SWEEP_STOP_BUFFER);
                    EntryOrder::bracket(Side::Buy, entry, stop, self.risk_reward, "Bullish CISD Retest")
                }
                Bias::Bearish => {
                    let entry = zone.bottom.max(candle.open);
                    let stop = zone.liquidity_swept_level * (1.0 + SWEEP_STOP_BUFFER);
                    EntryOrder::bracket(Side::Sell, entry, stop, self.risk_reward, "Bearish CISD Retest")
                }
            };
            if let Some(order) = order {
                return Some(order.with_metadata("swept_level", zone.liquidity_swept_level));
            }
        }
        None
    }
}

/// Backtests CISD retests against a fresh detection.
pub fn backtest_cisd(candles: &[Candle], params: &StrategyParams) -> Result<Vec<Trade>, BacktestError> {
    check_inputs(candles, params)?;

    let zones = SmcAnalyzer::new(params.detector.clone())
        .analyze(candles)
        .into_patterns()
        .map(|p| p.cisd_zones)
        .unwrap_or_default();

    let trades = simulate(candles, &mut CisdRetest::new(&zones, params));
    debug!(zones = zones.len(), trades = trades.len(), "cisd backtest");
    Ok(trades)
}
