//! Order block touch strategy.

use tracing::debug;

use super::{check_inputs, BacktestError, EDGE_STOP_BUFFER};
use crate::detect::SmcAnalyzer;
use crate::domain::{Bias, Candle, OrderBlock, Side, Trade};
use crate::engine::lifecycle::{simulate, EntryOrder, EntrySignal};
use crate::engine::params::{EntryMethod, StrategyParams};

/// Enters when price trades back into an earlier order block.
///
/// Bullish blocks buy when the low reaches the entry level, bearish blocks
/// sell when the high does. If the candle opens beyond the level the fill is
/// at the open.
pub struct OrderBlockTouch<'a> {
    blocks: &'a [OrderBlock],
    method: EntryMethod,
    risk_reward: f64,
}

impl<'a> OrderBlockTouch<'a> {
    pub fn new(blocks: &'a [OrderBlock], params: &StrategyParams) -> Self {
        Self {
            blocks,
            method: params.entry_method,
            risk_reward: params.risk_reward_ratio,
        }
    }

    fn entry_level(&self, ob: &OrderBlock, candles: &[Candle]) -> f64 {
        let edge = match ob.bias {
            Bias::Bullish => ob.top,
            Bias::Bearish => ob.bottom,
        };
        match self.method {
            EntryMethod::Edge => edge,
            EntryMethod::Midpoint => ob.midpoint(),
            EntryMethod::Open => candles.get(ob.candle_index).map_or(edge, |c| c.open),
        }
    }
}

impl EntrySignal for OrderBlockTouch<'_> {
    fn scan(&mut self, candles: &[Candle], index: usize) -> Option<EntryOrder> {
        let candle = &candles[index];

        for ob in self.blocks.iter().filter(|ob| ob.candle_index < index) {
            let target = self.entry_level(ob, candles);
            let order = match ob.bias {
                Bias::Bullish if candle.low <= target => {
                    let entry = if candle.open <= target { candle.open } else { target };
                    let stop = ob.bottom * (1.0 - EDGE_STOP_BUFFER);
                    EntryOrder::bracket(
                        Side::Buy,
                        entry,
                        stop,
                        self.risk_reward,
                        format!("Bullish OB touch ({})", self.method),
                    )
                }
                Bias::Bearish if candle.high >= target => {
                    let entry = if candle.open >= target { candle.open } else { target };
                    let stop = ob.top * (1.0 + EDGE_STOP_BUFFER);
                    EntryOrder::bracket(
                        Side::Sell,
                        entry,
                        stop,
                        self.risk_reward,
                        format!("Bearish OB touch ({})", self.method),
                    )
                }
                _ => None,
            };
            if let Some(order) = order {
                return Some(order.with_metadata("ob_strength", ob.strength));
            }
        }
        None
    }
}

/// Backtests order block touches. Series shorter than a full analysis trade nothing.
pub fn backtest_order_blocks(candles: &[Candle], params: &StrategyParams) -> Result<Vec<Trade>, BacktestError> {
    check_inputs(candles, params)?;

    let analysis = SmcAnalyzer::new(params.detector.clone()).analyze(candles);
    let blocks = analysis
        .into_patterns()
        .map(|p| p.order_blocks)
        .unwrap_or_default();

    let trades = simulate(candles, &mut OrderBlockTouch::new(&blocks, params));
    debug!(blocks = blocks.len(), trades = trades.len(), "order block backtest");
    Ok(trades)
}
