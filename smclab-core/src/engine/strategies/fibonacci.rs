//! Fibonacci retracement touch strategy.

use tracing::{debug, warn};

use super::{check_inputs, BacktestError, SWING_STOP_BUFFER};
use crate::domain::{Candle, Side, Trade};
use crate::engine::lifecycle::{simulate, EntryOrder, EntrySignal};
use crate::engine::params::StrategyParams;
use crate::fibonacci::{nearest_level, Direction, FibonacciAnalyzer, FibonacciLevel, FibonacciRetracement};

/// Enters at the close when it sits within tolerance of a target level,
/// trading with the retracement's direction.
pub struct FibonacciTouch {
    direction: Direction,
    swing_high: f64,
    swing_low: f64,
    targets: Vec<FibonacciLevel>,
    tolerance_percent: f64,
    risk_reward: f64,
}

impl FibonacciTouch {
    pub fn new(retracement: &FibonacciRetracement, params: &StrategyParams) -> Self {
        Self {
            direction: retracement.direction,
            swing_high: retracement.swing_high,
            swing_low: retracement.swing_low,
            targets: retracement.levels_matching(&params.target_levels),
            tolerance_percent: params.fib_tolerance_percent,
            risk_reward: params.risk_reward_ratio,
        }
    }
}

impl EntrySignal for FibonacciTouch {
    fn scan(&mut self, candles: &[Candle], index: usize) -> Option<EntryOrder> {
        let close = candles[index].close;
        let level = nearest_level(close, &self.targets, self.tolerance_percent)?;

        let (side, stop, trend) = match self.direction {
            Direction::Uptrend => (Side::Buy, self.swing_low * (1.0 - SWING_STOP_BUFFER), "uptrend"),
            Direction::Downtrend => (Side::Sell, self.swing_high * (1.0 + SWING_STOP_BUFFER), "downtrend"),
        };

        EntryOrder::bracket(
            side,
            close,
            stop,
            self.risk_reward,
            format!("Fibo {} touch ({trend})", level.label),
        )
        .map(|order| order.with_metadata("fibo_level", level.ratio))
    }
}

/// Backtests touches of one auto-retracement over the last `fib_lookback`
/// candles. Too short a series trades nothing.
pub fn backtest_fibonacci(candles: &[Candle], params: &StrategyParams) -> Result<Vec<Trade>, BacktestError> {
    check_inputs(candles, params)?;

    let retracement = match FibonacciAnalyzer::default().auto_retracement(candles, params.fib_lookback) {
        Ok(r) => r,
        Err(insufficient) => {
            warn!(%insufficient, "fibonacci backtest skipped");
            return Ok(Vec::new());
        }
    };

    let mut signal = FibonacciTouch::new(&retracement, params);
    let trades = simulate(candles, &mut signal);
    debug!(
        direction = ?retracement.direction,
        targets = signal.targets.len(),
        trades = trades.len(),
        "fibonacci backtest"
    );
    Ok(trades)
}
