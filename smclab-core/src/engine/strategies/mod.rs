//! The four pattern strategies.
//!
//! Each strategy turns detector output into an
//! [`EntrySignal`](super::lifecycle::EntrySignal) and runs it
//! through the shared lifecycle. Stops sit just beyond the pattern; targets
//! are `risk_reward_ratio` risks away from entry.

pub mod cisd;
pub mod fibonacci;
pub mod fvg;
pub mod order_block;

pub use cisd::{backtest_cisd, CisdRetest};
pub use fibonacci::{backtest_fibonacci, FibonacciTouch};
pub use fvg::{backtest_fair_value_gaps, backtest_fair_value_gaps_with, ConsumedGaps, GapFill};
pub use order_block::{backtest_order_blocks, OrderBlockTouch};

use serde::{Deserialize, Serialize};
use std::fmt;

use super::params::{ParamError, StrategyParams};
use crate::domain::{Candle, Trade};

/// Stop buffer beyond order block and gap edges (0.5%).
pub(crate) const EDGE_STOP_BUFFER: f64 = 0.005;
/// Stop buffer beyond the retracement's swing extreme (0.5%).
pub(crate) const SWING_STOP_BUFFER: f64 = 0.005;
/// Stop buffer beyond a swept swing level (0.1%).
pub(crate) const SWEEP_STOP_BUFFER: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    OrderBlock,
    FairValueGap,
    Fibonacci,
    Cisd,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::OrderBlock,
        StrategyKind::FairValueGap,
        StrategyKind::Fibonacci,
        StrategyKind::Cisd,
    ];

    /// Name used in rankings.
    pub fn display_name(self) -> &'static str {
        match self {
            StrategyKind::OrderBlock => "Order Block",
            StrategyKind::FairValueGap => "Fair Value Gap",
            StrategyKind::Fibonacci => "Fibonacci",
            StrategyKind::Cisd => "CISD",
        }
    }

    /// Name recorded on backtest results.
    pub fn strategy_name(self, params: &StrategyParams) -> String {
        match self {
            StrategyKind::OrderBlock => format!("Order Block ({})", params.entry_method),
            StrategyKind::FairValueGap => "FVG Fill".to_string(),
            StrategyKind::Fibonacci => "Fibonacci Retracement".to_string(),
            StrategyKind::Cisd => "CISD Reversal".to_string(),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BacktestError {
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamError),

    #[error("cannot backtest an empty candle series")]
    EmptySeries,
}

/// Validates inputs shared by every strategy.
pub(crate) fn check_inputs(candles: &[Candle], params: &StrategyParams) -> Result<(), BacktestError> {
    params.validate()?;
    if candles.is_empty() {
        return Err(BacktestError::EmptySeries);
    }
    Ok(())
}

/// Runs one strategy over `candles`. Every returned trade is closed.
pub fn run_strategy(
    kind: StrategyKind,
    candles: &[Candle],
    params: &StrategyParams,
) -> Result<Vec<Trade>, BacktestError> {
    match kind {
        StrategyKind::OrderBlock => backtest_order_blocks(candles, params),
        StrategyKind::FairValueGap => backtest_fair_value_gaps(candles, params),
        StrategyKind::Fibonacci => backtest_fibonacci(candles, params),
        StrategyKind::Cisd => backtest_cisd(candles, params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    #[test]
    fn names() {
        let params = StrategyParams::default();
        assert_eq!(StrategyKind::OrderBlock.strategy_name(&params), "Order Block (edge)");
        assert_eq!(StrategyKind::Cisd.display_name(), "CISD");
        assert_eq!(StrategyKind::FairValueGap.to_string(), "Fair Value Gap");
    }

    #[test]
    fn invalid_params_fail_before_candles() {
        let params = StrategyParams {
            target_levels: vec![],
            ..Default::default()
        };
        for kind in StrategyKind::ALL {
            assert_eq!(
                run_strategy(kind, &[], &params),
                Err(BacktestError::Params(ParamError::EmptyTargetLevels))
            );
        }
    }

    #[test]
    fn empty_series_is_an_error() {
        for kind in StrategyKind::ALL {
            assert_eq!(
                run_strategy(kind, &[], &StrategyParams::default()),
                Err(BacktestError::EmptySeries)
            );
        }
    }

    #[test]
    fn flat_series_trades_nothing() {
        let candles = make_candles(&[100.0; 50]);
        for kind in StrategyKind::ALL {
            let trades = run_strategy(kind, &candles, &StrategyParams::default()).unwrap();
            assert!(trades.is_empty(), "{kind} traded a flat series");
        }
    }
}
