//! Backtest runner: wires a strategy, its trades and their metrics together.

use serde::{Deserialize, Serialize};
use tracing::info;

use smclab_core::domain::{Candle, Trade};
use smclab_core::engine::{run_strategy, BacktestError, StrategyKind, StrategyParams};
use smclab_core::fingerprint::dataset_hash;

use crate::metrics::TradeMetrics;

/// Complete result of one strategy backtest on one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub symbol: String,
    /// Opaque timeframe label.
    pub interval: String,
    pub strategy: StrategyKind,
    pub strategy_name: String,
    /// Open time of the first candle, epoch milliseconds.
    pub start_time: i64,
    /// Open time of the last candle, epoch milliseconds.
    pub end_time: i64,
    pub metrics: TradeMetrics,
    pub trades: Vec<Trade>,
    pub parameters: StrategyParams,
    pub params_fingerprint: String,
    pub dataset_hash: String,
}

/// Runs one strategy and computes its metrics.
///
/// A run without trades is a valid result with zeroed metrics.
pub fn run_backtest(
    kind: StrategyKind,
    symbol: &str,
    interval: &str,
    candles: &[Candle],
    params: &StrategyParams,
) -> Result<BacktestResult, BacktestError> {
    let trades = run_strategy(kind, candles, params)?;
    let metrics = TradeMetrics::compute(&trades);

    let (start_time, end_time) = match (candles.first(), candles.last()) {
        (Some(first), Some(last)) => (first.time, last.time),
        _ => return Err(BacktestError::EmptySeries),
    };

    info!(
        symbol,
        interval,
        strategy = %kind,
        trades = metrics.total_trades,
        wins = metrics.winning_trades,
        win_rate = metrics.win_rate,
        pnl_pct = metrics.total_profit_loss_percent,
        "backtest complete"
    );

    Ok(BacktestResult {
        symbol: symbol.to_string(),
        interval: interval.to_string(),
        strategy: kind,
        strategy_name: kind.strategy_name(params),
        start_time,
        end_time,
        metrics,
        trades,
        parameters: params.clone(),
        params_fingerprint: params.fingerprint(),
        dataset_hash: dataset_hash(candles),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use smclab_core::engine::ParamError;

    fn flat(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::new(i as i64 * 60_000, 100.0, 100.5, 99.5, 100.0, 1.0))
            .collect()
    }

    #[test]
    fn flat_series_gives_empty_result() {
        let candles = flat(50);
        let result = run_backtest(StrategyKind::FairValueGap, "BTC-USDT", "1h", &candles, &StrategyParams::default())
            .unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.metrics, TradeMetrics::default());
        assert_eq!(result.start_time, 0);
        assert_eq!(result.end_time, 49 * 60_000);
        assert_eq!(result.strategy_name, "FVG Fill");
        assert_eq!(result.params_fingerprint, StrategyParams::default().fingerprint());
        assert_eq!(result.dataset_hash, dataset_hash(&candles));
    }

    #[test]
    fn empty_series_is_an_error() {
        let err = run_backtest(StrategyKind::Cisd, "X", "1h", &[], &StrategyParams::default()).unwrap_err();
        assert_eq!(err, BacktestError::EmptySeries);
    }

    #[test]
    fn invalid_params_fail_fast() {
        let params = StrategyParams {
            risk_reward_ratio: -1.0,
            ..StrategyParams::default()
        };
        let err = run_backtest(StrategyKind::OrderBlock, "X", "1h", &flat(30), &params).unwrap_err();
        assert_eq!(err, BacktestError::Params(ParamError::InvalidRiskReward(-1.0)));
    }
}
