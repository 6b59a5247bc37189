//! Integration tests for the runner: every strategy on synthetic series.

use smclab_core::domain::Candle;
use smclab_core::engine::{StrategyKind, StrategyParams};
use smclab_runner::export::{export_trades_csv, FlatExport};
use smclab_runner::metrics::TradeMetrics;
use smclab_runner::runner::run_backtest;

fn flat(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| Candle::new(i as i64 * 3_600_000, 100.0, 100.5, 99.5, 100.0, 10.0))
        .collect()
}

/// Swinging series with real bodies, long enough for every strategy.
fn swinging(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.15).sin() * 8.0 + (i as f64 * 0.9).sin() * 1.5;
            let open = 100.0 + ((i as f64 - 1.0) * 0.15).sin() * 8.0 + ((i as f64 - 1.0) * 0.9).sin() * 1.5;
            Candle::new(i as i64 * 3_600_000, open, open.max(close) + 0.4, open.min(close) - 0.4, close, 10.0)
        })
        .collect()
}

#[test]
fn flat_series_yields_zeroed_metrics_for_every_strategy() {
    let candles = flat(50);
    for kind in StrategyKind::ALL {
        let result = run_backtest(kind, "BTC-USDT", "1h", &candles, &StrategyParams::default()).unwrap();
        assert!(result.trades.is_empty(), "{kind}");
        let m = &result.metrics;
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.profit_factor, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
    }
}

#[test]
fn metrics_agree_with_the_trade_tape() {
    let candles = swinging(600);
    for kind in StrategyKind::ALL {
        let result = run_backtest(kind, "ETH-USDT", "4h", &candles, &StrategyParams::default()).unwrap();
        assert_eq!(result.metrics, TradeMetrics::compute(&result.trades));
        assert_eq!(result.metrics.total_trades, result.trades.len());
        assert_eq!(
            result.metrics.winning_trades + result.metrics.losing_trades,
            result.metrics.total_trades
        );
        assert!(result.trades.iter().all(|t| t.is_closed()));
        assert!((0.0..=100.0).contains(&result.metrics.win_rate));

        let csv = export_trades_csv(&result.trades).unwrap();
        assert_eq!(csv.lines().count(), result.trades.len() + 1);

        let flat = result.to_flat_map();
        assert_eq!(flat["total_trades"], result.trades.len());
        assert!(flat["profit_factor"].as_f64().is_some_and(f64::is_finite));
    }
}

#[test]
fn identical_inputs_give_identical_results() {
    let candles = swinging(400);
    let params = StrategyParams::default();
    for kind in StrategyKind::ALL {
        let a = run_backtest(kind, "X", "1h", &candles, &params).unwrap();
        let b = run_backtest(kind, "X", "1h", &candles, &params).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.params_fingerprint, b.params_fingerprint);
    }
}

#[test]
fn fingerprint_tracks_parameters() {
    let candles = swinging(120);
    let a = run_backtest(StrategyKind::OrderBlock, "X", "1h", &candles, &StrategyParams::default()).unwrap();
    let params = StrategyParams {
        risk_reward_ratio: 3.0,
        ..StrategyParams::default()
    };
    let b = run_backtest(StrategyKind::OrderBlock, "X", "1h", &candles, &params).unwrap();
    assert_ne!(a.params_fingerprint, b.params_fingerprint);
    assert_eq!(a.dataset_hash, b.dataset_hash);
}
