//! Property tests for trade metrics and scoring.
//!
//! 1. Profit factor monotonicity: larger wins never lower the profit factor
//! 2. Score bounds: every score lies in [0, max_score]
//! 3. Win rate bounds: always a percentage

use proptest::prelude::*;
use smclab_core::domain::{Side, Trade};
use smclab_runner::metrics::TradeMetrics;
use smclab_runner::scoring::ScoreWeights;
use std::collections::BTreeMap;

// ── Strategies (proptest) ────────────────────────────────────────────

fn closed_trade(pnl: f64) -> Trade {
    Trade {
        entry_time: 0,
        entry_price: 100.0,
        entry_index: 0,
        signal_type: Side::Buy,
        stop_loss: 50.0,
        take_profit: 200.0,
        exit_time: Some(1),
        exit_price: Some(100.0 + pnl),
        exit_index: Some(1),
        exit_reason: None,
        profit_loss: Some(pnl),
        profit_loss_percent: Some(pnl),
        reason: "test".into(),
        entry_reason: "test".into(),
        metadata: BTreeMap::new(),
    }
}

fn arb_pnls() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-20.0..20.0_f64, 1..60)
}

// ── 1. Profit factor ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn larger_wins_never_lower_profit_factor(pnls in arb_pnls(), boost in 0.01..10.0_f64) {
        let base: Vec<Trade> = pnls.iter().map(|&p| closed_trade(p)).collect();
        let boosted: Vec<Trade> = pnls
            .iter()
            .map(|&p| closed_trade(if p > 0.0 { p + boost } else { p }))
            .collect();

        let a = TradeMetrics::compute(&base);
        let b = TradeMetrics::compute(&boosted);
        prop_assert!(b.profit_factor >= a.profit_factor);
        prop_assert!(b.avg_win >= a.avg_win);
    }
}

// ── 2 & 3. Bounds ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn scores_and_rates_are_bounded(pnls in arb_pnls()) {
        let trades: Vec<Trade> = pnls.iter().map(|&p| closed_trade(p)).collect();
        let m = TradeMetrics::compute(&trades);
        prop_assert!((0.0..=100.0).contains(&m.win_rate));
        prop_assert!(m.max_drawdown >= 0.0);
        prop_assert!(m.profit_factor >= 0.0);

        let score = ScoreWeights::default().score(&m);
        prop_assert!((0.0..=100.0).contains(&score));
    }
}
