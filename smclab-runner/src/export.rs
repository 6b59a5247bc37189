//! Export: flat key-value maps, CSV tapes and JSON reports.
//!
//! Flat maps are what a presentation layer consumes: numbers are rounded
//! and non-finite values (an infinite profit factor) become `0.0`.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Serialize;
use serde_json::{json, Value};

use smclab_core::domain::Trade;

use crate::multi_timeframe::{MultiTimeframeReport, TimeframeAnalysis};
use crate::runner::BacktestResult;
use crate::scanner::AssetScore;
use crate::scoring::IndicatorRanking;

/// Rounds to `decimals` places; non-finite values map to zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Flat, transport-ready view of a result object.
pub trait FlatExport {
    fn to_flat_map(&self) -> BTreeMap<String, Value>;
}

fn flat(entries: Vec<(&str, Value)>) -> BTreeMap<String, Value> {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

impl FlatExport for BacktestResult {
    fn to_flat_map(&self) -> BTreeMap<String, Value> {
        let m = &self.metrics;
        flat(vec![
            ("symbol", json!(self.symbol)),
            ("interval", json!(self.interval)),
            ("strategy", json!(self.strategy)),
            ("strategy_name", json!(self.strategy_name)),
            ("start_time", json!(self.start_time)),
            ("end_time", json!(self.end_time)),
            ("total_trades", json!(m.total_trades)),
            ("winning_trades", json!(m.winning_trades)),
            ("losing_trades", json!(m.losing_trades)),
            ("win_rate", json!(round_to(m.win_rate, 2))),
            ("total_profit_loss", json!(round_to(m.total_profit_loss, 4))),
            ("total_profit_loss_percent", json!(round_to(m.total_profit_loss_percent, 2))),
            ("avg_win", json!(round_to(m.avg_win, 4))),
            ("avg_loss", json!(round_to(m.avg_loss, 4))),
            ("largest_win", json!(round_to(m.largest_win, 4))),
            ("largest_loss", json!(round_to(m.largest_loss, 4))),
            ("profit_factor", json!(round_to(m.profit_factor, 2))),
            ("max_drawdown", json!(round_to(m.max_drawdown, 2))),
            ("params_fingerprint", json!(self.params_fingerprint)),
            ("dataset_hash", json!(self.dataset_hash)),
        ])
    }
}

impl FlatExport for IndicatorRanking {
    fn to_flat_map(&self) -> BTreeMap<String, Value> {
        flat(vec![
            ("indicator_name", json!(self.indicator_name())),
            ("timeframe", json!(self.timeframe)),
            ("win_rate", json!(round_to(self.win_rate, 2))),
            ("total_trades", json!(self.total_trades)),
            ("profit_factor", json!(round_to(self.profit_factor, 2))),
            ("avg_win", json!(round_to(self.avg_win, 4))),
            ("avg_loss", json!(round_to(self.avg_loss, 4))),
            ("max_drawdown", json!(round_to(self.max_drawdown, 2))),
            ("score", json!(round_to(self.score, 2))),
            ("confidence_level", json!(self.confidence_level().as_str())),
        ])
    }
}

impl FlatExport for TimeframeAnalysis {
    fn to_flat_map(&self) -> BTreeMap<String, Value> {
        flat(vec![
            ("timeframe", json!(self.timeframe)),
            ("total_score", json!(round_to(self.total_score, 2))),
            ("respect_rate", json!(round_to(self.respect_rate, 2))),
            (
                "best_indicator",
                json!(self.best_indicator.as_ref().map(|b| b.indicator_name())),
            ),
            ("indicators_tested", json!(self.indicators.len())),
            ("grade", json!(self.grade().to_string())),
            ("recommendation", json!(self.recommendation())),
        ])
    }
}

impl FlatExport for AssetScore {
    fn to_flat_map(&self) -> BTreeMap<String, Value> {
        flat(vec![
            ("symbol", json!(self.symbol)),
            ("price", json!(round_to(self.price, 8))),
            ("smc_score", json!(round_to(self.smc_score, 1))),
            ("best_strategy", json!(self.best_strategy_name())),
            ("best_timeframe", json!(self.best_timeframe)),
            ("win_rate", json!(round_to(self.win_rate, 1))),
            ("trend", json!(self.trend_label())),
            ("recommendation", json!(self.recommendation().as_str())),
        ])
    }
}

// ─── JSON export ────────────────────────────────────────────────────

/// Pretty JSON of any report. Infinite numbers serialize as `null`.
pub fn export_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize report to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

fn format_time(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}

/// Trade tape as CSV.
///
/// Columns: side, entry_index, entry_time, entry_price, stop_loss,
/// take_profit, exit_index, exit_time, exit_price, exit_reason,
/// profit_loss, profit_loss_percent, bars_held, entry_reason
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "side",
        "entry_index",
        "entry_time",
        "entry_price",
        "stop_loss",
        "take_profit",
        "exit_index",
        "exit_time",
        "exit_price",
        "exit_reason",
        "profit_loss",
        "profit_loss_percent",
        "bars_held",
        "entry_reason",
    ])?;

    for t in trades {
        wtr.write_record([
            t.signal_type.to_string().as_str(),
            &t.entry_index.to_string(),
            &format_time(t.entry_time),
            &format!("{:.6}", t.entry_price),
            &format!("{:.6}", t.stop_loss),
            &format!("{:.6}", t.take_profit),
            &t.exit_index.map(|i| i.to_string()).unwrap_or_default(),
            &t.exit_time.map(format_time).unwrap_or_default(),
            &t.exit_price.map(|p| format!("{p:.6}")).unwrap_or_default(),
            t.exit_reason.map(|r| r.as_str()).unwrap_or(""),
            &format!("{:.4}", t.pnl()),
            &format!("{:.2}", t.profit_loss_percent.unwrap_or(0.0)),
            &t.bars_held().map(|b| b.to_string()).unwrap_or_default(),
            &t.entry_reason,
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Every indicator ranking of a report, one row per (timeframe, indicator),
/// timeframes in report order.
pub fn export_rankings_csv(report: &MultiTimeframeReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "timeframe",
        "indicator",
        "score",
        "confidence",
        "win_rate",
        "total_trades",
        "profit_factor",
        "max_drawdown",
        "timeframe_score",
        "respect_rate",
    ])?;

    for tf in &report.timeframes_analyzed {
        for r in &tf.indicators {
            wtr.write_record([
                tf.timeframe.as_str(),
                r.indicator_name(),
                &format!("{:.2}", round_to(r.score, 2)),
                r.confidence_level().as_str(),
                &format!("{:.2}", round_to(r.win_rate, 2)),
                &r.total_trades.to_string(),
                &format!("{:.2}", round_to(r.profit_factor, 2)),
                &format!("{:.2}", round_to(r.max_drawdown, 2)),
                &format!("{:.2}", round_to(tf.total_score, 2)),
                &format!("{:.2}", round_to(tf.respect_rate, 2)),
            ])?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TradeMetrics;
    use crate::scoring::ScoreWeights;
    use smclab_core::domain::{ExitReason, Side};
    use smclab_core::engine::{StrategyKind, StrategyParams};

    fn sample_trade() -> Trade {
        Trade {
            entry_time: 0,
            entry_price: 100.0,
            entry_index: 3,
            signal_type: Side::Sell,
            stop_loss: 101.0,
            take_profit: 98.0,
            exit_time: Some(3_600_000),
            exit_price: Some(98.0),
            exit_index: Some(5),
            exit_reason: Some(ExitReason::TakeProfit),
            profit_loss: Some(2.0),
            profit_loss_percent: Some(2.0),
            reason: "Take Profit".into(),
            entry_reason: "Bearish FVG fill".into(),
            metadata: BTreeMap::new(),
        }
    }

    fn sample_result() -> BacktestResult {
        let trades = vec![sample_trade()];
        let params = StrategyParams::default();
        BacktestResult {
            symbol: "ETH-USDT".into(),
            interval: "1h".into(),
            strategy: StrategyKind::FairValueGap,
            strategy_name: "FVG Fill".into(),
            start_time: 0,
            end_time: 7_200_000,
            metrics: TradeMetrics::compute(&trades),
            trades,
            params_fingerprint: params.fingerprint(),
            parameters: params,
            dataset_hash: "abc".into(),
        }
    }

    #[test]
    fn rounding_and_non_finite() {
        assert_eq!(round_to(66.666_666, 2), 66.67);
        assert_eq!(round_to(1.234_56, 4), 1.2346);
        assert_eq!(round_to(f64::INFINITY, 2), 0.0);
        assert_eq!(round_to(f64::NAN, 2), 0.0);
    }

    #[test]
    fn flat_backtest_result() {
        let map = sample_result().to_flat_map();
        assert_eq!(map["symbol"], "ETH-USDT");
        assert_eq!(map["strategy"], "fair_value_gap");
        assert_eq!(map["total_trades"], 1);
        assert_eq!(map["win_rate"], 100.0);
        // no losses: infinite profit factor flattens to zero
        assert_eq!(map["profit_factor"], 0.0);
    }

    #[test]
    fn flat_ranking_carries_confidence() {
        let metrics = TradeMetrics {
            total_trades: 10,
            win_rate: 100.0,
            profit_factor: 4.0,
            ..TradeMetrics::default()
        };
        let r = IndicatorRanking::new(StrategyKind::Cisd, "4h", &metrics, &ScoreWeights::default());
        let map = r.to_flat_map();
        assert_eq!(map["indicator_name"], "CISD");
        assert_eq!(map["score"], 100.0);
        assert_eq!(map["confidence_level"], "Very High");
    }

    #[test]
    fn trades_csv_has_header_and_rows() {
        let csv = export_trades_csv(&[sample_trade()]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("side,entry_index,entry_time"));
        assert!(lines[1].starts_with("SELL,3,1970-01-01T00:00:00+00:00,100.000000"));
        assert!(lines[1].contains("Take Profit"));
        assert!(lines[1].ends_with(",3,Bearish FVG fill"));
    }

    #[test]
    fn empty_trades_csv_is_header_only() {
        let csv = export_trades_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn json_export_is_pretty() {
        let json = export_json(&sample_result()).unwrap();
        assert!(json.contains("\n  \"symbol\": \"ETH-USDT\""));
    }
}
