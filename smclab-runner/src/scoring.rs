//! Indicator reliability score and per-indicator rankings.

use serde::{Deserialize, Serialize};
use smclab_core::engine::StrategyKind;
use std::fmt;

use crate::config::ConfigError;
use crate::metrics::TradeMetrics;

/// Weights and normalisation targets of the 0..=100 indicator score.
///
/// `score = w_wr·wr/100 + w_pf·min(pf/pf_target, 1) + w_n·min(n/n_target, 1)
///          + w_dd·max(0, 1 - dd/dd_ceiling)`, capped at `max_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub win_rate: f64,
    pub profit_factor: f64,
    pub trade_count: f64,
    pub drawdown: f64,
    /// Profit factor earning the full profit-factor weight.
    pub profit_factor_target: f64,
    /// Trade count earning the full trade-count weight.
    pub trade_count_target: f64,
    /// Drawdown percent at which the drawdown weight reaches zero.
    pub drawdown_ceiling: f64,
    pub max_score: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            win_rate: 40.0,
            profit_factor: 30.0,
            trade_count: 15.0,
            drawdown: 15.0,
            profit_factor_target: 2.0,
            trade_count_target: 10.0,
            drawdown_ceiling: 50.0,
            max_score: 100.0,
        }
    }
}

impl ScoreWeights {
    /// Reliability score for one backtest. Zero trades score zero.
    pub fn score(&self, metrics: &TradeMetrics) -> f64 {
        if metrics.total_trades == 0 {
            return 0.0;
        }

        let win_rate = metrics.win_rate / 100.0 * self.win_rate;
        let profit_factor = if metrics.profit_factor > 0.0 {
            (metrics.profit_factor / self.profit_factor_target).min(1.0) * self.profit_factor
        } else {
            0.0
        };
        let trade_count =
            (metrics.total_trades as f64 / self.trade_count_target).min(1.0) * self.trade_count;
        let drawdown = (1.0 - metrics.max_drawdown / self.drawdown_ceiling).max(0.0) * self.drawdown;

        (win_rate + profit_factor + trade_count + drawdown).min(self.max_score)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("weights.win_rate", self.win_rate),
            ("weights.profit_factor", self.profit_factor),
            ("weights.trade_count", self.trade_count),
            ("weights.drawdown", self.drawdown),
        ];
        for (field, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(field, format!("must be a finite non-negative number, got {value}")));
            }
        }
        let targets = [
            ("weights.profit_factor_target", self.profit_factor_target),
            ("weights.trade_count_target", self.trade_count_target),
            ("weights.drawdown_ceiling", self.drawdown_ceiling),
            ("weights.max_score", self.max_score),
        ];
        for (field, value) in targets {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid(field, format!("must be positive, got {value}")));
            }
        }
        Ok(())
    }
}

/// Confidence band of an indicator score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ConfidenceLevel::VeryHigh
        } else if score >= 60.0 {
            ConfidenceLevel::High
        } else if score >= 40.0 {
            ConfidenceLevel::Medium
        } else if score >= 20.0 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::VeryHigh => "Very High",
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::VeryLow => "Very Low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One strategy's showing on one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRanking {
    pub indicator: StrategyKind,
    pub timeframe: String,
    pub win_rate: f64,
    pub total_trades: usize,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub max_drawdown: f64,
    pub score: f64,
}

impl IndicatorRanking {
    pub fn new(indicator: StrategyKind, timeframe: &str, metrics: &TradeMetrics, weights: &ScoreWeights) -> Self {
        Self {
            indicator,
            timeframe: timeframe.to_string(),
            win_rate: metrics.win_rate,
            total_trades: metrics.total_trades,
            profit_factor: metrics.profit_factor,
            avg_win: metrics.avg_win,
            avg_loss: metrics.avg_loss,
            max_drawdown: metrics.max_drawdown,
            score: weights.score(metrics),
        }
    }

    pub fn indicator_name(&self) -> &'static str {
        self.indicator.display_name()
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.score)
    }
}

/// Sorts rankings by score, highest first. Ties keep their input order.
pub fn sort_by_score(rankings: &mut [IndicatorRanking]) {
    rankings.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(trades: usize, win_rate: f64, pf: f64, dd: f64) -> TradeMetrics {
        TradeMetrics {
            total_trades: trades,
            win_rate,
            profit_factor: pf,
            max_drawdown: dd,
            ..TradeMetrics::default()
        }
    }

    #[test]
    fn zero_trades_score_zero() {
        let w = ScoreWeights::default();
        assert_eq!(w.score(&metrics(0, 100.0, 5.0, 0.0)), 0.0);
    }

    #[test]
    fn perfect_run_scores_max() {
        let w = ScoreWeights::default();
        assert_eq!(w.score(&metrics(12, 100.0, f64::INFINITY, 0.0)), 100.0);
    }

    #[test]
    fn components_are_weighted() {
        let w = ScoreWeights::default();
        // 40·0.5 + 30·0.5 + 15·0.5 + 15·0.5
        let s = w.score(&metrics(5, 50.0, 1.0, 25.0));
        assert!((s - 50.0).abs() < 1e-9);
    }

    #[test]
    fn drawdown_beyond_ceiling_contributes_nothing() {
        let w = ScoreWeights::default();
        let s = w.score(&metrics(10, 0.0, 0.0, 80.0));
        assert!((s - 15.0).abs() < 1e-9);
    }

    #[test]
    fn custom_weights_change_the_score() {
        let w = ScoreWeights {
            win_rate: 100.0,
            profit_factor: 0.0,
            trade_count: 0.0,
            drawdown: 0.0,
            ..ScoreWeights::default()
        };
        assert!((w.score(&metrics(3, 70.0, 3.0, 10.0)) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(ConfidenceLevel::from_score(80.0), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_score(79.9), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(40.0), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(20.0), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.0), ConfidenceLevel::VeryLow);
        assert_eq!(ConfidenceLevel::VeryHigh.to_string(), "Very High");
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let w = ScoreWeights {
            drawdown_ceiling: 0.0,
            ..ScoreWeights::default()
        };
        assert!(w.validate().is_err());
        let w = ScoreWeights {
            win_rate: -1.0,
            ..ScoreWeights::default()
        };
        assert!(w.validate().is_err());
        assert!(ScoreWeights::default().validate().is_ok());
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let w = ScoreWeights::default();
        let m = metrics(0, 0.0, 0.0, 0.0);
        let mut r = vec![
            IndicatorRanking::new(StrategyKind::Cisd, "1h", &m, &w),
            IndicatorRanking::new(StrategyKind::OrderBlock, "1h", &m, &w),
        ];
        r.push(IndicatorRanking::new(StrategyKind::Fibonacci, "1h", &metrics(10, 50.0, 1.0, 0.0), &w));
        sort_by_score(&mut r);
        assert_eq!(r[0].indicator, StrategyKind::Fibonacci);
        assert_eq!(r[1].indicator, StrategyKind::Cisd);
        assert_eq!(r[2].indicator, StrategyKind::OrderBlock);
    }
}
