//! Multi-timeframe ranking: which timeframes a market respects and which
//! strategies are most reliable on them.
//!
//! Each timeframe is independent; they run on the rayon pool and are
//! collected in input order so the report is deterministic.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, warn};

use smclab_core::domain::{Candle, InsufficientData};
use smclab_core::engine::StrategyKind;

use crate::config::RankingConfig;
use crate::runner::run_backtest;
use crate::scoring::{sort_by_score, IndicatorRanking};

/// One timeframe's candles, labelled by an opaque interval string.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeframeSeries {
    pub interval: String,
    pub candles: Vec<Candle>,
}

impl TimeframeSeries {
    pub fn new(interval: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            interval: interval.into(),
            candles,
        }
    }
}

/// Quality band of a timeframe's respect rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeframeGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl TimeframeGrade {
    pub fn from_respect_rate(respect_rate: f64) -> Self {
        if respect_rate >= 70.0 {
            TimeframeGrade::Excellent
        } else if respect_rate >= 50.0 {
            TimeframeGrade::Good
        } else if respect_rate >= 30.0 {
            TimeframeGrade::Fair
        } else {
            TimeframeGrade::Poor
        }
    }
}

impl fmt::Display for TimeframeGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeframeGrade::Excellent => "excellent",
            TimeframeGrade::Good => "good",
            TimeframeGrade::Fair => "fair",
            TimeframeGrade::Poor => "poor",
        };
        f.write_str(s)
    }
}

/// Every strategy's ranking on one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeAnalysis {
    pub timeframe: String,
    /// Mean indicator score.
    pub total_score: f64,
    /// Score-weighted mean win rate.
    pub respect_rate: f64,
    /// Sorted by score, highest first.
    pub indicators: Vec<IndicatorRanking>,
    pub best_indicator: Option<IndicatorRanking>,
}

impl TimeframeAnalysis {
    pub fn grade(&self) -> TimeframeGrade {
        TimeframeGrade::from_respect_rate(self.respect_rate)
    }

    pub fn recommendation(&self) -> String {
        let rate = self.respect_rate;
        match self.grade() {
            TimeframeGrade::Excellent => format!("Excellent timeframe for trading: high respect rate ({rate:.1}%)"),
            TimeframeGrade::Good => format!("Good timeframe for trading: moderate respect rate ({rate:.1}%)"),
            TimeframeGrade::Fair => format!("Fair timeframe: low respect rate ({rate:.1}%)"),
            TimeframeGrade::Poor => format!("Not recommended: poor respect rate ({rate:.1}%)"),
        }
    }
}

/// Backtests every configured strategy on one timeframe.
///
/// A failing strategy is logged and left out; the rest still rank.
pub fn analyze_timeframe(
    symbol: &str,
    interval: &str,
    candles: &[Candle],
    config: &RankingConfig,
) -> TimeframeAnalysis {
    let mut indicators = Vec::with_capacity(config.strategies.len());

    for &kind in &config.strategies {
        match run_backtest(kind, symbol, interval, candles, &config.params) {
            Ok(result) => {
                let ranking = IndicatorRanking::new(kind, interval, &result.metrics, &config.weights);
                info!(
                    symbol,
                    interval,
                    strategy = %kind,
                    win_rate = ranking.win_rate,
                    score = ranking.score,
                    "indicator ranked"
                );
                indicators.push(ranking);
            }
            Err(e) => {
                error!(symbol, interval, strategy = %kind, error = %e, "strategy backtest failed");
            }
        }
    }

    sort_by_score(&mut indicators);

    let total_score = if indicators.is_empty() {
        0.0
    } else {
        indicators.iter().map(|r| r.score).sum::<f64>() / indicators.len() as f64
    };

    let score_sum: f64 = indicators.iter().map(|r| r.score).sum();
    let respect_rate = if score_sum > 0.0 {
        indicators.iter().map(|r| r.win_rate * r.score).sum::<f64>() / score_sum
    } else {
        0.0
    };

    TimeframeAnalysis {
        timeframe: interval.to_string(),
        total_score,
        respect_rate,
        best_indicator: indicators.first().cloned(),
        indicators,
    }
}

/// A timeframe left out of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTimeframe {
    pub interval: String,
    pub insufficient: InsufficientData,
}

/// Timeframe labels grouped by grade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeframesByQuality {
    pub excellent: Vec<String>,
    pub good: Vec<String>,
    pub fair: Vec<String>,
    pub poor: Vec<String>,
}

/// How one strategy did across every timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub indicator: StrategyKind,
    pub avg_score: f64,
    pub best_timeframe: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_timeframes_analyzed: usize,
    pub total_indicators_tested: usize,
    pub avg_respect_rate: f64,
    pub timeframes_by_quality: TimeframesByQuality,
    /// Up to three distinct strategies, best first.
    pub most_reliable_indicators: Vec<IndicatorSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiTimeframeReport {
    pub symbol: String,
    /// Sorted by `total_score`, highest first.
    pub timeframes_analyzed: Vec<TimeframeAnalysis>,
    pub best_timeframe: Option<TimeframeAnalysis>,
    pub best_overall_indicator: Option<IndicatorRanking>,
    pub skipped: Vec<SkippedTimeframe>,
    pub summary: ReportSummary,
}

impl MultiTimeframeReport {
    /// Plain-language trading advice derived from the rankings.
    pub fn recommendations(&self) -> Vec<String> {
        let mut out = Vec::new();

        if let Some(best) = &self.best_timeframe {
            out.push(format!(
                "Trade primarily on the {} timeframe (respect rate {:.1}%)",
                best.timeframe, best.respect_rate
            ));
        }
        if let Some(best) = &self.best_overall_indicator {
            out.push(format!(
                "Use {} as the main indicator on {} (win rate {:.1}%)",
                best.indicator_name(),
                best.timeframe,
                best.win_rate
            ));
        }

        let reliable: Vec<&str> = self
            .timeframes_analyzed
            .iter()
            .filter(|tf| tf.respect_rate >= 50.0)
            .map(|tf| tf.timeframe.as_str())
            .collect();
        if reliable.len() >= 2 {
            out.push(format!(
                "Multiple reliable timeframes: {}. Look for confluence between them",
                reliable.iter().take(3).copied().collect::<Vec<_>>().join(", ")
            ));
        }

        let weak: Vec<&str> = self
            .timeframes_analyzed
            .iter()
            .filter(|tf| tf.respect_rate < 30.0)
            .map(|tf| tf.timeframe.as_str())
            .collect();
        if !weak.is_empty() {
            out.push(format!("Avoid trading on {}: low respect rate", weak.join(", ")));
        }

        out
    }
}

/// Ranks every timeframe with enough candles.
pub fn analyze_all_timeframes(
    symbol: &str,
    series: &[TimeframeSeries],
    config: &RankingConfig,
) -> MultiTimeframeReport {
    let mut eligible = Vec::with_capacity(series.len());
    let mut skipped = Vec::new();

    for tf in series {
        match InsufficientData::check(config.min_candles_per_timeframe, tf.candles.len()) {
            Ok(()) => eligible.push(tf),
            Err(insufficient) => {
                warn!(
                    symbol,
                    interval = %tf.interval,
                    candles = insufficient.provided,
                    required = insufficient.required,
                    "skipping timeframe: insufficient data"
                );
                skipped.push(SkippedTimeframe {
                    interval: tf.interval.clone(),
                    insufficient,
                });
            }
        }
    }

    let mut timeframes: Vec<TimeframeAnalysis> = eligible
        .par_iter()
        .map(|tf| analyze_timeframe(symbol, &tf.interval, &tf.candles, config))
        .collect();

    // Input order, each timeframe already sorted; the stable sort keeps the
    // earliest timeframe on ties.
    let mut all_indicators: Vec<IndicatorRanking> =
        timeframes.iter().flat_map(|tf| tf.indicators.iter().cloned()).collect();
    sort_by_score(&mut all_indicators);

    timeframes.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let summary = summarize(&timeframes, &all_indicators);
    let best_timeframe = timeframes.first().cloned();
    let best_overall_indicator = all_indicators.first().cloned();

    info!(
        symbol,
        timeframes = timeframes.len(),
        skipped = skipped.len(),
        best = best_timeframe.as_ref().map(|tf| tf.timeframe.as_str()).unwrap_or("none"),
        "multi-timeframe analysis complete"
    );

    MultiTimeframeReport {
        symbol: symbol.to_string(),
        timeframes_analyzed: timeframes,
        best_timeframe,
        best_overall_indicator,
        skipped,
        summary,
    }
}

/// `all_indicators` must already be sorted by score.
fn summarize(timeframes: &[TimeframeAnalysis], all_indicators: &[IndicatorRanking]) -> ReportSummary {
    let avg_respect_rate = if timeframes.is_empty() {
        0.0
    } else {
        timeframes.iter().map(|tf| tf.respect_rate).sum::<f64>() / timeframes.len() as f64
    };

    let mut by_quality = TimeframesByQuality::default();
    for tf in timeframes {
        let bucket = match tf.grade() {
            TimeframeGrade::Excellent => &mut by_quality.excellent,
            TimeframeGrade::Good => &mut by_quality.good,
            TimeframeGrade::Fair => &mut by_quality.fair,
            TimeframeGrade::Poor => &mut by_quality.poor,
        };
        bucket.push(tf.timeframe.clone());
    }

    let mut leaders: Vec<StrategyKind> = Vec::with_capacity(3);
    for r in all_indicators {
        if leaders.len() == 3 {
            break;
        }
        if !leaders.contains(&r.indicator) {
            leaders.push(r.indicator);
        }
    }

    let most_reliable_indicators = leaders
        .into_iter()
        .filter_map(|kind| {
            let runs: Vec<&IndicatorRanking> =
                all_indicators.iter().filter(|r| r.indicator == kind).collect();
            // sorted input: the first run is the best one
            let best = runs.first()?;
            Some(IndicatorSummary {
                indicator: kind,
                avg_score: runs.iter().map(|r| r.score).sum::<f64>() / runs.len() as f64,
                best_timeframe: best.timeframe.clone(),
            })
        })
        .collect();

    ReportSummary {
        total_timeframes_analyzed: timeframes.len(),
        total_indicators_tested: all_indicators.len(),
        avg_respect_rate,
        timeframes_by_quality: by_quality,
        most_reliable_indicators,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TradeMetrics;
    use crate::scoring::ScoreWeights;

    fn ranking(kind: StrategyKind, tf: &str, score: f64, win_rate: f64) -> IndicatorRanking {
        let mut r = IndicatorRanking::new(kind, tf, &TradeMetrics::default(), &ScoreWeights::default());
        r.score = score;
        r.win_rate = win_rate;
        r
    }

    fn analysis(tf: &str, respect_rate: f64) -> TimeframeAnalysis {
        TimeframeAnalysis {
            timeframe: tf.to_string(),
            total_score: 0.0,
            respect_rate,
            indicators: vec![],
            best_indicator: None,
        }
    }

    #[test]
    fn grades_follow_respect_rate() {
        assert_eq!(analysis("1h", 70.0).grade(), TimeframeGrade::Excellent);
        assert_eq!(analysis("1h", 69.9).grade(), TimeframeGrade::Good);
        assert_eq!(analysis("1h", 30.0).grade(), TimeframeGrade::Fair);
        assert_eq!(analysis("1h", 29.9).grade(), TimeframeGrade::Poor);
        assert_eq!(
            analysis("4h", 55.0).recommendation(),
            "Good timeframe for trading: moderate respect rate (55.0%)"
        );
    }

    #[test]
    fn short_series_ranks_nothing_but_reports_zeroes() {
        let candles: Vec<Candle> = (0..30)
            .map(|i| Candle::new(i * 60_000, 100.0, 100.5, 99.5, 100.0, 1.0))
            .collect();
        let a = analyze_timeframe("X", "1m", &candles, &RankingConfig::default());
        assert_eq!(a.indicators.len(), 4);
        assert!(a.indicators.iter().all(|r| r.score == 0.0));
        assert_eq!(a.total_score, 0.0);
        assert_eq!(a.respect_rate, 0.0);
        // all tied at zero: input order survives
        assert_eq!(a.best_indicator.map(|r| r.indicator), Some(StrategyKind::OrderBlock));
    }

    #[test]
    fn failing_strategies_are_omitted() {
        let config = RankingConfig {
            params: smclab_core::engine::StrategyParams {
                risk_reward_ratio: 0.0,
                ..Default::default()
            },
            ..RankingConfig::default()
        };
        let a = analyze_timeframe("X", "1m", &[], &config);
        assert!(a.indicators.is_empty());
        assert!(a.best_indicator.is_none());
        assert_eq!(a.total_score, 0.0);
    }

    #[test]
    fn summary_lists_three_distinct_strategies() {
        let tfs = vec![analysis("1h", 75.0), analysis("4h", 40.0), analysis("1d", 10.0)];
        let mut all = vec![
            ranking(StrategyKind::Cisd, "1h", 90.0, 70.0),
            ranking(StrategyKind::Cisd, "4h", 70.0, 60.0),
            ranking(StrategyKind::Fibonacci, "1h", 60.0, 50.0),
            ranking(StrategyKind::OrderBlock, "4h", 50.0, 40.0),
            ranking(StrategyKind::FairValueGap, "1d", 10.0, 20.0),
        ];
        sort_by_score(&mut all);
        let s = summarize(&tfs, &all);
        assert_eq!(s.total_timeframes_analyzed, 3);
        assert_eq!(s.total_indicators_tested, 5);
        assert!((s.avg_respect_rate - 125.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.timeframes_by_quality.excellent, vec!["1h"]);
        assert_eq!(s.timeframes_by_quality.fair, vec!["4h"]);
        assert_eq!(s.timeframes_by_quality.poor, vec!["1d"]);

        let kinds: Vec<StrategyKind> = s.most_reliable_indicators.iter().map(|i| i.indicator).collect();
        assert_eq!(kinds, vec![StrategyKind::Cisd, StrategyKind::Fibonacci, StrategyKind::OrderBlock]);
        assert_eq!(s.most_reliable_indicators[0].avg_score, 80.0);
        assert_eq!(s.most_reliable_indicators[0].best_timeframe, "1h");
    }

    #[test]
    fn recommendations_cover_best_and_weak_timeframes() {
        let best = analysis("1h", 72.0);
        let report = MultiTimeframeReport {
            symbol: "X".into(),
            timeframes_analyzed: vec![best.clone(), analysis("4h", 55.0), analysis("1d", 12.0)],
            best_timeframe: Some(best),
            best_overall_indicator: Some(ranking(StrategyKind::Cisd, "1h", 80.0, 66.0)),
            skipped: vec![],
            summary: ReportSummary::default(),
        };
        let recs = report.recommendations();
        assert_eq!(recs.len(), 4);
        assert!(recs[0].contains("1h"));
        assert!(recs[1].starts_with("Use CISD"));
        assert!(recs[2].contains("1h, 4h"));
        assert!(recs[3].contains("1d"));
    }
}
