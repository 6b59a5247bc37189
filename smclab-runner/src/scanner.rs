//! Multi-asset market scanner: ranks assets by how well they currently
//! respect smart-money patterns, with trend and momentum bonuses.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use smclab_core::domain::InsufficientData;
use smclab_core::engine::StrategyKind;
use smclab_core::indicators::{Ema, Indicator, Rsi};

use crate::config::{RankingConfig, ScannerConfig};
use crate::multi_timeframe::{analyze_timeframe, TimeframeSeries};

/// Trend bonus for a confirmed bullish or bearish trend.
const TREND_BONUS: f64 = 10.0;
/// RSI bonus when momentum is stretched against the trend.
const PULLBACK_RSI_BONUS: f64 = 20.0;
/// RSI bonus for any overbought or oversold reading.
const EXTREME_RSI_BONUS: f64 = 10.0;

/// All timeframes fetched for one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSeries {
    pub symbol: String,
    pub timeframes: Vec<TimeframeSeries>,
}

/// Price position relative to the fast and slow EMA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketTrend {
    /// Above the slow EMA with the fast EMA above it.
    Bullish,
    /// Below the slow EMA with the fast EMA below it.
    Bearish,
    /// Above the slow EMA while the fast EMA still lags below.
    Recovering,
    /// Below the slow EMA while the fast EMA is still above.
    Pullback,
}

impl MarketTrend {
    pub fn classify(price: f64, ema_fast: f64, ema_slow: f64) -> Self {
        if price > ema_slow {
            if ema_fast > ema_slow {
                MarketTrend::Bullish
            } else {
                MarketTrend::Recovering
            }
        } else if ema_fast < ema_slow {
            MarketTrend::Bearish
        } else {
            MarketTrend::Pullback
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarketTrend::Bullish => "bullish",
            MarketTrend::Bearish => "bearish",
            MarketTrend::Recovering => "recovering",
            MarketTrend::Pullback => "pullback",
        }
    }
}

impl fmt::Display for MarketTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongOpportunity,
    Opportunity,
    Neutral,
    Avoid,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::StrongOpportunity => "Strong Opportunity",
            Recommendation::Opportunity => "Opportunity",
            Recommendation::Neutral => "Neutral",
            Recommendation::Avoid => "Avoid",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An asset's best-scoring timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetScore {
    pub symbol: String,
    /// Close of the last candle.
    pub price: f64,
    /// 0..=100.
    pub smc_score: f64,
    /// `None` when no strategy produced a ranking.
    pub best_strategy: Option<StrategyKind>,
    pub best_timeframe: String,
    pub win_rate: f64,
    pub trend: MarketTrend,
    pub rsi: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
}

impl AssetScore {
    pub fn recommendation(&self) -> Recommendation {
        if self.smc_score >= 70.0 {
            Recommendation::StrongOpportunity
        } else if self.smc_score >= 50.0 {
            Recommendation::Opportunity
        } else if self.smc_score >= 30.0 {
            Recommendation::Neutral
        } else {
            Recommendation::Avoid
        }
    }

    pub fn best_strategy_name(&self) -> &'static str {
        self.best_strategy.map(StrategyKind::display_name).unwrap_or("Trend/RSI")
    }

    /// e.g. `BULLISH (RSI: 35)`.
    pub fn trend_label(&self) -> String {
        format!("{} (RSI: {})", self.trend.as_str().to_uppercase(), self.rsi.trunc())
    }
}

/// Bonus points for trend alignment and stretched momentum.
pub fn momentum_bonus(trend: MarketTrend, rsi: f64) -> f64 {
    let trend_bonus = match trend {
        MarketTrend::Bullish | MarketTrend::Bearish => TREND_BONUS,
        MarketTrend::Recovering | MarketTrend::Pullback => 0.0,
    };
    let rsi_bonus = match trend {
        MarketTrend::Bullish if rsi < 40.0 => PULLBACK_RSI_BONUS,
        MarketTrend::Bearish if rsi > 60.0 => PULLBACK_RSI_BONUS,
        _ if !(30.0..=70.0).contains(&rsi) => EXTREME_RSI_BONUS,
        _ => 0.0,
    };
    trend_bonus + rsi_bonus
}

/// Scores one asset on one timeframe.
pub fn score_timeframe(
    symbol: &str,
    series: &TimeframeSeries,
    scanner: &ScannerConfig,
    ranking: &RankingConfig,
) -> Result<AssetScore, InsufficientData> {
    InsufficientData::check(scanner.min_candles, series.candles.len())?;
    let candles = &series.candles;
    let price = candles.last().map(|c| c.close).unwrap_or(0.0);

    let analysis = analyze_timeframe(symbol, &series.interval, candles, ranking);

    let ema_fast = Ema::new(scanner.ema_fast).last_value(candles).unwrap_or(0.0);
    let ema_slow = Ema::new(scanner.ema_slow).last_value(candles).unwrap_or(0.0);
    let rsi = Rsi::new(scanner.rsi_period).last_value(candles).unwrap_or(50.0);
    let trend = MarketTrend::classify(price, ema_fast, ema_slow);

    let smc_score = (analysis.total_score + momentum_bonus(trend, rsi)).min(100.0);
    let best = analysis.best_indicator.as_ref();

    Ok(AssetScore {
        symbol: symbol.to_string(),
        price,
        smc_score,
        best_strategy: best.map(|r| r.indicator),
        best_timeframe: series.interval.clone(),
        win_rate: best.map(|r| r.win_rate).unwrap_or(0.0),
        trend,
        rsi,
        ema_fast,
        ema_slow,
    })
}

/// Best timeframe of one asset; ties keep the earlier timeframe.
pub fn score_asset(asset: &AssetSeries, scanner: &ScannerConfig, ranking: &RankingConfig) -> Option<AssetScore> {
    let mut best: Option<AssetScore> = None;
    for tf in &asset.timeframes {
        match score_timeframe(&asset.symbol, tf, scanner, ranking) {
            Ok(score) => {
                if best.as_ref().map_or(true, |b| score.smc_score > b.smc_score) {
                    best = Some(score);
                }
            }
            Err(insufficient) => {
                debug!(symbol = %asset.symbol, interval = %tf.interval, %insufficient, "timeframe not scored");
            }
        }
    }
    best
}

/// Scores every asset in parallel and ranks them by `smc_score`, highest
/// first. Assets with no scorable timeframe are dropped.
pub fn scan_assets(assets: &[AssetSeries], scanner: &ScannerConfig, ranking: &RankingConfig) -> Vec<AssetScore> {
    let mut scores: Vec<AssetScore> = assets
        .par_iter()
        .filter_map(|asset| {
            let score = score_asset(asset, scanner, ranking);
            if score.is_none() {
                warn!(symbol = %asset.symbol, "asset could not be scored on any timeframe");
            }
            score
        })
        .collect();

    scores.sort_by(|a, b| b.smc_score.partial_cmp(&a.smc_score).unwrap_or(std::cmp::Ordering::Equal));

    info!(assets = assets.len(), scored = scores.len(), "market scan complete");
    scores
}
