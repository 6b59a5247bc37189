//! Serializable analysis configuration, loaded from TOML.
//!
//! ```toml
//! [params]
//! risk_reward_ratio = 2.5
//! entry_method = "50%"
//!
//! [params.detector]
//! swing_length = 3
//!
//! [ranking]
//! min_candles_per_timeframe = 500
//! strategies = ["order_block", "cisd"]
//!
//! [weights]
//! win_rate = 40.0
//!
//! [scanner]
//! ema_slow = 100
//! ```
//!
//! Every table and field is optional and falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use smclab_core::engine::{ParamError, StrategyKind, StrategyParams};

use crate::scoring::ScoreWeights;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid strategy parameters: {0}")]
    Params(#[from] ParamError),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Everything the multi-timeframe aggregator needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub weights: ScoreWeights,
    pub params: StrategyParams,
    /// Timeframes with fewer candles are skipped.
    pub min_candles_per_timeframe: usize,
    /// Strategies backtested on every timeframe, in this order.
    pub strategies: Vec<StrategyKind>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            params: StrategyParams::default(),
            min_candles_per_timeframe: 500,
            strategies: StrategyKind::ALL.to_vec(),
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        self.weights.validate()?;
        if self.min_candles_per_timeframe == 0 {
            return Err(ConfigError::invalid("ranking.min_candles_per_timeframe", "must be >= 1"));
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::invalid("ranking.strategies", "at least one strategy is required"));
        }
        Ok(())
    }
}

/// Trend and momentum settings of the market scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Timeframes with fewer candles are not scored.
    pub min_candles: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_candles: 50,
            ema_fast: 50,
            ema_slow: 200,
            rsi_period: 14,
        }
    }
}

impl ScannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_candles == 0 {
            return Err(ConfigError::invalid("scanner.min_candles", "must be >= 1"));
        }
        if self.ema_fast == 0 || self.ema_slow == 0 {
            return Err(ConfigError::invalid("scanner.ema_fast/ema_slow", "periods must be >= 1"));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(ConfigError::invalid(
                "scanner.ema_fast",
                format!("fast period {} must be below slow period {}", self.ema_fast, self.ema_slow),
            ));
        }
        if self.rsi_period == 0 {
            return Err(ConfigError::invalid("scanner.rsi_period", "must be >= 1"));
        }
        Ok(())
    }
}

/// `[ranking]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSection {
    pub min_candles_per_timeframe: usize,
    pub strategies: Vec<StrategyKind>,
}

impl Default for RankingSection {
    fn default() -> Self {
        let ranking = RankingConfig::default();
        Self {
            min_candles_per_timeframe: ranking.min_candles_per_timeframe,
            strategies: ranking.strategies,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub params: StrategyParams,
    pub ranking: RankingSection,
    pub weights: ScoreWeights,
    pub scanner: ScannerConfig,
}

impl AnalysisConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ranking_config().validate()?;
        self.scanner.validate()
    }

    pub fn ranking_config(&self) -> RankingConfig {
        RankingConfig {
            weights: self.weights.clone(),
            params: self.params.clone(),
            min_candles_per_timeframe: self.ranking.min_candles_per_timeframe,
            strategies: self.ranking.strategies.clone(),
        }
    }
}
