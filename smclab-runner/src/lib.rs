//! SMC Lab Runner: metrics, scoring, multi-timeframe ranking, market scan.
//!
//! This crate builds on `smclab-core` to provide:
//! - Backtest results with trade metrics and run fingerprints
//! - Indicator reliability scoring with configurable weights
//! - Multi-timeframe ranking of strategies and timeframes
//! - Multi-asset market scanning
//! - TOML configuration, candle loaders, CSV/JSON export, logging setup

pub mod config;
pub mod data_loader;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod multi_timeframe;
pub mod runner;
pub mod scanner;
pub mod scoring;

pub use config::{AnalysisConfig, ConfigError, RankingConfig, ScannerConfig};
pub use data_loader::{candles_from_csv, candles_from_json, load_candles, LoadError};
pub use export::{export_json, export_rankings_csv, export_trades_csv, FlatExport};
pub use logging::init_logging;
pub use metrics::TradeMetrics;
pub use multi_timeframe::{
    analyze_all_timeframes, analyze_timeframe, MultiTimeframeReport, ReportSummary,
    SkippedTimeframe, TimeframeAnalysis, TimeframeGrade, TimeframeSeries,
};
pub use runner::{run_backtest, BacktestResult};
pub use scanner::{scan_assets, AssetScore, AssetSeries, MarketTrend, Recommendation};
pub use scoring::{ConfidenceLevel, IndicatorRanking, ScoreWeights};
