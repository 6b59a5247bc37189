//! SMC Lab Core: pattern detection and strategy backtests over OHLCV candles.
//!
//! This crate contains the deterministic heart of the analysis:
//! - Candle model and normalisation of raw exchange records
//! - Detectors for swings, order blocks, fair value gaps, structure breaks and CISD zones
//! - Fibonacci retracement / extension levels and confluence clustering
//! - A single-position trade lifecycle shared by four strategy backtests
//! - A moving-average price projection
//!
//! Nothing here performs I/O, reads the clock or draws random numbers.

pub mod detect;
pub mod domain;
pub mod engine;
pub mod fibonacci;
pub mod fingerprint;
pub mod forecast;
pub mod indicators;
