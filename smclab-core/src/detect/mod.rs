//! Smart-money pattern detectors.
//!
//! Each detector is a pure function over a candle slice. `SmcAnalyzer` runs
//! them all and bundles the output.

pub mod cisd;
pub mod fvg;
pub mod order_block;
pub mod structure;
pub mod swing;

pub use cisd::find_cisd_zones;
pub use fvg::find_fair_value_gaps;
pub use order_block::find_order_blocks;
pub use structure::{detect_trend, find_structure_breaks};
pub use swing::{find_swing_points, merge_swings};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::insufficient::MIN_ANALYSIS_CANDLES;
use crate::domain::{
    Candle, CisdZone, FairValueGap, InsufficientData, OrderBlock, StructureBreak, SwingPoint,
    Trend,
};

/// Tunables shared by all detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Candles on each side of a swing point.
    pub swing_length: usize,
    /// Minimum order block move, in rolling-ATR units.
    pub min_strength: f64,
    /// Minimum fair value gap, as a fraction of the static ATR.
    pub min_gap_atr_ratio: f64,
    pub atr_period: usize,
    /// Order blocks kept after ranking by strength and recency.
    pub max_order_blocks: usize,
    /// Candles scanned after a swing for a sweep-and-reverse.
    pub cisd_scan_window: usize,
    /// Candles after formation during which a CISD zone may be retested.
    pub cisd_retest_window: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            swing_length: 5,
            min_strength: 0.3,
            min_gap_atr_ratio: 0.1,
            atr_period: 14,
            max_order_blocks: 20,
            cisd_scan_window: 20,
            cisd_retest_window: 50,
        }
    }
}

/// Every pattern found in one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmcPatterns {
    pub trend: Trend,
    pub swing_highs: Vec<SwingPoint>,
    pub swing_lows: Vec<SwingPoint>,
    pub order_blocks: Vec<OrderBlock>,
    pub fair_value_gaps: Vec<FairValueGap>,
    pub structure_breaks: Vec<StructureBreak>,
    pub cisd_zones: Vec<CisdZone>,
    pub total_candles_analyzed: usize,
}

/// Outcome of a full analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SmcAnalysis {
    Complete(SmcPatterns),
    InsufficientData(InsufficientData),
}

impl SmcAnalysis {
    pub fn patterns(&self) -> Option<&SmcPatterns> {
        match self {
            SmcAnalysis::Complete(p) => Some(p),
            SmcAnalysis::InsufficientData(_) => None,
        }
    }

    pub fn into_patterns(self) -> Option<SmcPatterns> {
        match self {
            SmcAnalysis::Complete(p) => Some(p),
            SmcAnalysis::InsufficientData(_) => None,
        }
    }
}

/// Runs every detector with one configuration.
#[derive(Debug, Clone, Default)]
pub struct SmcAnalyzer {
    config: DetectorConfig,
}

impl SmcAnalyzer {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Full pattern analysis; needs at least 20 candles.
    pub fn analyze(&self, candles: &[Candle]) -> SmcAnalysis {
        if let Err(insufficient) = InsufficientData::check(MIN_ANALYSIS_CANDLES, candles.len()) {
            debug!(
                required = insufficient.required,
                provided = insufficient.provided,
                "skipping pattern analysis"
            );
            return SmcAnalysis::InsufficientData(insufficient);
        }

        let (swing_highs, swing_lows) = find_swing_points(candles, self.config.swing_length);
        let trend = detect_trend(&swing_highs, &swing_lows);
        let order_blocks = find_order_blocks(candles, &self.config);
        let fair_value_gaps = find_fair_value_gaps(candles, &self.config);
        let structure_breaks = find_structure_breaks(candles, &swing_highs, &swing_lows);
        let cisd_zones = find_cisd_zones(candles, &swing_highs, &swing_lows, &self.config);

        debug!(
            candles = candles.len(),
            ?trend,
            swing_highs = swing_highs.len(),
            swing_lows = swing_lows.len(),
            order_blocks = order_blocks.len(),
            fair_value_gaps = fair_value_gaps.len(),
            structure_breaks = structure_breaks.len(),
            cisd_zones = cisd_zones.len(),
            "pattern analysis complete"
        );

        SmcAnalysis::Complete(SmcPatterns {
            trend,
            swing_highs,
            swing_lows,
            order_blocks,
            fair_value_gaps,
            structure_breaks,
            cisd_zones,
            total_candles_analyzed: candles.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    #[test]
    fn short_series_reports_insufficient_data() {
        let candles = make_candles(&[100.0; 19]);
        match SmcAnalyzer::default().analyze(&candles) {
            SmcAnalysis::InsufficientData(i) => {
                assert_eq!(i.required, 20);
                assert_eq!(i.provided, 19);
            }
            other => panic!("expected insufficient data, got {other:?}"),
        }
    }

    #[test]
    fn analysis_counts_candles() {
        let candles: Vec<Candle> = (0..60)
            .map(|i| {
                let p = 100.0 + (i as f64 * 0.4).sin() * 5.0;
                Candle::new(i as i64, p, p + 1.0, p - 1.0, p, 1.0)
            })
            .collect();
        let analysis = SmcAnalyzer::default().analyze(&candles);
        let patterns = analysis.patterns().unwrap();
        assert_eq!(patterns.total_candles_analyzed, 60);
        assert!(!patterns.swing_highs.is_empty());
        assert!(!patterns.swing_lows.is_empty());
    }

    #[test]
    fn analysis_is_deterministic() {
        let closes: Vec<f64> = (0..120).map(|i| 50.0 + (i as f64 * 0.3).cos() * 4.0 + i as f64 * 0.05).collect();
        let candles = make_candles(&closes);
        let analyzer = SmcAnalyzer::default();
        assert_eq!(analyzer.analyze(&candles), analyzer.analyze(&candles));
    }

    #[test]
    fn detector_config_defaults_from_partial_json() {
        let cfg: DetectorConfig = serde_json::from_str(r#"{"swing_length": 3}"#).unwrap();
        assert_eq!(cfg.swing_length, 3);
        assert_eq!(cfg.atr_period, 14);
        assert_eq!(cfg.max_order_blocks, 20);
    }
}
