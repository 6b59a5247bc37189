//! Pattern records produced by the detectors.
//!
//! Every record refers back to the analysed series through plain indices
//! (`candle_index`, `index_start`, ...). The candle slice stays owned by the
//! caller; patterns never embed copies of candles.

use serde::{Deserialize, Serialize};

use super::trade::Side;

/// Directional bias of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    Bullish,
    Bearish,
}

impl Bias {
    /// The trade side that follows this bias.
    pub fn side(self) -> Side {
        match self {
            Bias::Bullish => Side::Buy,
            Bias::Bearish => Side::Sell,
        }
    }
}

impl std::fmt::Display for Bias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bias::Bullish => write!(f, "bullish"),
            Bias::Bearish => write!(f, "bearish"),
        }
    }
}

/// Market structure trend read from the latest swings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

/// Local extremum over a symmetric window. Identity is `(index, is_high)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub time: i64,
    pub price: f64,
    pub index: usize,
    pub is_high: bool,
}

/// Supply/demand candle preceding a strong move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBlock {
    #[serde(rename = "type")]
    pub bias: Bias,
    pub time: i64,
    pub top: f64,
    pub bottom: f64,
    pub candle_index: usize,
    /// Move size in ATR units, clamped to `[0, 1]`.
    pub strength: f64,
    /// Reserved for external consumers; never set by the detectors.
    pub tested: bool,
    /// Reserved for external consumers; never set by the detectors.
    pub broken: bool,
}

impl OrderBlock {
    pub fn midpoint(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

/// Three-candle imbalance spanning `index_start..=index_end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairValueGap {
    #[serde(rename = "type")]
    pub bias: Bias,
    pub time_start: i64,
    pub time_end: i64,
    pub top: f64,
    pub bottom: f64,
    pub index_start: usize,
    pub index_end: usize,
    pub filled: bool,
    pub fill_percentage: f64,
}

impl FairValueGap {
    pub fn size(&self) -> f64 {
        self.top - self.bottom
    }
}

/// Break of structure (trend-aligned) or change of character (counter-trend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakKind {
    #[serde(rename = "BOS")]
    Bos,
    #[serde(rename = "CHoCH")]
    Choch,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureBreak {
    #[serde(rename = "type")]
    pub kind: BreakKind,
    pub direction: Bias,
    pub time: i64,
    /// Close of the breaking candle.
    pub price: f64,
    pub index: usize,
    pub broken_level: f64,
}

/// Liquidity sweep followed by a close back across the swept swing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CisdZone {
    #[serde(rename = "type")]
    pub bias: Bias,
    pub time: i64,
    pub top: f64,
    pub bottom: f64,
    pub candle_index: usize,
    pub liquidity_swept_level: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_serialize_as_closed_variants() {
        assert_eq!(serde_json::to_string(&Bias::Bullish).unwrap(), "\"bullish\"");
        assert_eq!(serde_json::to_string(&BreakKind::Choch).unwrap(), "\"CHoCH\"");
        assert_eq!(serde_json::to_string(&Trend::Neutral).unwrap(), "\"neutral\"");
    }

    #[test]
    fn order_block_type_field_is_renamed() {
        let ob = OrderBlock {
            bias: Bias::Bearish,
            time: 1,
            top: 10.0,
            bottom: 8.0,
            candle_index: 3,
            strength: 0.5,
            tested: false,
            broken: false,
        };
        let v = serde_json::to_value(ob).unwrap();
        assert_eq!(v["type"], "bearish");
        assert_eq!(ob.midpoint(), 9.0);
    }

    #[test]
    fn bias_maps_to_trade_side() {
        assert_eq!(Bias::Bullish.side(), Side::Buy);
        assert_eq!(Bias::Bearish.side(), Side::Sell);
    }
}
