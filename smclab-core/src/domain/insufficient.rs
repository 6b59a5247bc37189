//! Explicit "not enough candles" outcome.

use serde::{Deserialize, Serialize};

/// Minimum candles for a full pattern analysis.
pub const MIN_ANALYSIS_CANDLES: usize = 20;
/// Minimum candles for the order block detector.
pub const MIN_ORDER_BLOCK_CANDLES: usize = 10;
/// Minimum candles for the fair value gap detector.
pub const MIN_FVG_CANDLES: usize = 15;
/// Minimum candles for the structure break detector.
pub const MIN_STRUCTURE_CANDLES: usize = 10;
/// Minimum candles for the CISD detector.
pub const MIN_CISD_CANDLES: usize = 20;

/// Returned instead of a result when a series is shorter than required.
///
/// This is a value, not a failure: batch scans skip it and move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("insufficient data: {required} candles required, {provided} provided")]
pub struct InsufficientData {
    pub required: usize,
    pub provided: usize,
}

impl InsufficientData {
    /// `Err` when `provided < required`.
    pub fn check(required: usize, provided: usize) -> Result<(), InsufficientData> {
        if provided < required {
            Err(InsufficientData { required, provided })
        } else {
            Ok(())
        }
    }
}
