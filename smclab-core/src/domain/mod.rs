//! Domain types shared by detectors, strategies and the runner.

pub mod candle;
pub mod insufficient;
pub mod pattern;
pub mod trade;

pub use candle::{parse_candles, Candle, CandleError, RawCandle, RawNumber};
pub use insufficient::InsufficientData;
pub use pattern::{
    Bias, BreakKind, CisdZone, FairValueGap, OrderBlock, StructureBreak, SwingPoint, Trend,
};
pub use trade::{ExitReason, Side, Trade};
