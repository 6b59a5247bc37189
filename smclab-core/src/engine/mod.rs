//! Backtest engine: the shared trade lifecycle and the four strategies.

pub mod lifecycle;
pub mod params;
pub mod strategies;

pub use lifecycle::{simulate, EntryOrder, EntrySignal, TradeLifecycle};
pub use params::{EntryMethod, ParamError, StrategyParams};
pub use strategies::{run_strategy, BacktestError, ConsumedGaps, StrategyKind};
