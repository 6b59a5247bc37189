//! Trade: one simulated position from entry to exit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Why a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitReason {
    #[serde(rename = "Stop Loss")]
    StopLoss,
    #[serde(rename = "Take Profit")]
    TakeProfit,
    #[serde(rename = "End of backtest")]
    EndOfBacktest,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::StopLoss => "Stop Loss",
            ExitReason::TakeProfit => "Take Profit",
            ExitReason::EndOfBacktest => "End of backtest",
        }
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A simulated trade. Created open, closed exactly once, never reopened.
///
/// P&L is per unit: `exit - entry` for BUY, `entry - exit` for SELL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Entry ──
    pub entry_time: i64,
    pub entry_price: f64,
    pub entry_index: usize,
    pub signal_type: Side,
    pub stop_loss: f64,
    pub take_profit: f64,

    // ── Exit ──
    pub exit_time: Option<i64>,
    pub exit_price: Option<f64>,
    pub exit_index: Option<usize>,
    pub exit_reason: Option<ExitReason>,

    // ── PnL ──
    pub profit_loss: Option<f64>,
    pub profit_loss_percent: Option<f64>,

    /// Entry reason while open, exit reason once closed.
    pub reason: String,
    pub entry_reason: String,
    pub metadata: BTreeMap<String, f64>,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    /// Realised P&L, zero while open.
    pub fn pnl(&self) -> f64 {
        self.profit_loss.unwrap_or(0.0)
    }

    pub fn is_winner(&self) -> bool {
        self.pnl() > 0.0
    }

    /// Candles held, counting the exit candle. `None` while open.
    pub fn bars_held(&self) -> Option<usize> {
        self.exit_index
            .map(|exit| exit.saturating_sub(self.entry_index) + 1)
    }

    pub(crate) fn close(&mut self, time: i64, price: f64, index: usize, reason: ExitReason) {
        let pnl = match self.signal_type {
            Side::Buy => price - self.entry_price,
            Side::Sell => self.entry_price - price,
        };
        self.exit_time = Some(time);
        self.exit_price = Some(price);
        self.exit_index = Some(index);
        self.exit_reason = Some(reason);
        self.profit_loss = Some(pnl);
        self.profit_loss_percent = Some(pnl / self.entry_price * 100.0);
        self.reason = reason.as_str().to_string();
    }
}
