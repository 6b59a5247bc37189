//! Trade lifecycle shared by every strategy.
//!
//! Per candle, in order:
//! 1. With a trade open, check its stop and target. Stop wins when both are
//!    touched on the same candle. Nothing else happens on that candle, even
//!    when the trade just closed.
//! 2. With no trade open, ask the entry signal for at most one order.
//!
//! After the last candle any open trade is closed at that candle's close.

use std::collections::BTreeMap;

use crate::domain::{Candle, ExitReason, Side, Trade};

/// An entry the signal wants filled on the current candle.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryOrder {
    pub side: Side,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub reason: String,
    pub metadata: BTreeMap<String, f64>,
}

impl EntryOrder {
    /// Builds an order whose target sits `risk_reward` risks away from entry.
    ///
    /// Returns `None` when the entry is already at or beyond its stop.
    pub fn bracket(
        side: Side,
        entry_price: f64,
        stop_loss: f64,
        risk_reward: f64,
        reason: impl Into<String>,
    ) -> Option<Self> {
        let risk = match side {
            Side::Buy => entry_price - stop_loss,
            Side::Sell => stop_loss - entry_price,
        };
        if risk.is_nan() || risk <= 0.0 {
            return None;
        }
        let take_profit = match side {
            Side::Buy => entry_price + risk * risk_reward,
            Side::Sell => entry_price - risk * risk_reward,
        };
        Some(Self {
            side,
            entry_price,
            stop_loss,
            take_profit,
            reason: reason.into(),
            metadata: BTreeMap::new(),
        })
    }

    pub fn with_metadata(mut self, key: &str, value: f64) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// Source of entries for one backtest run.
///
/// `scan` is only called while no trade is open. Implementations must only
/// use patterns formed strictly before `index`.
pub trait EntrySignal {
    fn scan(&mut self, candles: &[Candle], index: usize) -> Option<EntryOrder>;
}

/// Single-position trade book: NONE → OPEN → CLOSED.
#[derive(Debug, Default)]
pub struct TradeLifecycle {
    trades: Vec<Trade>,
    open: Option<usize>,
}

impl TradeLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.open.is_none()
    }

    pub fn open_trade(&self) -> Option<&Trade> {
        self.open.and_then(|i| self.trades.get(i))
    }

    /// Opens a trade at the order's price. Ignored while another trade is open.
    pub fn open(&mut self, order: EntryOrder, candle: &Candle, index: usize) -> bool {
        if self.open.is_some() {
            return false;
        }
        self.trades.push(Trade {
            entry_time: candle.time,
            entry_price: order.entry_price,
            entry_index: index,
            signal_type: order.side,
            stop_loss: order.stop_loss,
            take_profit: order.take_profit,
            exit_time: None,
            exit_price: None,
            exit_index: None,
            exit_reason: None,
            profit_loss: None,
            profit_loss_percent: None,
            reason: order.reason.clone(),
            entry_reason: order.reason,
            metadata: order.metadata,
        });
        self.open = Some(self.trades.len() - 1);
        true
    }

    /// Closes the open trade at its stop or target if `candle` reaches it.
    pub fn check_exit(&mut self, candle: &Candle, index: usize) -> Option<ExitReason> {
        let trade = self.open.and_then(|i| self.trades.get_mut(i))?;

        let (stop_hit, target_hit) = match trade.signal_type {
            Side::Buy => (candle.low <= trade.stop_loss, candle.high >= trade.take_profit),
            Side::Sell => (candle.high >= trade.stop_loss, candle.low <= trade.take_profit),
        };

        let (reason, price) = if stop_hit {
            (ExitReason::StopLoss, trade.stop_loss)
        } else if target_hit {
            (ExitReason::TakeProfit, trade.take_profit)
        } else {
            return None;
        };

        trade.close(candle.time, price, index, reason);
        self.open = None;
        Some(reason)
    }

    /// Closes the open trade at `candle.close`.
    pub fn force_close(&mut self, candle: &Candle, index: usize) {
        if let Some(trade) = self.open.and_then(|i| self.trades.get_mut(i)) {
            trade.close(candle.time, candle.close, index, ExitReason::EndOfBacktest);
        }
        self.open = None;
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }
}

/// Drives `signal` over `candles` and returns every trade, all closed.
pub fn simulate<S: EntrySignal + ?Sized>(candles: &[Candle], signal: &mut S) -> Vec<Trade> {
    let mut book = TradeLifecycle::new();

    for (i, candle) in candles.iter().enumerate() {
        if !book.is_flat() {
            book.check_exit(candle, i);
            continue;
        }
        if let Some(order) = signal.scan(candles, i) {
            book.open(order, candle, i);
        }
    }

    if let Some(last) = candles.last() {
        book.force_close(last, candles.len() - 1);
    }
    book.into_trades()
}
