//! Trade statistics, pure functions from a trade list to scalars.
//!
//! Only closed trades count. A trade with zero P&L is a loser, matching
//! `Trade::is_winner`.

use serde::{Deserialize, Serialize};
use smclab_core::domain::Trade;

/// Aggregate statistics for one backtest run. All zero for an empty run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeMetrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent, 0..=100.
    pub win_rate: f64,
    pub total_profit_loss: f64,
    pub total_profit_loss_percent: f64,
    pub avg_win: f64,
    /// Mean absolute loss.
    pub avg_loss: f64,
    pub largest_win: f64,
    /// Most negative losing P&L.
    pub largest_loss: f64,
    /// `f64::INFINITY` when there are trades but no losses.
    pub profit_factor: f64,
    /// Percent of the running peak at the deepest drawdown.
    pub max_drawdown: f64,
}

impl TradeMetrics {
    pub fn compute(trades: &[Trade]) -> Self {
        let closed: Vec<&Trade> = trades.iter().filter(|t| t.is_closed()).collect();
        if closed.is_empty() {
            return Self::default();
        }

        let (winners, losers): (Vec<&Trade>, Vec<&Trade>) =
            closed.iter().copied().partition(|t| t.is_winner());

        Self {
            total_trades: closed.len(),
            winning_trades: winners.len(),
            losing_trades: losers.len(),
            win_rate: win_rate(&closed),
            total_profit_loss: closed.iter().map(|t| t.pnl()).sum(),
            total_profit_loss_percent: closed
                .iter()
                .map(|t| t.profit_loss_percent.unwrap_or(0.0))
                .sum(),
            avg_win: mean(winners.iter().map(|t| t.pnl())),
            avg_loss: mean(losers.iter().map(|t| t.pnl().abs())),
            largest_win: winners.iter().map(|t| t.pnl()).fold(0.0, f64::max),
            largest_loss: losers.iter().map(|t| t.pnl()).fold(0.0, f64::min),
            profit_factor: profit_factor(&closed),
            max_drawdown: max_drawdown_percent(&closed),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Winners over closed trades, as a percentage.
pub fn win_rate(trades: &[&Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// Gross winning P&L over gross losing P&L.
///
/// Zero without trades, infinite with trades but nothing lost.
pub fn profit_factor(trades: &[&Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl()).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| !t.is_winner())
        .map(|t| t.pnl())
        .sum::<f64>()
        .abs();

    if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else {
        f64::INFINITY
    }
}

/// Walks cumulative P&L from zero and reports `(peak - cumulative) / peak`
/// in percent at the largest absolute drawdown. Zero if the peak was not
/// positive at that point.
pub fn max_drawdown_percent(trades: &[&Trade]) -> f64 {
    let mut cumulative = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut deepest = 0.0_f64;
    let mut percent = 0.0_f64;

    for t in trades {
        cumulative += t.pnl();
        if cumulative > peak {
            peak = cumulative;
        }
        let drawdown = peak - cumulative;
        if drawdown > deepest {
            deepest = drawdown;
            percent = if peak > 0.0 { drawdown / peak * 100.0 } else { 0.0 };
        }
    }
    percent
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
