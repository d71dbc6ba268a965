//! Performance statistics computed from a finished equity curve.
//!
//! Equity here is a cumulative sum of per-trade net returns (not compounded),
//! so per-period returns are first differences of the curve.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::simulation::trade::{Trade, TradeDirection};
use crate::utils::maths_utils::{is_flat, mean, sample_std};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough fall of the equity curve. Always `<= 0`.
    pub max_drawdown: f64,
    pub total_return: f64,
    pub num_trades: usize,
    /// Fraction of trades with a positive net return; 0 with no trades.
    pub win_rate: f64,
}

impl PerformanceReport {
    pub fn summary_line(&self) -> String {
        format!(
            "trades={} total={:+.4} sharpe={:.3} maxDD={:.4} win={:.1}%",
            self.num_trades,
            self.total_return,
            self.sharpe_ratio,
            self.max_drawdown,
            self.win_rate * 100.0
        )
    }
}

pub fn equity_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .iter()
        .tuple_windows()
        .map(|(prev, next)| next - prev)
        .collect()
}

/// Annualized Sharpe of per-period equity changes in excess of the risk-free rate.
/// Returns 0 when it is undefined (fewer than two returns, or no dispersion).
pub fn sharpe_ratio(equity: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    let rf_per_period = risk_free_rate / periods_per_year;
    let excess: Vec<f64> = equity_returns(equity)
        .into_iter()
        .map(|r| r - rf_per_period)
        .collect();
    if excess.len() < 2 || is_flat(&excess) {
        return 0.0;
    }
    let std = sample_std(&excess);
    if std == 0.0 || !std.is_finite() {
        return 0.0;
    }
    mean(&excess) / std * periods_per_year.sqrt()
}

pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    equity.iter().fold(0.0, |worst: f64, &value| {
        peak = peak.max(value);
        worst.min(value - peak)
    })
}

pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_win()).count() as f64 / trades.len() as f64
}

/// `(direction, count, summed net return)` for each direction, for log summaries.
pub fn direction_breakdown(trades: &[Trade]) -> Vec<(TradeDirection, usize, f64)> {
    TradeDirection::iter()
        .map(|direction| {
            let (count, net) = trades
                .iter()
                .filter(|t| t.direction == direction)
                .fold((0, 0.0), |(c, n), t| (c + 1, n + t.net_return));
            (direction, count, net)
        })
        .collect()
}

pub fn compute_report(
    equity: &[f64],
    trades: &[Trade],
    risk_free_rate: f64,
    periods_per_year: f64,
) -> PerformanceReport {
    PerformanceReport {
        sharpe_ratio: sharpe_ratio(equity, risk_free_rate, periods_per_year),
        max_drawdown: max_drawdown(equity),
        total_return: equity.last().copied().unwrap_or(0.0),
        num_trades: trades.len(),
        win_rate: win_rate(trades),
    }
}
