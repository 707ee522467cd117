//! Performance metrics and statistics.
//!
//! Percent figures are expressed as percentages (5.0 means 5%). Max drawdown
//! is reported as a non-positive percent: -12.5 means the equity fell 12.5%
//! below its running peak at worst.

use super::portfolio::EquityPoint;
use super::position::RoundTrip;

pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub final_equity: f64,
    pub total_return_pct: f64,
    pub round_trips: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    /// `None` when no round trip completed.
    pub win_rate_pct: Option<f64>,
    pub max_drawdown_pct: f64,
    pub profit_factor: f64,
    pub avg_trade_return_pct: f64,
    pub max_consecutive_losses: usize,
    pub sharpe_ratio: f64,
}

impl Metrics {
    pub fn compute(
        initial_capital: f64,
        equity_curve: &[EquityPoint],
        round_trips: &[RoundTrip],
        periods_per_year: f64,
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_return_pct = if equity_curve.is_empty() || initial_capital <= 0.0 {
            0.0
        } else {
            (final_equity / initial_capital - 1.0) * 100.0
        };

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut gross_wins = 0.0_f64;
        let mut gross_losses = 0.0_f64;
        let mut loss_streak = 0usize;
        let mut max_consecutive_losses = 0usize;

        for rt in round_trips {
            if rt.pnl > 0.0 {
                trades_won += 1;
                gross_wins += rt.pnl;
                loss_streak = 0;
            } else if rt.pnl < 0.0 {
                trades_lost += 1;
                gross_losses += -rt.pnl;
                loss_streak += 1;
                max_consecutive_losses = max_consecutive_losses.max(loss_streak);
            } else {
                loss_streak = 0;
            }
        }

        let count = round_trips.len();
        let win_rate_pct = if count > 0 {
            Some(trades_won as f64 / count as f64 * 100.0)
        } else {
            None
        };

        let profit_factor = if gross_losses > 0.0 {
            gross_wins / gross_losses
        } else if gross_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_trade_return_pct = if count > 0 {
            round_trips.iter().map(|rt| rt.return_pct).sum::<f64>() / count as f64
        } else {
            0.0
        };

        Metrics {
            final_equity,
            total_return_pct,
            round_trips: count,
            trades_won,
            trades_lost,
            win_rate_pct,
            max_drawdown_pct: compute_drawdown(equity_curve),
            profit_factor,
            avg_trade_return_pct,
            max_consecutive_losses,
            sharpe_ratio: compute_sharpe(equity_curve, periods_per_year),
        }
    }
}

/// Worst peak-to-trough decline as a non-positive percent.
pub fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (point.equity - peak) / peak * 100.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Annualised Sharpe ratio of per-step equity returns, zero risk-free rate.
pub fn compute_sharpe(equity_curve: &[EquityPoint], periods_per_year: f64) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 {
                (curr - prev) / prev
            } else {
                0.0
            }
        })
        .collect();

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        (mean / stddev) * periods_per_year.sqrt()
    } else {
        0.0
    }
}
