//! Backtest engine and event loop.
//!
//! `Simulator` is the resumable, one-point-at-a-time engine: a driver feeds it
//! price points as they arrive and may inspect the portfolio between steps.
//! `run_backtest` is the batch entry point over a complete series. Both walk
//! the same long-only state machine:
//!
//! - Flat + BUY: spend `investment_fraction * cash`, go long
//! - Long + SELL: sell everything, record the round trip, go flat
//! - Anything else: no-op
//!
//! Equity (cash + quantity * price) is recorded on every step.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::error::TradesimError;
use super::execution::{enter_long, exit_position, EntryResult};
use super::indicator::{IndicatorSeries, IndicatorType};
use super::indicator_helpers::compute_indicators;
use super::metrics::{Metrics, DEFAULT_PERIODS_PER_YEAR};
use super::portfolio::{EquityPoint, Portfolio, PortfolioState, Trade};
use super::position::RoundTrip;
use super::price::{PricePoint, PriceSeries};
use super::signal::{generate_signal, Signal};
use super::strategy::StrategyConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Sell any open position at the final price when the run finishes.
    pub liquidate_at_end: bool,
    /// Annualisation factor for the Sharpe ratio.
    pub periods_per_year: f64,
}

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            liquidate_at_end: false,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), TradesimError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(TradesimError::invalid_config(
                "initial_capital",
                format!("must be positive and finite, got {}", self.initial_capital),
            ));
        }
        if !self.periods_per_year.is_finite() || self.periods_per_year <= 0.0 {
            return Err(TradesimError::invalid_config(
                "periods_per_year",
                format!("must be positive, got {}", self.periods_per_year),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: StrategyConfig,
    pub trades: Vec<Trade>,
    pub round_trips: Vec<RoundTrip>,
    pub equity_curve: Vec<EquityPoint>,
    pub final_state: PortfolioState,
    pub metrics: Metrics,
}

/// What happened on one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub index: usize,
    pub point: PricePoint,
    pub signal: Signal,
    /// The trade executed on this step, if the signal was actionable.
    pub trade: Option<Trade>,
    pub equity: f64,
}

#[derive(Debug, Clone)]
pub struct Simulator {
    strategy: StrategyConfig,
    config: BacktestConfig,
    indicator_types: Vec<IndicatorType>,
    series: PriceSeries,
    portfolio: Portfolio,
}

impl Simulator {
    pub fn new(strategy: StrategyConfig, config: BacktestConfig) -> Result<Self, TradesimError> {
        strategy.validate()?;
        config.validate()?;

        info!(
            strategy = %strategy,
            initial_capital = config.initial_capital,
            "starting simulation"
        );

        Ok(Simulator {
            indicator_types: strategy.kind.required_indicators(),
            portfolio: Portfolio::new(config.initial_capital),
            series: PriceSeries::new(),
            strategy,
            config,
        })
    }

    /// Append one point and act on its signal.
    ///
    /// Indicators are recomputed over the whole accumulated history. A point
    /// that fails validation is rejected before any state changes.
    pub fn step(&mut self, point: PricePoint) -> Result<StepOutcome, TradesimError> {
        self.series.push(point)?;
        let index = self.series.len() - 1;

        let indicators = compute_indicators(self.series.points(), &self.indicator_types);
        self.advance(index, &indicators)
    }

    pub fn snapshot(&self) -> PortfolioState {
        self.portfolio
            .snapshot(self.series.last().map(|p| p.price))
    }

    pub fn trades(&self) -> &[Trade] {
        &self.portfolio.trades
    }

    pub fn round_trips(&self) -> &[RoundTrip] {
        &self.portfolio.round_trips
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.portfolio.equity_curve
    }

    /// Index of the most recent point, `None` before the first step.
    pub fn last_index(&self) -> Option<usize> {
        self.series.len().checked_sub(1)
    }

    pub fn prices(&self) -> &PriceSeries {
        &self.series
    }

    pub fn strategy(&self) -> &StrategyConfig {
        &self.strategy
    }

    /// Apply the terminal policy and compute metrics.
    pub fn finish(mut self) -> BacktestResult {
        if self.config.liquidate_at_end {
            if let Some(last) = self.series.last().copied() {
                if let Some(exit) = exit_position(&mut self.portfolio, last.price, last.timestamp) {
                    debug!(
                        price = last.price,
                        quantity = exit.trade.quantity,
                        pnl = exit.round_trip.pnl,
                        "liquidated open position at end of run"
                    );
                }
            }
        }

        let final_state = self.snapshot();
        let Portfolio {
            trades,
            round_trips,
            equity_curve,
            ..
        } = self.portfolio;

        let metrics = Metrics::compute(
            self.config.initial_capital,
            &equity_curve,
            &round_trips,
            self.config.periods_per_year,
        );

        info!(
            strategy = %self.strategy,
            points = self.series.len(),
            trades = trades.len(),
            total_return_pct = metrics.total_return_pct,
            "simulation finished"
        );

        BacktestResult {
            strategy: self.strategy,
            trades,
            round_trips,
            equity_curve,
            final_state,
            metrics,
        }
    }

    fn advance(
        &mut self,
        index: usize,
        indicators: &HashMap<IndicatorType, IndicatorSeries>,
    ) -> Result<StepOutcome, TradesimError> {
        let points = self.series.points();
        let point = points[index];
        let signal = generate_signal(&self.strategy.kind, points, indicators, index);

        let trade = match signal {
            Signal::Buy => match enter_long(
                &mut self.portfolio,
                point.price,
                point.timestamp,
                self.strategy.investment_fraction,
            ) {
                EntryResult::Entered(trade) => {
                    debug!(index, price = point.price, quantity = trade.quantity, "BUY");
                    Some(trade)
                }
                EntryResult::AlreadyLong => {
                    debug!(index, "BUY ignored: already long");
                    None
                }
                EntryResult::InsufficientCapital => {
                    warn!(index, cash = self.portfolio.cash, "BUY skipped: insufficient capital");
                    None
                }
            },
            Signal::Sell => match exit_position(&mut self.portfolio, point.price, point.timestamp) {
                Some(exit) => {
                    debug!(
                        index,
                        price = point.price,
                        quantity = exit.trade.quantity,
                        pnl = exit.round_trip.pnl,
                        "SELL"
                    );
                    Some(exit.trade)
                }
                None => {
                    debug!(index, "SELL ignored: no open position");
                    None
                }
            },
            Signal::Hold => None,
        };

        let equity = self.portfolio.total_equity(point.price);
        if !equity.is_finite() {
            return Err(TradesimError::Computation {
                reason: format!("equity became {} at {}", equity, point.timestamp),
            });
        }
        self.portfolio.record_equity(point.timestamp, equity);

        Ok(StepOutcome {
            index,
            point,
            signal,
            trade,
            equity,
        })
    }
}

/// Run a strategy over a complete price series.
///
/// Indicators are computed once up front; each index then goes through the
/// same state machine as [`Simulator::step`].
pub fn run_backtest(
    series: &PriceSeries,
    strategy: &StrategyConfig,
    config: &BacktestConfig,
) -> Result<BacktestResult, TradesimError> {
    let minimum = strategy.kind.min_history();
    let mut sim = Simulator::new(*strategy, config.clone())?;

    if series.len() < minimum {
        return Err(TradesimError::InsufficientData {
            points: series.len(),
            minimum,
        });
    }

    let indicators = compute_indicators(series.points(), &sim.indicator_types);
    sim.series = series.clone();
    for index in 0..series.len() {
        sim.advance(index, &indicators)?;
    }

    Ok(sim.finish())
}
