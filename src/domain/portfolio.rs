//! Portfolio state, trade log and equity tracking.

use chrono::NaiveDateTime;
use std::fmt;

use super::position::{Position, RoundTrip};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

/// An executed trade with the portfolio state right after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub timestamp: NaiveDateTime,
    pub side: TradeSide,
    pub price: f64,
    pub quantity: f64,
    pub cash_after: f64,
    /// Quantity held after the trade; 0 once flat.
    pub position_after: f64,
    /// `None` for buys.
    pub realized_pnl: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

/// Read-only view of the portfolio handed to callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub position: Option<Position>,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
}

impl PortfolioState {
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position.map_or(0.0, |p| p.market_value(price))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Option<Position>,
    pub realized_pnl: f64,
    pub trades: Vec<Trade>,
    pub round_trips: Vec<RoundTrip>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            position: None,
            realized_pnl: 0.0,
            trades: Vec::new(),
            round_trips: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn record_round_trip(&mut self, round_trip: RoundTrip) {
        self.round_trips.push(round_trip);
    }

    pub fn record_equity(&mut self, timestamp: NaiveDateTime, equity: f64) {
        self.equity_curve.push(EquityPoint { timestamp, equity });
    }

    pub fn total_equity(&self, price: f64) -> f64 {
        self.cash + self.position.map_or(0.0, |p| p.market_value(price))
    }

    /// Snapshot marked to `price`; `None` leaves unrealized P&L at zero.
    pub fn snapshot(&self, price: Option<f64>) -> PortfolioState {
        let unrealized_pnl = match (self.position, price) {
            (Some(pos), Some(price)) => pos.unrealized_pnl(price),
            _ => 0.0,
        };
        PortfolioState {
            cash: self.cash,
            position: self.position,
            realized_pnl: self.realized_pnl,
            unrealized_pnl,
        }
    }
}
