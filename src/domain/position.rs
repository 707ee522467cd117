//! Open position and completed round trip.

use chrono::NaiveDateTime;

/// A long holding. Quantity is fractional and always positive; the flat
/// state is represented by the absence of a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub quantity: f64,
    pub avg_cost: f64,
    pub entry_timestamp: NaiveDateTime,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.avg_cost
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity * (price - self.avg_cost)
    }
}

/// One completed BUY then SELL pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTrip {
    pub entry_timestamp: NaiveDateTime,
    pub exit_timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub pnl: f64,
    /// Percent return on the entry cost.
    pub return_pct: f64,
}

impl RoundTrip {
    pub fn close(position: &Position, exit_price: f64, exit_timestamp: NaiveDateTime) -> Self {
        let pnl = position.unrealized_pnl(exit_price);
        RoundTrip {
            entry_timestamp: position.entry_timestamp,
            exit_timestamp,
            entry_price: position.avg_cost,
            exit_price,
            quantity: position.quantity,
            pnl,
            return_pct: (exit_price / position.avg_cost - 1.0) * 100.0,
        }
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}
