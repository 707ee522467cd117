//! Trade execution for the long-only state machine.
//!
//! Fills happen at the signal price with fractional quantities. Each trade is
//! fully built before the portfolio is touched, so a rejected order leaves
//! the state unchanged.

use chrono::NaiveDateTime;

use super::portfolio::{Portfolio, Trade, TradeSide};
use super::position::{Position, RoundTrip};

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered(Trade),
    AlreadyLong,
    InsufficientCapital,
}

/// Enter a long position.
///
/// Steps:
/// 1. Refuse if a position is already open (no pyramiding)
/// 2. Spend = cash * investment_fraction
/// 3. Quantity = spend / price (fractional)
/// 4. If the quantity is not positive, return InsufficientCapital
/// 5. Build the trade, then commit cash and position
pub fn enter_long(
    portfolio: &mut Portfolio,
    price: f64,
    timestamp: NaiveDateTime,
    investment_fraction: f64,
) -> EntryResult {
    if !portfolio.is_flat() {
        return EntryResult::AlreadyLong;
    }

    let spend = portfolio.cash * investment_fraction;
    let quantity = spend / price;
    if !(quantity.is_finite() && quantity > 0.0) {
        return EntryResult::InsufficientCapital;
    }

    let trade = Trade {
        timestamp,
        side: TradeSide::Buy,
        price,
        quantity,
        cash_after: portfolio.cash - spend,
        position_after: quantity,
        realized_pnl: None,
    };

    portfolio.cash = trade.cash_after;
    portfolio.position = Some(Position {
        quantity,
        avg_cost: price,
        entry_timestamp: timestamp,
    });
    portfolio.record_trade(trade);

    EntryResult::Entered(trade)
}

/// Result of an exit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub trade: Trade,
    pub round_trip: RoundTrip,
}

/// Exit the open position in full.
///
/// Steps:
/// 1. Return `None` when flat
/// 2. Realized P&L = quantity * (price - avg_cost)
/// 3. Build the trade and round trip
/// 4. Add sale proceeds to cash, accumulate realized P&L, go flat
pub fn exit_position(
    portfolio: &mut Portfolio,
    price: f64,
    timestamp: NaiveDateTime,
) -> Option<ExitResult> {
    let position = portfolio.position?;

    let round_trip = RoundTrip::close(&position, price, timestamp);
    let trade = Trade {
        timestamp,
        side: TradeSide::Sell,
        price,
        quantity: position.quantity,
        cash_after: portfolio.cash + position.market_value(price),
        position_after: 0.0,
        realized_pnl: Some(round_trip.pnl),
    };

    portfolio.cash = trade.cash_after;
    portfolio.realized_pnl += round_trip.pnl;
    portfolio.position = None;
    portfolio.record_trade(trade);
    portfolio.record_round_trip(round_trip);

    Some(ExitResult { trade, round_trip })
}
