//! Price feed port trait.

use crate::domain::error::TradesimError;
use crate::domain::price::{PricePoint, PriceSeries};

/// Source of price points for one asset.
pub trait PriceFeed {
    /// The full validated history available from the feed.
    fn fetch_history(&self) -> Result<PriceSeries, TradesimError>;

    /// The next point in arrival order, `None` once the feed is exhausted.
    fn fetch_latest(&mut self) -> Result<Option<PricePoint>, TradesimError>;
}
