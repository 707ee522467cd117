#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::VecDeque;
use tradesim::domain::backtest::BacktestConfig;
use tradesim::domain::error::TradesimError;
pub use tradesim::domain::price::{PricePoint, PriceSeries};
use tradesim::domain::strategy::{MaParams, StrategyConfig, StrategyKind};
use tradesim::ports::price_feed::PriceFeed;

/// In-memory feed that hands out its points in order.
pub struct MockPriceFeed {
    pub points: Vec<PricePoint>,
    pub error: Option<String>,
    queue: VecDeque<PricePoint>,
}

impl MockPriceFeed {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            error: None,
            queue: VecDeque::new(),
        }
    }

    pub fn with_points(mut self, points: Vec<PricePoint>) -> Self {
        self.queue = points.iter().copied().collect();
        self.points = points;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl PriceFeed for MockPriceFeed {
    fn fetch_history(&self) -> Result<PriceSeries, TradesimError> {
        if let Some(reason) = &self.error {
            return Err(TradesimError::Feed {
                reason: reason.clone(),
            });
        }
        if self.points.is_empty() {
            return Err(TradesimError::NoData);
        }
        PriceSeries::from_points(self.points.clone())
    }

    fn fetch_latest(&mut self) -> Result<Option<PricePoint>, TradesimError> {
        if let Some(reason) = &self.error {
            return Err(TradesimError::Feed {
                reason: reason.clone(),
            });
        }
        Ok(self.queue.pop_front())
    }
}

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// One point per day starting 2024-01-01.
pub fn make_points(prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PricePoint::new(start() + Duration::days(i as i64), p))
        .collect()
}

pub fn make_series(prices: &[f64]) -> PriceSeries {
    PriceSeries::from_points(make_points(prices)).unwrap()
}

/// Linear ramp of `count` prices.
pub fn generate_prices(count: usize, start_price: f64, step: f64) -> Vec<f64> {
    (0..count).map(|i| start_price + step * i as f64).collect()
}

/// Prices used by the moving-average walk-through: signals
/// Hold, Hold, Sell, Buy, Sell, Buy.
pub const MA_SCENARIO: [f64; 6] = [100.0, 105.0, 103.0, 108.0, 102.0, 110.0];

pub fn ma_strategy(window: usize, investment_fraction: f64) -> StrategyConfig {
    StrategyConfig::new(
        StrategyKind::MovingAverage(MaParams { window }),
        investment_fraction,
    )
}

pub fn sample_config(initial_capital: f64) -> BacktestConfig {
    BacktestConfig {
        initial_capital,
        ..BacktestConfig::default()
    }
}
