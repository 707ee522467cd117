//! Price samples and the validated, time-ascending series built from them.

use chrono::NaiveDateTime;

use super::error::TradesimError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: NaiveDateTime, price: f64) -> Self {
        PricePoint { timestamp, price }
    }
}

/// Append-only sequence of price points with strictly increasing timestamps.
///
/// Duplicate timestamps are rejected rather than overwritten, so a series
/// never silently loses a sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new() -> Self {
        PriceSeries { points: Vec::new() }
    }

    /// Build a series from an ordered sequence, validating every point.
    pub fn from_points(points: Vec<PricePoint>) -> Result<Self, TradesimError> {
        let mut series = PriceSeries {
            points: Vec::with_capacity(points.len()),
        };
        for point in points {
            series.push(point)?;
        }
        Ok(series)
    }

    /// Append one point. On error the series is left unchanged.
    pub fn push(&mut self, point: PricePoint) -> Result<(), TradesimError> {
        if !point.price.is_finite() || point.price <= 0.0 {
            return Err(TradesimError::InvalidPrice {
                timestamp: point.timestamp,
                price: point.price,
            });
        }
        if let Some(last) = self.points.last() {
            if point.timestamp == last.timestamp {
                return Err(TradesimError::DuplicateTimestamp {
                    timestamp: point.timestamp,
                });
            }
            if point.timestamp < last.timestamp {
                return Err(TradesimError::NonMonotonicTimestamp {
                    previous: last.timestamp,
                    current: point.timestamp,
                });
            }
        }
        self.points.push(point);
        Ok(())
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}
