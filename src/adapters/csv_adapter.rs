//! CSV file price feed adapter.
//!
//! Expects a header row followed by `timestamp,price` records. Timestamps may
//! be `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or a bare `YYYY-MM-DD`.

use crate::domain::error::TradesimError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::price_feed::PriceFeed;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvPriceFeed {
    path: PathBuf,
    pending: Option<std::vec::IntoIter<PricePoint>>,
}

impl CsvPriceFeed {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            pending: None,
        }
    }

    /// All rows in file order, without series validation.
    fn read_points(&self) -> Result<Vec<PricePoint>, TradesimError> {
        let content = fs::read_to_string(&self.path).map_err(|e| TradesimError::Feed {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut points = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| TradesimError::Feed {
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = row + 2;

            let ts_str = record.get(0).ok_or_else(|| TradesimError::Feed {
                reason: format!("line {}: missing timestamp column", line),
            })?;
            let timestamp = parse_timestamp(ts_str).ok_or_else(|| TradesimError::Feed {
                reason: format!("line {}: invalid timestamp '{}'", line, ts_str),
            })?;

            let price: f64 = record
                .get(1)
                .ok_or_else(|| TradesimError::Feed {
                    reason: format!("line {}: missing price column", line),
                })?
                .parse()
                .map_err(|e| TradesimError::Feed {
                    reason: format!("line {}: invalid price value: {}", line, e),
                })?;

            points.push(PricePoint::new(timestamp, price));
        }

        debug!(path = %self.path.display(), rows = points.len(), "read price file");
        Ok(points)
    }
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

impl PriceFeed for CsvPriceFeed {
    fn fetch_history(&self) -> Result<PriceSeries, TradesimError> {
        let points = self.read_points()?;
        if points.is_empty() {
            return Err(TradesimError::NoData);
        }
        PriceSeries::from_points(points)
    }

    fn fetch_latest(&mut self) -> Result<Option<PricePoint>, TradesimError> {
        if self.pending.is_none() {
            self.pending = Some(self.read_points()?.into_iter());
        }
        Ok(self.pending.as_mut().and_then(|rows| rows.next()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn ts(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn fetch_history_returns_correct_data() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "prices.csv",
            "timestamp,price\n\
             2024-01-15 09:30:00,100.5\n\
             2024-01-15 09:31:00,101.0\n\
             2024-01-15 09:32:00,99.75\n",
        );
        let feed = CsvPriceFeed::new(path);
        let series = feed.fetch_history().unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.points()[0].timestamp, ts(15, 9, 30));
        assert_eq!(series.points()[0].price, 100.5);
        assert_eq!(series.points()[2].price, 99.75);
    }

    #[test]
    fn accepts_all_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-01-15 09:30:00"), Some(ts(15, 9, 30)));
        assert_eq!(parse_timestamp("2024-01-15T09:30:00"), Some(ts(15, 9, 30)));
        assert_eq!(parse_timestamp("2024-01-15"), Some(ts(15, 0, 0)));
        assert_eq!(parse_timestamp("15/01/2024"), None);
    }

    #[test]
    fn trims_whitespace() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "p.csv", "timestamp, price\n2024-01-15 , 10.0 \n");
        let series = CsvPriceFeed::new(path).fetch_history().unwrap();
        assert_eq!(series.points()[0].price, 10.0);
    }

    #[test]
    fn missing_file_is_feed_error() {
        let feed = CsvPriceFeed::new(PathBuf::from("/nonexistent/prices.csv"));
        let err = feed.fetch_history().unwrap_err();
        assert!(matches!(err, TradesimError::Feed { .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn invalid_price_value_is_feed_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "p.csv", "timestamp,price\n2024-01-15,abc\n");
        let err = CsvPriceFeed::new(path).fetch_history().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn header_only_is_no_data() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "p.csv", "timestamp,price\n");
        let err = CsvPriceFeed::new(path).fetch_history().unwrap_err();
        assert!(matches!(err, TradesimError::NoData));
    }

    #[test]
    fn duplicate_timestamp_is_data_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "p.csv",
            "timestamp,price\n2024-01-15,10.0\n2024-01-15,11.0\n",
        );
        let err = CsvPriceFeed::new(path).fetch_history().unwrap_err();
        assert!(matches!(err, TradesimError::DuplicateTimestamp { .. }));
        assert_eq!(err.kind(), ErrorKind::Data);
    }

    #[test]
    fn non_positive_price_is_data_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "p.csv", "timestamp,price\n2024-01-15,0\n");
        let err = CsvPriceFeed::new(path).fetch_history().unwrap_err();
        assert!(matches!(err, TradesimError::InvalidPrice { .. }));
    }

    #[test]
    fn fetch_latest_replays_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "p.csv",
            "timestamp,price\n2024-01-15,10.0\n2024-01-16,11.0\n",
        );
        let mut feed = CsvPriceFeed::new(path);

        assert_eq!(feed.fetch_latest().unwrap().unwrap().price, 10.0);
        assert_eq!(feed.fetch_latest().unwrap().unwrap().price, 11.0);
        assert!(feed.fetch_latest().unwrap().is_none());
        assert!(feed.fetch_latest().unwrap().is_none());
    }
}
