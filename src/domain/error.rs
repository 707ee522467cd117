//! Domain error types.

use chrono::NaiveDateTime;

/// Broad classification of a [`TradesimError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Data,
    Config,
    Computation,
    Io,
}

/// Top-level error type for tradesim.
#[derive(Debug, thiserror::Error)]
pub enum TradesimError {
    #[error("insufficient data: have {points} price points, need {minimum}")]
    InsufficientData { points: usize, minimum: usize },

    #[error("duplicate timestamp {timestamp}")]
    DuplicateTimestamp { timestamp: NaiveDateTime },

    #[error("timestamp {current} is earlier than previous point {previous}")]
    NonMonotonicTimestamp {
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("invalid price {price} at {timestamp}: prices must be finite and positive")]
    InvalidPrice {
        timestamp: NaiveDateTime,
        price: f64,
    },

    #[error("no price data available")]
    NoData,

    #[error("invalid config value {parameter}: {reason}")]
    InvalidConfig { parameter: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("computation error: {reason}")]
    Computation { reason: String },

    #[error("price feed error: {reason}")]
    Feed { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradesimError {
    pub fn invalid_config(parameter: &str, reason: impl Into<String>) -> Self {
        TradesimError::InvalidConfig {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TradesimError::InsufficientData { .. }
            | TradesimError::DuplicateTimestamp { .. }
            | TradesimError::NonMonotonicTimestamp { .. }
            | TradesimError::InvalidPrice { .. }
            | TradesimError::NoData => ErrorKind::Data,
            TradesimError::InvalidConfig { .. }
            | TradesimError::ConfigParse { .. }
            | TradesimError::ConfigMissing { .. } => ErrorKind::Config,
            TradesimError::Computation { .. } => ErrorKind::Computation,
            TradesimError::Feed { .. } | TradesimError::Report { .. } | TradesimError::Io(_) => {
                ErrorKind::Io
            }
        }
    }
}

impl From<&TradesimError> for std::process::ExitCode {
    fn from(err: &TradesimError) -> Self {
        let code: u8 = match err.kind() {
            ErrorKind::Io => 1,
            ErrorKind::Config => 2,
            ErrorKind::Computation => 3,
            ErrorKind::Data => 5,
        };
        std::process::ExitCode::from(code)
    }
}
