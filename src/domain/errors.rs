use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by market data collaborators
#[derive(Debug, Clone, Error)]
pub enum MarketDataError {
    #[error("Ticker symbol '{symbol}' not found or has no data for the requested range")]
    TickerNotFound { symbol: String },

    #[error("Failed to fetch market data for '{symbol}': {reason}")]
    FetchFailed { symbol: String, reason: String },

    #[error("Malformed market data for '{symbol}': {reason}")]
    InvalidData { symbol: String, reason: String },
}

/// Contract violations raised by the forecast engine.
///
/// These are programming-error class failures: the sufficiency gate and the
/// request validation layer must prevent all of them on well-formed input.
#[derive(Debug, Clone, Error)]
pub enum ForecastError {
    #[error("Invalid forecast parameter: {name} must be >= 1")]
    InvalidParameter { name: &'static str },

    #[error("Insufficient window: need {window} observations, have {available}")]
    InsufficientWindow { window: usize, available: usize },

    #[error("Reference price for {series} series must be positive and finite, got {price}")]
    InvalidReferencePrice { series: &'static str, price: f64 },
}

/// Errors raised while assembling a price series from raw observations
#[derive(Debug, Clone, Error)]
pub enum PriceSeriesError {
    #[error("Duplicate trading day {date} in price series")]
    DuplicateDate { date: NaiveDate },
}
