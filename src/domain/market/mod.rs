pub mod price_series;

pub use price_series::{DailyReturn, PricePoint, PriceSeries};

/// Aligned subject and benchmark closing-price series for one request.
///
/// Produced by a market data collaborator for a single trailing calendar
/// window; consumed once by the forecast engine and never cached.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub subject: PriceSeries,
    pub benchmark: PriceSeries,
}
