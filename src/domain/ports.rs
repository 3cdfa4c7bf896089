use crate::domain::errors::MarketDataError;
use crate::domain::market::MarketSnapshot;
use async_trait::async_trait;
use chrono::NaiveDate;

// Need async_trait for async functions in traits
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Fetches daily closing prices for `symbol` and the benchmark index
    /// over `[start, end)` (`end` is exclusive), aligned by trading day.
    ///
    /// Retries, timeouts and backoff are the implementation's concern;
    /// callers only see aligned series or a typed failure.
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MarketSnapshot, MarketDataError>;
}
