use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use std::sync::Mutex;
use tracing::info;

use crate::domain::errors::MarketDataError;
use crate::domain::market::{MarketSnapshot, PricePoint, PriceSeries};
use crate::domain::ports::MarketDataService;

/// Deterministic market data provider for tests and offline runs.
///
/// Serves a canned snapshot or a canned failure when configured; otherwise
/// synthesizes gently drifting weekday closes over the requested range.
pub struct MockMarketDataService {
    snapshot: Option<MarketSnapshot>,
    failure: Option<MarketDataError>,
    last_request: Mutex<Option<(String, NaiveDate, NaiveDate)>>,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            failure: None,
            last_request: Mutex::new(None),
        }
    }

    pub fn with_snapshot(mut self, snapshot: MarketSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_failure(mut self, failure: MarketDataError) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Arguments of the most recent fetch, for assertions on the window math
    pub fn last_request(&self) -> Option<(String, NaiveDate, NaiveDate)> {
        self.last_request.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn synthesize(symbol: &str, start: NaiveDate, end: NaiveDate) -> MarketSnapshot {
        let weekdays: Vec<NaiveDate> = start
            .iter_days()
            .take_while(|d| *d < end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .collect();

        let subject = weekdays
            .iter()
            .enumerate()
            .map(|(i, &date)| PricePoint::new(date, 200.0 + i as f64 * 0.5))
            .collect();
        let benchmark = weekdays
            .iter()
            .enumerate()
            .map(|(i, &date)| PricePoint::new(date, 100.0 + i as f64 * 0.25))
            .collect();

        info!(
            "MockMarketDataService: synthesized {} weekday closes for {}",
            weekdays.len(),
            symbol
        );

        // Distinct weekdays cannot collide, so construction is infallible here
        MarketSnapshot {
            subject: PriceSeries::from_points(subject).unwrap_or_default(),
            benchmark: PriceSeries::from_points(benchmark).unwrap_or_default(),
        }
    }
}

impl Default for MockMarketDataService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MarketSnapshot, MarketDataError> {
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) =
            Some((symbol.to_string(), start, end));

        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        if let Some(snapshot) = &self.snapshot {
            return Ok(snapshot.clone());
        }
        Ok(Self::synthesize(symbol, start, end))
    }
}
