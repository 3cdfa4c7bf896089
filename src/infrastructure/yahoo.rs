//! Yahoo Finance daily-close client.
//!
//! Fetches the subject symbol and the benchmark index from the v8 chart API
//! and maps them into aligned `PriceSeries` pairs. All network concerns
//! (timeouts, retries, backoff) stay inside this client.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::errors::MarketDataError;
use crate::domain::market::{MarketSnapshot, PricePoint, PriceSeries};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::http_client_factory::HttpClientFactory;

pub struct YahooFinanceClient {
    client: ClientWithMiddleware,
    base_url: String,
    benchmark_symbol: String,
}

impl YahooFinanceClient {
    pub fn new(base_url: String, benchmark_symbol: String, timeout_secs: u64) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout_secs),
            base_url,
            benchmark_symbol,
        }
    }

    async fn fetch_one(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, MarketDataError> {
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp();
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        debug!("Fetching daily closes for {} from {} to {}", symbol, start, end);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .map_err(|e| MarketDataError::FetchFailed {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            warn!("No data found for {} in the requested date range", symbol);
            return Err(MarketDataError::TickerNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(MarketDataError::FetchFailed {
                symbol: symbol.to_string(),
                reason: format!("unexpected status {}", status),
            });
        }

        let payload: ChartResponse =
            response
                .json()
                .await
                .map_err(|e| MarketDataError::InvalidData {
                    symbol: symbol.to_string(),
                    reason: e.to_string(),
                })?;

        parse_chart(symbol, payload)
    }
}

#[async_trait]
impl MarketDataService for YahooFinanceClient {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MarketSnapshot, MarketDataError> {
        let (subject, benchmark) = tokio::join!(
            self.fetch_one(symbol, start, end),
            self.fetch_one(&self.benchmark_symbol, start, end)
        );

        let subject = subject?;

        // The benchmark index is expected to exist; any failure there is a
        // fetch problem, not an unknown ticker.
        let benchmark = benchmark.map_err(|e| match e {
            MarketDataError::TickerNotFound { symbol } => MarketDataError::FetchFailed {
                reason: "benchmark index data unavailable".to_string(),
                symbol,
            },
            other => other,
        })?;
        if benchmark.is_empty() {
            return Err(MarketDataError::FetchFailed {
                symbol: self.benchmark_symbol.clone(),
                reason: "benchmark index returned an empty series".to_string(),
            });
        }

        Ok(MarketSnapshot { subject, benchmark })
    }
}

// ===== Chart API payload =====

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

/// Maps a chart payload to a price series. Days with a null close (halted,
/// not yet settled) are skipped; an entirely empty result is an unknown
/// ticker as far as callers are concerned.
fn parse_chart(symbol: &str, payload: ChartResponse) -> Result<PriceSeries, MarketDataError> {
    if let Some(err) = payload.chart.error {
        warn!("Chart API error for {}: {} ({})", symbol, err.code, err.description);
        return Err(MarketDataError::TickerNotFound {
            symbol: symbol.to_string(),
        });
    }

    let result = payload
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| MarketDataError::TickerNotFound {
            symbol: symbol.to_string(),
        })?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .unwrap_or_default();

    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes) {
        let Some(close) = close else { continue };
        if !close.is_finite() {
            continue;
        }
        let Some(moment) = DateTime::from_timestamp(*ts, 0) else {
            continue;
        };
        points.push(PricePoint::new(moment.date_naive(), close));
    }

    if points.is_empty() {
        return Err(MarketDataError::TickerNotFound {
            symbol: symbol.to_string(),
        });
    }

    PriceSeries::from_points(points).map_err(|e| MarketDataError::InvalidData {
        symbol: symbol.to_string(),
        reason: e.to_string(),
    })
}
