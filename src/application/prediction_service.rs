use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use thiserror::Error;
use tracing::info;

use crate::application::forecast_engine::ForecastEngine;
use crate::domain::errors::{ForecastError, MarketDataError};
use crate::domain::forecast::ForecastResult;
use crate::domain::ports::MarketDataService;

/// Failures a prediction request can surface to the interface layer.
///
/// Market failures come from the data collaborator; forecast failures are
/// engine contract violations. Insufficient history is neither — it resolves
/// to a valid zero-confidence `ForecastResult`.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Market(#[from] MarketDataError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// Orchestrates one prediction: resolves the fetch window, calls the market
/// data collaborator, and hands the aligned series to the forecast engine.
///
/// Holds no per-request state; safe to share behind an `Arc`.
pub struct PredictionService {
    market_data: Arc<dyn MarketDataService>,
    engine: ForecastEngine,
    lookback_days: usize,
    horizon_days: usize,
}

impl PredictionService {
    pub fn new(
        market_data: Arc<dyn MarketDataService>,
        lookback_days: usize,
        horizon_days: usize,
    ) -> Self {
        Self {
            market_data,
            engine: ForecastEngine::new(),
            lookback_days,
            horizon_days,
        }
    }

    /// Generates an outperformance prediction for `symbol` as of
    /// `requested_date`. Per-request `lookback_days`/`horizon_days` override
    /// the configured defaults.
    pub async fn predict_for_symbol(
        &self,
        symbol: &str,
        requested_date: NaiveDate,
        lookback_days: Option<usize>,
        horizon_days: Option<usize>,
    ) -> Result<ForecastResult, PredictionError> {
        let lookback = lookback_days.unwrap_or(self.lookback_days);
        let horizon = horizon_days.unwrap_or(self.horizon_days);

        info!(
            "Generating prediction for {} on {} (lookback={}, horizon={})",
            symbol, requested_date, lookback, horizon
        );

        // Trading days are sparser than calendar days; fetch a window wide
        // enough to contain `lookback` observations despite weekends and
        // holidays. The provider treats `end` as exclusive.
        let start = requested_date - Duration::days(lookback as i64 * 2 + 5);
        let end = requested_date + Duration::days(1);

        let snapshot = self
            .market_data
            .fetch_daily_closes(symbol, start, end)
            .await?;

        let result = self.engine.predict(
            &snapshot.subject,
            &snapshot.benchmark,
            requested_date,
            Some(lookback),
            Some(horizon),
        )?;

        info!(
            "Prediction for {}: outperform={} confidence={:.3}",
            symbol, result.prediction, result.confidence
        );
        Ok(result)
    }
}
