use std::sync::Arc;

use chrono::NaiveDate;
use rustcast::application::prediction_service::{PredictionError, PredictionService};
use rustcast::domain::errors::MarketDataError;
use rustcast::domain::market::{MarketSnapshot, PricePoint, PriceSeries};
use rustcast::infrastructure::mock::MockMarketDataService;

fn trading_days(count: u32, base: f64, step: f64) -> PriceSeries {
    let points = (0..count)
        .map(|i| {
            PricePoint::new(
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap() + chrono::Duration::days(i as i64),
                base + i as f64 * step,
            )
        })
        .collect();
    PriceSeries::from_points(points).unwrap()
}

fn requested_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()
}

#[tokio::test]
async fn test_predict_with_sufficient_history() {
    let _ = tracing_subscriber::fmt().try_init();

    let mock = Arc::new(MockMarketDataService::new().with_snapshot(MarketSnapshot {
        subject: trading_days(15, 200.0, -0.5),
        benchmark: trading_days(15, 100.0, 0.0),
    }));
    let service = PredictionService::new(mock, 10, 5);

    let result = service
        .predict_for_symbol("AAPL", requested_date(), None, None)
        .await
        .unwrap();

    // Declining subject extrapolates above its latest close; flat benchmark
    // stays put, so the subject is predicted to outperform.
    assert!(result.prediction);
    assert!(result.confidence > 0.0);
    assert!(result.confidence <= 1.0);
}

#[tokio::test]
async fn test_predict_insufficient_history_is_a_business_outcome() {
    let mock = Arc::new(MockMarketDataService::new().with_snapshot(MarketSnapshot {
        subject: trading_days(5, 200.0, 1.0),
        benchmark: trading_days(5, 100.0, 1.0),
    }));
    let service = PredictionService::new(mock, 10, 5);

    let result = service
        .predict_for_symbol("AAPL", requested_date(), None, None)
        .await
        .unwrap();

    assert!(!result.prediction);
    assert_eq!(result.confidence, 0.0);
}

#[tokio::test]
async fn test_predict_unknown_ticker_propagates() {
    let mock = Arc::new(MockMarketDataService::new().with_failure(
        MarketDataError::TickerNotFound {
            symbol: "NOPE".to_string(),
        },
    ));
    let service = PredictionService::new(mock, 10, 5);

    let err = service
        .predict_for_symbol("NOPE", requested_date(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PredictionError::Market(MarketDataError::TickerNotFound { .. })
    ));
}

#[tokio::test]
async fn test_predict_fetch_failure_propagates() {
    let mock = Arc::new(MockMarketDataService::new().with_failure(
        MarketDataError::FetchFailed {
            symbol: "AAPL".to_string(),
            reason: "connection reset by peer".to_string(),
        },
    ));
    let service = PredictionService::new(mock, 10, 5);

    let err = service
        .predict_for_symbol("AAPL", requested_date(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PredictionError::Market(MarketDataError::FetchFailed { .. })
    ));
}

#[tokio::test]
async fn test_predict_per_request_overrides() {
    let mock = Arc::new(MockMarketDataService::new().with_snapshot(MarketSnapshot {
        subject: trading_days(8, 200.0, -0.5),
        benchmark: trading_days(8, 100.0, 0.0),
    }));
    let service = PredictionService::new(mock, 10, 5);

    // Configured lookback of 10 cannot be satisfied by 8 observations…
    let default_result = service
        .predict_for_symbol("AAPL", requested_date(), None, None)
        .await
        .unwrap();
    assert_eq!(default_result.confidence, 0.0);

    // …but a per-request lookback of 8 can.
    let override_result = service
        .predict_for_symbol("AAPL", requested_date(), Some(8), Some(3))
        .await
        .unwrap();
    assert!(override_result.prediction);
    assert!(override_result.confidence > 0.0);
}

#[tokio::test]
async fn test_predict_is_idempotent_over_the_same_snapshot() {
    let mock = Arc::new(MockMarketDataService::new().with_snapshot(MarketSnapshot {
        subject: trading_days(15, 200.0, -0.7),
        benchmark: trading_days(15, 100.0, 0.2),
    }));
    let service = PredictionService::new(mock, 10, 5);

    let first = service
        .predict_for_symbol("AAPL", requested_date(), None, None)
        .await
        .unwrap();
    let second = service
        .predict_for_symbol("AAPL", requested_date(), None, None)
        .await
        .unwrap();
    assert_eq!(first, second);
}
