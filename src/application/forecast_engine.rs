//! Forecast engine: recursive moving-average price extrapolation and a
//! spread-to-confidence heuristic calibrated against realized volatility.
//!
//! Every function here is a pure function of its inputs: no I/O, no caching,
//! no shared state. Concurrent use is safe by construction.

use std::cmp::Ordering;

use chrono::NaiveDate;
use statrs::statistics::{Data, Distribution};
use tracing::warn;

use crate::domain::errors::ForecastError;
use crate::domain::forecast::ForecastResult;
use crate::domain::market::PriceSeries;

/// Trading days of history used as the extrapolation and volatility basis
pub const DEFAULT_LOOKBACK_DAYS: usize = 10;

/// Future trading days to forecast
pub const DEFAULT_HORIZON_DAYS: usize = 5;

/// Floor for the realized-volatility proxy when the spread history is flat
/// or too short to yield a usable standard deviation
const VOLATILITY_FLOOR: f64 = 1e-4;

/// Recursive moving-average forecast.
///
/// Produces exactly `steps` future price estimates. Each estimate is the
/// arithmetic mean of the last `window` values of a working sequence seeded
/// with `history`, and is appended back onto that sequence so later steps
/// build on earlier predictions. The compounding is intentional smoothing;
/// a non-recursive moving average yields different values.
///
/// # Errors
/// `InsufficientWindow` if the working sequence is ever shorter than
/// `window` — a caller precondition violation, never a user-facing outcome.
pub fn roll_forward_forecast(
    history: &[f64],
    window: usize,
    steps: usize,
) -> Result<Vec<f64>, ForecastError> {
    if window == 0 {
        return Err(ForecastError::InvalidParameter { name: "window" });
    }

    let mut working = history.to_vec();
    let mut path = Vec::with_capacity(steps);
    for _ in 0..steps {
        if working.len() < window {
            return Err(ForecastError::InsufficientWindow {
                window,
                available: working.len(),
            });
        }
        let tail = &working[working.len() - window..];
        let next = tail.iter().sum::<f64>() / window as f64;
        path.push(next);
        working.push(next);
    }
    Ok(path)
}

/// Cumulative return of a forecast path relative to the current price.
///
/// An empty path carries no signal and returns 0.0 by policy. The caller
/// guarantees a positive, finite `current_price` (see `reference_price`).
pub fn cumulative_return(current_price: f64, path: &[f64]) -> f64 {
    match path.last() {
        Some(end) => end / current_price - 1.0,
        None => 0.0,
    }
}

/// Maps the forecast spread to a confidence value in [0, 1].
///
/// The realized volatility of the daily subject-minus-benchmark return
/// spread over the last `lookback_days` serves as the scale unit. Volatility
/// is assumed to grow with the square root of time, so the spread is
/// normalized by `sqrt(horizon)` before saturation:
///
/// `z = |spread| / (vol * sqrt(max(horizon, 1)))`, `confidence = 1 - e^-z`
///
/// Confidence depends on the spread only through `|spread|`: swapping
/// subject and benchmark leaves it unchanged. Always finite, 0 at `z = 0`.
pub fn confidence_score(
    subject: &PriceSeries,
    benchmark: &PriceSeries,
    spread: f64,
    lookback_days: usize,
    horizon_days: usize,
) -> f64 {
    let spread_history = spread_return_history(subject, benchmark);
    let start = spread_history.len().saturating_sub(lookback_days);
    let recent = &spread_history[start..];

    let std_val = match recent.len() {
        0 | 1 => None,
        _ => Data::new(recent.to_vec()).std_dev(),
    };
    let std_val = match std_val {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => VOLATILITY_FLOOR,
    };

    let h = horizon_days.max(1) as f64;
    let z = spread.abs() / (std_val * h.sqrt());
    let confidence = 1.0 - (-z).exp();
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Daily return spread between two series, joined by trading date.
///
/// Mirrors index-aligned differencing: only days present in both return
/// series contribute, and non-finite entries are dropped.
fn spread_return_history(subject: &PriceSeries, benchmark: &PriceSeries) -> Vec<f64> {
    let subject_returns = subject.daily_returns();
    let benchmark_returns = benchmark.daily_returns();

    let mut spreads = Vec::with_capacity(subject_returns.len());
    let (mut i, mut j) = (0, 0);
    while i < subject_returns.len() && j < benchmark_returns.len() {
        match subject_returns[i].date.cmp(&benchmark_returns[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                let diff = subject_returns[i].value - benchmark_returns[j].value;
                if diff.is_finite() {
                    spreads.push(diff);
                }
                i += 1;
                j += 1;
            }
        }
    }
    spreads
}

/// Latest close of a trailing window, validated as a usable divisor.
fn reference_price(
    window: &PriceSeries,
    series: &'static str,
) -> Result<f64, ForecastError> {
    let price = window.latest_close().unwrap_or(f64::NAN);
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(ForecastError::InvalidReferencePrice { series, price })
    }
}

/// Stateless outperformance forecaster.
///
/// One invocation consumes two aligned daily closing-price series and
/// produces a boolean outperformance prediction with a confidence score.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastEngine;

impl ForecastEngine {
    pub fn new() -> Self {
        Self
    }

    /// Predicts whether `subject` will outperform `benchmark` over the
    /// horizon, based on history up to and including `requested_date`.
    ///
    /// Insufficient subject history (fewer than `lookback_days` observations
    /// on or before `requested_date`) is a defined business outcome and
    /// yields a zero-confidence negative prediction, never an error. Errors
    /// are reserved for contract misuse: zero parameters, windows the
    /// sufficiency gate should have rejected, unusable reference prices.
    pub fn predict(
        &self,
        subject: &PriceSeries,
        benchmark: &PriceSeries,
        requested_date: NaiveDate,
        lookback_days: Option<usize>,
        horizon_days: Option<usize>,
    ) -> Result<ForecastResult, ForecastError> {
        let lookback = lookback_days.unwrap_or(DEFAULT_LOOKBACK_DAYS);
        let horizon = horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS);
        if lookback == 0 {
            return Err(ForecastError::InvalidParameter {
                name: "lookback_days",
            });
        }
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter {
                name: "horizon_days",
            });
        }

        let subject = subject.on_or_before(requested_date);
        let benchmark = benchmark.on_or_before(requested_date);

        if subject.len() < lookback {
            warn!(
                "Not enough history: found {} trading days, need {}",
                subject.len(),
                lookback
            );
            return Ok(ForecastResult::insufficient_data());
        }

        let subject_window = subject.trailing(lookback);
        let benchmark_window = benchmark.trailing(lookback);

        let subject_current = reference_price(&subject_window, "subject")?;
        let benchmark_current = reference_price(&benchmark_window, "benchmark")?;

        let subject_path = roll_forward_forecast(&subject_window.closes(), lookback, horizon)?;
        let benchmark_path =
            roll_forward_forecast(&benchmark_window.closes(), lookback, horizon)?;

        let subject_cumulative = cumulative_return(subject_current, &subject_path);
        let benchmark_cumulative = cumulative_return(benchmark_current, &benchmark_path);

        let spread = subject_cumulative - benchmark_cumulative;
        let confidence =
            confidence_score(&subject_window, &benchmark_window, spread, lookback, horizon);

        Ok(ForecastResult::new(spread > 0.0, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::PricePoint;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn series(closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(day(1 + i as u32), c))
            .collect();
        PriceSeries::from_points(points).unwrap()
    }

    #[test]
    fn test_roll_forward_forecast_recursive_values() {
        let prices = [100.0, 101.0, 102.0, 103.0, 104.0];
        let path = roll_forward_forecast(&prices, 3, 2).unwrap();

        assert_eq!(path.len(), 2);
        // Step 1: mean(102, 103, 104)
        assert!((path[0] - 103.0).abs() < 1e-12);
        // Step 2 includes the appended step-1 value: mean(103, 104, 103)
        assert!((path[1] - 310.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_roll_forward_forecast_window_violation() {
        let prices = [100.0, 101.0];
        let err = roll_forward_forecast(&prices, 3, 1).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientWindow {
                window: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn test_roll_forward_forecast_never_returns_short_paths() {
        // Enough for the first step but the check re-runs every iteration;
        // the working sequence grows, so later steps cannot fail.
        let prices = [100.0, 101.0, 102.0];
        let path = roll_forward_forecast(&prices, 3, 50).unwrap();
        assert_eq!(path.len(), 50);
        assert!(path.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_cumulative_return() {
        let value = cumulative_return(100.0, &[101.0, 102.0, 103.0]);
        assert!((value - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_cumulative_return_empty_path_is_neutral() {
        assert_eq!(cumulative_return(100.0, &[]), 0.0);
    }

    #[test]
    fn test_confidence_zero_spread_maps_to_zero() {
        let subject = series(&[100.0, 101.0, 100.0, 102.0, 101.0]);
        let benchmark = series(&[50.0, 50.5, 50.2, 50.8, 50.4]);
        let confidence = confidence_score(&subject, &benchmark, 0.0, 4, 5);
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn test_confidence_monotonic_in_spread_magnitude() {
        let subject = series(&[100.0, 101.0, 100.0, 102.0, 101.0]);
        let benchmark = series(&[50.0, 50.5, 50.2, 50.8, 50.4]);

        let mut last = 0.0;
        for spread in [0.0, 0.005, 0.01, 0.05, 0.2, 1.0] {
            let confidence = confidence_score(&subject, &benchmark, spread, 4, 5);
            assert!(confidence >= last);
            assert!((0.0..=1.0).contains(&confidence));
            last = confidence;
        }
    }

    #[test]
    fn test_confidence_depends_on_absolute_spread() {
        let subject = series(&[100.0, 101.0, 100.0, 102.0, 101.0]);
        let benchmark = series(&[50.0, 50.5, 50.2, 50.8, 50.4]);

        let positive = confidence_score(&subject, &benchmark, 0.02, 4, 5);
        let negative = confidence_score(&subject, &benchmark, -0.02, 4, 5);
        assert_eq!(positive, negative);
    }

    #[test]
    fn test_confidence_flat_spread_uses_volatility_floor() {
        // Identical relative moves: spread history is exactly zero, so the
        // std dev collapses and the floor takes over instead of dividing
        // by zero.
        let subject = series(&[100.0, 101.0, 102.0, 103.0]);
        let benchmark = series(&[200.0, 202.0, 204.0, 206.0]);

        let confidence = confidence_score(&subject, &benchmark, 0.01, 3, 5);
        assert!(confidence.is_finite());
        assert!(confidence > 0.99); // tiny floor, large z, saturates
        assert!(confidence <= 1.0);
    }

    #[test]
    fn test_confidence_single_observation_uses_volatility_floor() {
        // One observation produces no return history at all; the floor
        // keeps the scaling well-defined.
        let subject = series(&[100.0]);
        let benchmark = series(&[200.0]);

        let neutral = confidence_score(&subject, &benchmark, 0.0, 5, 5);
        assert_eq!(neutral, 0.0);

        let signal = confidence_score(&subject, &benchmark, 0.01, 5, 5);
        assert!(signal.is_finite());
        assert!(signal > 0.9);
    }

    #[test]
    fn test_predict_insufficient_data_terminal() {
        let subject = series(&[100.0, 101.0, 102.0]);
        let benchmark = series(&[100.0, 100.0, 100.0]);

        let result = ForecastEngine::new()
            .predict(&subject, &benchmark, day(28), Some(10), Some(5))
            .unwrap();
        assert_eq!(result, ForecastResult::insufficient_data());
    }

    #[test]
    fn test_predict_filters_to_requested_date() {
        // 12 observations, but only 3 on or before day 3
        let subject = series(&[
            100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0, 108.0, 109.0, 110.0, 111.0,
        ]);
        let benchmark = subject.clone();

        let result = ForecastEngine::new()
            .predict(&subject, &benchmark, day(3), Some(10), Some(5))
            .unwrap();
        assert_eq!(result, ForecastResult::insufficient_data());
    }

    #[test]
    fn test_predict_rejects_zero_parameters() {
        let s = series(&[100.0, 101.0]);
        let engine = ForecastEngine::new();

        let err = engine
            .predict(&s, &s, day(28), Some(0), Some(5))
            .unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InvalidParameter {
                name: "lookback_days"
            }
        ));

        let err = engine
            .predict(&s, &s, day(28), Some(2), Some(0))
            .unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InvalidParameter {
                name: "horizon_days"
            }
        ));
    }

    #[test]
    fn test_predict_rejects_non_positive_reference_price() {
        let subject = series(&[100.0, 101.0, 0.0]);
        let benchmark = series(&[100.0, 101.0, 102.0]);

        let err = ForecastEngine::new()
            .predict(&subject, &benchmark, day(28), Some(3), Some(5))
            .unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InvalidReferencePrice {
                series: "subject",
                ..
            }
        ));
    }

    #[test]
    fn test_predict_declining_subject_outperforms_flat_benchmark() {
        // A declining series extrapolates above its own latest close (the
        // window mean exceeds it), so its forecast cumulative return is
        // positive while the flat benchmark's is zero.
        let subject = series(&[110.0, 109.0, 108.0, 107.0, 106.0]);
        let benchmark = series(&[100.0, 100.0, 100.0, 100.0, 100.0]);

        let result = ForecastEngine::new()
            .predict(&subject, &benchmark, day(28), Some(5), Some(3))
            .unwrap();
        assert!(result.prediction);
        assert!(result.confidence > 0.0);
        assert!(result.confidence <= 1.0);
    }

    #[test]
    fn test_predict_zero_spread_is_non_outperformance() {
        // Identical series: both cumulative returns match exactly, the
        // spread is zero, and strict inequality predicts false.
        let closes = [100.0, 102.0, 101.0, 103.0, 104.0];
        let subject = series(&closes);
        let benchmark = series(&closes);

        let result = ForecastEngine::new()
            .predict(&subject, &benchmark, day(28), Some(5), Some(5))
            .unwrap();
        assert!(!result.prediction);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_predict_symmetry_flips_prediction_keeps_confidence() {
        let subject = series(&[110.0, 109.0, 108.0, 107.0, 106.0]);
        let benchmark = series(&[100.0, 100.5, 100.2, 100.8, 100.4]);
        let engine = ForecastEngine::new();

        let forward = engine
            .predict(&subject, &benchmark, day(28), Some(5), Some(3))
            .unwrap();
        let swapped = engine
            .predict(&benchmark, &subject, day(28), Some(5), Some(3))
            .unwrap();

        assert_ne!(forward.prediction, swapped.prediction);
        assert_eq!(forward.confidence, swapped.confidence);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let subject = series(&[110.0, 112.0, 108.0, 115.0, 113.0, 117.0]);
        let benchmark = series(&[100.0, 100.4, 99.8, 101.2, 100.9, 101.5]);
        let engine = ForecastEngine::new();

        let first = engine
            .predict(&subject, &benchmark, day(28), Some(5), Some(5))
            .unwrap();
        let second = engine
            .predict(&subject, &benchmark, day(28), Some(5), Some(5))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_predict_applies_default_parameters() {
        // 9 observations: enough for an explicit lookback of 9 but short of
        // the default 10, so defaults must hit the insufficiency gate.
        let subject_closes: Vec<f64> = (0..9).map(|i| 110.0 - i as f64).collect();
        let benchmark_closes: Vec<f64> = vec![100.0; 9];
        let subject = series(&subject_closes);
        let benchmark = series(&benchmark_closes);
        let engine = ForecastEngine::new();

        let with_defaults = engine
            .predict(&subject, &benchmark, day(28), None, None)
            .unwrap();
        assert_eq!(with_defaults, ForecastResult::insufficient_data());

        let explicit = engine
            .predict(&subject, &benchmark, day(28), Some(9), None)
            .unwrap();
        assert!(explicit.prediction);
        assert!(explicit.confidence > 0.0);
    }
}
