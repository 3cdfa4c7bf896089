use chrono::NaiveDate;

use crate::domain::errors::PriceSeriesError;

/// One daily closing-price observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily percentage change, keyed by the later of the two trading days
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub value: f64,
}

/// Ordered sequence of daily closing prices for one instrument.
///
/// Strictly increasing by trading day, no duplicate days. Calendar gaps
/// (weekends, holidays) are expected and tolerated. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from raw observations, sorting by date.
    /// Duplicate trading days are rejected.
    pub fn from_points(mut points: Vec<PricePoint>) -> Result<Self, PriceSeriesError> {
        points.sort_by_key(|p| p.date);
        for pair in points.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(PriceSeriesError::DuplicateDate { date: pair[0].date });
            }
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Observations dated on or before `date`, order preserved
    pub fn on_or_before(&self, date: NaiveDate) -> PriceSeries {
        let points = self
            .points
            .iter()
            .copied()
            .filter(|p| p.date <= date)
            .collect();
        // Filtering a sorted, deduplicated series keeps the invariant
        Self { points }
    }

    /// The most recent `n` observations, still in ascending date order
    pub fn trailing(&self, n: usize) -> PriceSeries {
        let start = self.points.len().saturating_sub(n);
        Self {
            points: self.points[start..].to_vec(),
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn latest_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// Day-over-day percentage changes.
    ///
    /// The first observation has no prior day to difference against and
    /// produces no entry; pairs whose change is not computable (zero prior
    /// close, non-finite result) are skipped.
    pub fn daily_returns(&self) -> Vec<DailyReturn> {
        let mut returns = Vec::with_capacity(self.points.len().saturating_sub(1));
        for pair in self.points.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if prev.close == 0.0 {
                continue;
            }
            let value = next.close / prev.close - 1.0;
            if value.is_finite() {
                returns.push(DailyReturn {
                    date: next.date,
                    value,
                });
            }
        }
        returns
    }
}
