/// Outcome of one outperformance forecast.
///
/// `prediction` is true when the subject is expected to outperform the
/// benchmark over the horizon; `confidence` is always finite and in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastResult {
    pub prediction: bool,
    pub confidence: f64,
}

impl ForecastResult {
    pub fn new(prediction: bool, confidence: f64) -> Self {
        Self {
            prediction,
            confidence,
        }
    }

    /// Terminal value for the insufficient-history business outcome.
    /// Not an error: callers get a zero-confidence negative prediction.
    pub fn insufficient_data() -> Self {
        Self {
            prediction: false,
            confidence: 0.0,
        }
    }
}
