//! Simple Moving Average (SMA).
//!
//! Rolling mean of one bar field (close price or volume) over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;
use crate::domain::Bar;

/// Which bar field an average is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarField {
    Close,
    Volume,
}

impl BarField {
    fn read(self, bar: &Bar) -> f64 {
        match self {
            BarField::Close => bar.close,
            BarField::Volume => bar.volume as f64,
        }
    }

    fn label(self) -> &'static str {
        match self {
            BarField::Close => "sma",
            BarField::Volume => "volume_sma",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    field: BarField,
    name: String,
}

impl Sma {
    /// Average of close prices.
    pub fn new(period: usize) -> Self {
        Self::of(BarField::Close, period)
    }

    /// Average of traded volume.
    pub fn volume(period: usize) -> Self {
        Self::of(BarField::Volume, period)
    }

    pub fn of(field: BarField, period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            field,
            name: format!("{}_{period}", field.label()),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let mut result = vec![None; n];

        if n < self.period {
            return result;
        }

        let mut sum: f64 = bars
            .iter()
            .take(self.period)
            .map(|bar| self.field.read(bar))
            .sum();
        result[self.period - 1] = Some(sum / self.period as f64);

        // Roll the window forward
        for i in self.period..n {
            sum += self.field.read(&bars[i]) - self.field.read(&bars[i - self.period]);
            result[i] = Some(sum / self.period as f64);
        }

        result
    }
}
