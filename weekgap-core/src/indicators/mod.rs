//! Technical indicators over a daily bar series.
//!
//! Indicators are pure functions: bar history in, series of the same length
//! out, with `None` for every bar inside the warmup window. The detectors
//! consume them through `IndicatorSeries`, one `IndicatorPoint` per bar.

pub mod rsi;
pub mod sma;

pub use rsi::Rsi;
pub use sma::{BarField, Sma};

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// RSI look-back in bars.
pub const RSI_PERIOD: usize = 14;
/// Close and volume moving-average look-back in bars.
pub const SMA_PERIOD: usize = 20;
/// Minimum history for any indicator value to be produced.
pub const MIN_HISTORY: usize = 20;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce an output series of the same
/// length. The first `lookback()` values are `None` (warmup).
///
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>>;
}

/// Indicator values for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub rsi14: Option<f64>,
    pub sma20: Option<f64>,
    pub volume_sma20: Option<f64>,
    pub volume_ratio: Option<f64>,
}

/// Indicator values aligned index-for-index with the bars they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// A series of `len` points with every field undefined.
    pub fn undefined(len: usize) -> Self {
        Self {
            points: vec![IndicatorPoint::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, bar_index: usize) -> Option<&IndicatorPoint> {
        self.points.get(bar_index)
    }

    pub fn points(&self) -> &[IndicatorPoint] {
        &self.points
    }

    /// The point for the most recent bar.
    pub fn latest(&self) -> Option<&IndicatorPoint> {
        self.points.last()
    }

    /// Most recent RSI value that is defined, searching backwards.
    pub fn last_defined_rsi(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.rsi14)
    }
}

/// Computes RSI(14), SMA(20) of close, SMA(20) of volume and the volume ratio.
#[derive(Debug, Clone)]
pub struct IndicatorCalculator {
    rsi: Rsi,
    sma: Sma,
    volume_sma: Sma,
}

impl Default for IndicatorCalculator {
    fn default() -> Self {
        Self {
            rsi: Rsi::new(RSI_PERIOD),
            sma: Sma::new(SMA_PERIOD),
            volume_sma: Sma::volume(SMA_PERIOD),
        }
    }
}

impl IndicatorCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the full indicator series.
    ///
    /// With fewer than `MIN_HISTORY` bars every field stays undefined; that is
    /// insufficient history, not an error.
    pub fn compute(&self, bars: &[Bar]) -> IndicatorSeries {
        if bars.len() < MIN_HISTORY {
            return IndicatorSeries::undefined(bars.len());
        }

        let rsi = self.rsi.compute(bars);
        let sma = self.sma.compute(bars);
        let volume_sma = self.volume_sma.compute(bars);

        let points = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| IndicatorPoint {
                rsi14: rsi[i],
                sma20: sma[i],
                volume_sma20: volume_sma[i],
                volume_ratio: volume_sma[i]
                    .filter(|mean| *mean != 0.0)
                    .map(|mean| bar.volume as f64 / mean),
            })
            .collect();

        IndicatorSeries { points }
    }
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV on consecutive calendar days: open = prev_close
/// (or close for the first bar), high = max(open,close) + 1.0,
/// low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
