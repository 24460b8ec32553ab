//! Weekly pattern detectors.
//!
//! Both detectors search a short, bounded window at the end of the series by
//! calendar weekday and report a tagged outcome. A miss always says why, so
//! "no adjacent pair" and "condition failed" stay distinguishable in logs.

pub mod gap;
pub mod setup;

pub use gap::{GapDetector, GapMiss, GAP_DOWN_THRESHOLD_PCT, GAP_WINDOW};
pub use setup::{find_thursday_friday, SetupDetector, SetupMiss, SETUP_WINDOW};

use crate::domain::{GapResult, SetupCandidate};

/// Outcome of a bounded-window search.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection<T, M> {
    Found(T),
    NotFound(M),
}

impl<T, M> Detection<T, M> {
    pub fn is_found(&self) -> bool {
        matches!(self, Detection::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Detection::Found(value) => Some(value),
            Detection::NotFound(_) => None,
        }
    }

    pub fn miss(&self) -> Option<&M> {
        match self {
            Detection::Found(_) => None,
            Detection::NotFound(miss) => Some(miss),
        }
    }
}

pub type SetupDetection = Detection<SetupCandidate, SetupMiss>;
pub type GapDetection = Detection<GapResult, GapMiss>;

/// Bars on real trading days (weekends skipped) starting at `start`.
///
/// Each entry is `(open, high, low, close)`; volume is fixed at 1000.
#[cfg(test)]
pub(crate) fn trading_bars(
    start: chrono::NaiveDate,
    ohlc: &[(f64, f64, f64, f64)],
) -> Vec<crate::domain::Bar> {
    use chrono::{Datelike, Weekday};

    let mut date = start;
    let mut bars = Vec::with_capacity(ohlc.len());
    for &(open, high, low, close) in ohlc {
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date = date.succ_opt().unwrap();
        }
        bars.push(crate::domain::Bar {
            date,
            open,
            high,
            low,
            close,
            volume: 1000,
        });
        date = date.succ_opt().unwrap();
    }
    bars
}
