//! Gap detector — Monday's open against the prior Friday's close.
//!
//! The trailing `GAP_WINDOW` bars are searched for a Friday bar (its close)
//! and a Monday bar (its open/low/high). Their order inside the window does
//! not matter; the weekend between them is expected.

use chrono::Weekday;
use tracing::debug;

use super::{Detection, GapDetection};
use crate::domain::{Bar, GapResult};

/// Trailing trading days searched for the Friday/Monday pair.
pub const GAP_WINDOW: usize = 3;

/// A Monday gap must be strictly below this percentage to be actionable.
pub const GAP_DOWN_THRESHOLD_PCT: f64 = -0.3;

/// Why no gap was measured.
#[derive(Debug, Clone, PartialEq)]
pub enum GapMiss {
    NoBars,
    NoFriday,
    NoMonday,
    /// Friday closed at zero; the gap is undefined.
    ZeroFridayClose,
}

#[derive(Debug, Clone)]
pub struct GapDetector {
    window: usize,
    threshold_pct: f64,
}

impl Default for GapDetector {
    fn default() -> Self {
        Self::new(GAP_DOWN_THRESHOLD_PCT)
    }
}

impl GapDetector {
    pub fn new(threshold_pct: f64) -> Self {
        Self {
            window: GAP_WINDOW,
            threshold_pct,
        }
    }

    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    /// Exclusive: a gap equal to the threshold is not actionable.
    pub fn is_actionable(&self, gap_pct: f64) -> bool {
        gap_pct < self.threshold_pct
    }

    pub fn detect(&self, symbol: &str, bars: &[Bar]) -> GapDetection {
        if bars.is_empty() {
            return Detection::NotFound(GapMiss::NoBars);
        }

        let recent = &bars[bars.len().saturating_sub(self.window)..];
        let mut friday: Option<&Bar> = None;
        let mut monday: Option<&Bar> = None;
        for bar in recent {
            match bar.weekday() {
                Weekday::Fri => friday = Some(bar),
                Weekday::Mon => monday = Some(bar),
                _ => {}
            }
        }

        let Some(friday) = friday else {
            debug!(symbol, "no Friday bar in gap window");
            return Detection::NotFound(GapMiss::NoFriday);
        };
        let Some(monday) = monday else {
            debug!(symbol, "no Monday bar in gap window");
            return Detection::NotFound(GapMiss::NoMonday);
        };
        if friday.close == 0.0 {
            return Detection::NotFound(GapMiss::ZeroFridayClose);
        }

        let gap_pct = round_pct(GapResult::gap_pct(friday.close, monday.open));
        let is_actionable = self.is_actionable(gap_pct);
        debug!(symbol, gap_pct, is_actionable, "Monday gap measured");

        Detection::Found(GapResult {
            symbol: symbol.to_string(),
            friday_date: friday.date,
            monday_date: monday.date,
            friday_close: friday.close,
            monday_open: monday.open,
            monday_low: monday.low,
            monday_high: monday.high,
            gap_pct,
            is_actionable,
        })
    }
}

/// Round to 1e-9 percent so a price-exact -0.3% gap compares equal to the threshold.
fn round_pct(pct: f64) -> f64 {
    (pct * 1e9).round() / 1e9
}
