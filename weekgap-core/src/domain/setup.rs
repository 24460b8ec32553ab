//! Setup candidate — a Thursday/Friday pair where Friday failed to make a higher high.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One confirmed end-of-week setup for a symbol.
///
/// This record is the unit of the persisted setup batch: the Monday run reads
/// `symbol`, `display_name`, `friday_low`, `friday_high` and `friday_close`
/// back from storage, so field names are part of the batch schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupCandidate {
    pub symbol: String,
    pub display_name: String,
    pub friday_date: NaiveDate,
    pub thursday_high: f64,
    pub friday_high: f64,
    pub friday_low: f64,
    pub friday_close: f64,
    /// `(friday_high - thursday_high) / thursday_high * 100`, never positive.
    pub decline_pct: f64,
    /// Last defined RSI(14) of the series, which is usually (not always) Friday's.
    pub rsi_at_friday: Option<f64>,
    /// Friday close sits below the latest SMA(20).
    pub below_sma20: bool,
    pub volume_ratio: Option<f64>,
    /// Historical gap-down success rate for this name, 0 when unknown.
    pub gap_success_pct: f64,
}

impl SetupCandidate {
    /// Percent change from Thursday's high to Friday's high.
    pub fn decline_pct(thursday_high: f64, friday_high: f64) -> f64 {
        (friday_high - thursday_high) / thursday_high * 100.0
    }

    /// Copy of this candidate carrying a historical success rate.
    pub fn with_success_rate(mut self, gap_success_pct: f64) -> Self {
        self.gap_success_pct = gap_success_pct;
        self
    }
}
