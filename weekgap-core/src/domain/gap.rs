//! Monday opening gap relative to the prior Friday close.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapResult {
    pub symbol: String,
    pub friday_date: NaiveDate,
    pub monday_date: NaiveDate,
    pub friday_close: f64,
    pub monday_open: f64,
    pub monday_low: f64,
    pub monday_high: f64,
    /// `(monday_open - friday_close) / friday_close * 100`
    pub gap_pct: f64,
    pub is_actionable: bool,
}

impl GapResult {
    pub fn gap_pct(friday_close: f64, monday_open: f64) -> f64 {
        (monday_open - friday_close) / friday_close * 100.0
    }
}
