//! Reports for the weekly scans: HTML notification bodies and CSV exports.

pub mod export;
pub mod html;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use export::{export_signals_csv, save_signals_csv, signals_file_name};
pub use html::{friday_report, missing_watchlist_report, monday_report};

/// A rendered report, ready for a `NotificationSink`.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subject: String,
    pub html: String,
    pub attachments: Vec<PathBuf>,
}

/// Confidence tier derived from the historical success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// 95% and above.
    P1,
    /// 90% up to 95%.
    P2,
    /// 80% up to 90%.
    P3,
}

impl Priority {
    pub fn for_rate(gap_success_pct: f64) -> Option<Self> {
        if gap_success_pct >= 95.0 {
            Some(Priority::P1)
        } else if gap_success_pct >= 90.0 {
            Some(Priority::P2)
        } else if gap_success_pct >= 80.0 {
            Some(Priority::P3)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::P1 => "Priority 1: Highest Confidence (95%+ Success)",
            Priority::P2 => "Priority 2: High Confidence (90-95% Success)",
            Priority::P3 => "Priority 3: Moderate Confidence (80-90% Success)",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Priority::P1 => "priority1",
            Priority::P2 => "priority2",
            Priority::P3 => "priority3",
        }
    }
}
