//! Bar — the fundamental market data unit.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar for a single symbol.
///
/// Bars reach the detectors only through `data::canonicalize`, so a slice of
/// bars is always ascending by date with no duplicate dates and finite prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// True when `next` is the calendar day immediately after this bar.
    pub fn is_followed_by(&self, next: &Bar) -> bool {
        self.date.succ_opt() == Some(next.date)
    }

    /// Positive prices with open and close inside `[low, high]`.
    pub fn is_sane(&self) -> bool {
        self.low > 0.0
            && self.high >= self.low
            && (self.low..=self.high).contains(&self.open)
            && (self.low..=self.high).contains(&self.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 6, 13).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_rejects_non_positive_prices_and_close_outside_range() {
        let mut zero_low = sample_bar();
        zero_low.low = 0.0;
        assert!(!zero_low.is_sane());

        let mut close_above_high = sample_bar();
        close_above_high.close = 106.0;
        assert!(!close_above_high.is_sane());
    }

    #[test]
    fn weekday_follows_date() {
        assert_eq!(sample_bar().weekday(), Weekday::Thu);
    }

    #[test]
    fn followed_by_requires_next_calendar_day() {
        let thu = sample_bar();
        let mut fri = sample_bar();
        fri.date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let mut next_fri = sample_bar();
        next_fri.date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();

        assert!(thu.is_followed_by(&fri));
        assert!(!thu.is_followed_by(&next_fri));
        assert!(!fri.is_followed_by(&thu));
    }
}
