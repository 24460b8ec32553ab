//! Setup detector — Friday's high fails to exceed Thursday's high.
//!
//! Only the trailing `SETUP_WINDOW` bars are examined. The first Thursday that
//! is immediately followed (next calendar day) by a Friday bar decides the
//! outcome; a holiday on either day means there is no pair this week.

use chrono::Weekday;
use tracing::debug;

use super::{Detection, SetupDetection};
use crate::domain::{Bar, SetupCandidate};
use crate::indicators::IndicatorSeries;

/// Trailing trading days searched for the Thursday/Friday pair.
pub const SETUP_WINDOW: usize = 5;

/// Why no setup was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupMiss {
    /// The series was empty.
    NoBars,
    /// No Thursday bar directly followed by a Friday bar in the window.
    NoAdjacentPair,
    /// The pair exists but Friday's high is at or above Thursday's.
    FridayHighNotLower { thursday_high: f64, friday_high: f64 },
}

#[derive(Debug, Clone)]
pub struct SetupDetector {
    window: usize,
}

impl Default for SetupDetector {
    fn default() -> Self {
        Self {
            window: SETUP_WINDOW,
        }
    }
}

impl SetupDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the end of `bars` for this week's setup.
    ///
    /// `indicators` must be aligned with `bars`; missing indicator values are
    /// carried as `None` and never block a setup.
    pub fn detect(
        &self,
        symbol: &str,
        display_name: &str,
        bars: &[Bar],
        indicators: &IndicatorSeries,
    ) -> SetupDetection {
        if bars.is_empty() {
            return Detection::NotFound(SetupMiss::NoBars);
        }

        let recent = &bars[bars.len().saturating_sub(self.window)..];
        let Some((thursday, friday)) = find_thursday_friday(recent) else {
            debug!(symbol, "no Thursday/Friday pair in trailing window");
            return Detection::NotFound(SetupMiss::NoAdjacentPair);
        };

        if friday.high >= thursday.high {
            debug!(
                symbol,
                thursday_high = thursday.high,
                friday_high = friday.high,
                "Friday high not below Thursday high"
            );
            return Detection::NotFound(SetupMiss::FridayHighNotLower {
                thursday_high: thursday.high,
                friday_high: friday.high,
            });
        }

        let latest = indicators.latest().copied().unwrap_or_default();
        let below_sma20 = latest.sma20.is_some_and(|sma| friday.close < sma);

        Detection::Found(SetupCandidate {
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            friday_date: friday.date,
            thursday_high: thursday.high,
            friday_high: friday.high,
            friday_low: friday.low,
            friday_close: friday.close,
            decline_pct: SetupCandidate::decline_pct(thursday.high, friday.high),
            rsi_at_friday: indicators.last_defined_rsi(),
            below_sma20,
            volume_ratio: latest.volume_ratio,
            gap_success_pct: 0.0,
        })
    }
}

/// First Thursday bar followed by the next calendar day's Friday bar.
pub fn find_thursday_friday(window: &[Bar]) -> Option<(&Bar, &Bar)> {
    window
        .windows(2)
        .find(|pair| {
            pair[0].weekday() == Weekday::Thu
                && pair[1].weekday() == Weekday::Fri
                && pair[0].is_followed_by(&pair[1])
        })
        .map(|pair| (&pair[0], &pair[1]))
}
