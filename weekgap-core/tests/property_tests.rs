//! Property tests for the indicator, detector and sizing invariants.
//!
//! 1. Short history — fewer than 20 bars leaves every indicator undefined
//! 2. RSI bounds — RSI stays in [0, 100] and is exactly 100 without losses
//! 3. Volume ratio identity — ratio = volume / volume SMA whenever defined
//! 4. Sizing — shares never risk more than 1% of capital
//! 5. Gap classification — actionable iff strictly below the threshold

use chrono::NaiveDate;
use proptest::prelude::*;
use weekgap_core::data::canonicalize;
use weekgap_core::data::RawBar;
use weekgap_core::detectors::{GapDetector, GAP_DOWN_THRESHOLD_PCT};
use weekgap_core::domain::{Bar, Capital};
use weekgap_core::indicators::{IndicatorCalculator, MIN_HISTORY};
use weekgap_core::sizing::{RiskSizer, RISK_PER_TRADE};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (10.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_volume() -> impl Strategy<Value = u64> {
    0..5_000_000_u64
}

fn arb_bars(len: impl Into<proptest::collection::SizeRange>) -> impl Strategy<Value = Vec<Bar>> {
    proptest::collection::vec((arb_price(), arb_volume()), len).prop_map(|rows| {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let raw = rows
            .into_iter()
            .enumerate()
            .map(|(i, (close, volume))| RawBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume,
            })
            .collect();
        canonicalize(raw)
    })
}

// ── 1. Short history ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn short_history_is_all_undefined(bars in arb_bars(0..MIN_HISTORY)) {
        let series = IndicatorCalculator::new().compute(&bars);
        prop_assert_eq!(series.len(), bars.len());
        for point in series.points() {
            prop_assert!(point.rsi14.is_none());
            prop_assert!(point.sma20.is_none());
            prop_assert!(point.volume_sma20.is_none());
            prop_assert!(point.volume_ratio.is_none());
        }
    }
}

// ── 2. RSI bounds ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_is_bounded(bars in arb_bars(20..80)) {
        let series = IndicatorCalculator::new().compute(&bars);
        prop_assert_eq!(series.len(), bars.len());
        for rsi in series.points().iter().filter_map(|p| p.rsi14) {
            prop_assert!((0.0..=100.0).contains(&rsi), "rsi out of range: {}", rsi);
        }
    }

    #[test]
    fn rsi_is_100_without_losses(
        start in arb_price(),
        steps in proptest::collection::vec(0.0..5.0_f64, 20..60),
    ) {
        let mut close = start;
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars: Vec<Bar> = steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                close += step;
                Bar {
                    date: base + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000,
                }
            })
            .collect();
        let series = IndicatorCalculator::new().compute(&bars);
        for rsi in series.points().iter().filter_map(|p| p.rsi14) {
            prop_assert_eq!(rsi, 100.0);
        }
    }
}

// ── 3. Volume ratio identity ─────────────────────────────────────────

proptest! {
    #[test]
    fn volume_ratio_matches_definition(bars in arb_bars(20..60)) {
        let series = IndicatorCalculator::new().compute(&bars);
        for (bar, point) in bars.iter().zip(series.points()) {
            match (point.volume_sma20, point.volume_ratio) {
                (Some(mean), Some(ratio)) => {
                    prop_assert!(mean != 0.0);
                    prop_assert!((ratio - bar.volume as f64 / mean).abs() < 1e-9);
                }
                (Some(mean), None) => prop_assert_eq!(mean, 0.0),
                (None, ratio) => prop_assert!(ratio.is_none()),
            }
        }
    }
}

// ── 4. Sizing ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn capital_risk_never_exceeds_budget(
        capital in 10_000.0..10_000_000.0_f64,
        entry in arb_price(),
        stop_offset in 0.01..50.0_f64,
    ) {
        let capital = Capital::new(capital).unwrap();
        let stop = entry + stop_offset;
        let size = RiskSizer::default().size(capital, entry, stop).unwrap();

        let loss = size.shares as f64 * (stop - entry);
        prop_assert!(loss <= capital.amount() * RISK_PER_TRADE * (1.0 + 1e-9));

        // One more share would overshoot the position value.
        prop_assert!((size.shares + 1) as f64 * entry > size.position_value);
    }
}

// ── 5. Gap classification ────────────────────────────────────────────

proptest! {
    #[test]
    fn actionable_iff_strictly_below_threshold(gap in -5.0..5.0_f64) {
        let detector = GapDetector::default();
        prop_assert_eq!(detector.is_actionable(gap), gap < GAP_DOWN_THRESHOLD_PCT);
    }
}
