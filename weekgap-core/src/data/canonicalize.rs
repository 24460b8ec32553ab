//! Canonicalize provider output into an ordered bar series.
//!
//! Output is ascending by date with unique dates. Void bars and bars that fail
//! `Bar::is_sane` (non-positive prices, high below low, open or close outside
//! the range) are dropped. For a repeated date the bar that came last from the
//! provider wins.

use std::collections::BTreeMap;

use tracing::debug;

use super::provider::RawBar;
use crate::domain::Bar;

pub fn canonicalize(raw: Vec<RawBar>) -> Vec<Bar> {
    let mut by_date: BTreeMap<chrono::NaiveDate, Bar> = BTreeMap::new();
    for raw_bar in raw.into_iter().filter(|b| !b.is_void()) {
        let bar = Bar {
            date: raw_bar.date,
            open: raw_bar.open,
            high: raw_bar.high,
            low: raw_bar.low,
            close: raw_bar.close,
            volume: raw_bar.volume,
        };
        if !bar.is_sane() {
            debug!(date = %bar.date, "dropping bar with inconsistent OHLC");
            continue;
        }
        by_date.insert(bar.date, bar);
    }
    by_date.into_values().collect()
}
