//! Friday setup scan and Monday gap scan over a basket.
//!
//! Symbols are independent: a fetch failure or an anomaly on one symbol is
//! recorded as that symbol's outcome and the scan moves on. With
//! `parallel = true` the per-symbol work runs on the rayon pool; outcomes are
//! always returned in input order.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use weekgap_core::data::{fetch_bars, Basket, BasketEntry, DataProvider};
use weekgap_core::detectors::{Detection, GapDetector, GapMiss, SetupDetector, SetupMiss};
use weekgap_core::domain::{Capital, GapResult, SetupCandidate, TradeSignal};
use weekgap_core::indicators::IndicatorCalculator;
use weekgap_core::synth::{SignalError, SignalSynthesizer};

use crate::stats::SuccessRateTable;
use crate::store::SetupBatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub setup_lookback_days: u32,
    pub gap_lookback_days: u32,
    pub parallel: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            setup_lookback_days: 31,
            gap_lookback_days: 7,
            parallel: false,
        }
    }
}

/// Terminal state of one symbol in the Friday scan.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupOutcome {
    DataUnavailable { reason: String },
    NoSetup(SetupMiss),
    SetupFound(SetupCandidate),
}

/// Terminal state of one stored setup in the Monday scan.
#[derive(Debug, Clone, PartialEq)]
pub enum GapOutcome {
    DataUnavailable { reason: String },
    NoGap(GapMiss),
    /// The gap window's Friday is not the Friday the setup was detected on.
    StaleSetup {
        setup_friday: NaiveDate,
        gap_friday: NaiveDate,
    },
    GapNotActionable(GapResult),
    Signal(TradeSignal),
    /// Actionable gap that could not be turned into a trade.
    Skipped { gap: GapResult, error: SignalError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOutcome<T> {
    pub symbol: String,
    pub display_name: String,
    pub outcome: T,
}

#[derive(Debug, Clone)]
pub struct SetupScan {
    pub as_of: NaiveDate,
    pub outcomes: Vec<SymbolOutcome<SetupOutcome>>,
}

impl SetupScan {
    /// Found setups ordered by success rate, highest first; basket order breaks ties.
    pub fn watchlist(&self) -> Vec<SetupCandidate> {
        let mut setups: Vec<SetupCandidate> = self
            .outcomes
            .iter()
            .filter_map(|o| match &o.outcome {
                SetupOutcome::SetupFound(setup) => Some(setup.clone()),
                _ => None,
            })
            .collect();
        sort_by_success_desc(&mut setups, |s| s.gap_success_pct);
        setups
    }

    pub fn data_unavailable(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, SetupOutcome::DataUnavailable { .. }))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct GapScan {
    pub batch_id: String,
    pub as_of: NaiveDate,
    pub outcomes: Vec<SymbolOutcome<GapOutcome>>,
}

/// Per-outcome counts for logs and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GapCounts {
    pub signals: usize,
    pub not_actionable: usize,
    pub no_gap: usize,
    pub stale: usize,
    pub skipped: usize,
    pub anomalies: usize,
    pub data_unavailable: usize,
}

impl GapScan {
    /// Signals ordered by success rate, highest first; batch order breaks ties.
    pub fn signals(&self) -> Vec<TradeSignal> {
        let mut signals: Vec<TradeSignal> = self
            .outcomes
            .iter()
            .filter_map(|o| match &o.outcome {
                GapOutcome::Signal(signal) => Some(signal.clone()),
                _ => None,
            })
            .collect();
        sort_by_success_desc(&mut signals, |s| s.gap_success_pct);
        signals
    }

    pub fn counts(&self) -> GapCounts {
        let mut counts = GapCounts::default();
        for o in &self.outcomes {
            match &o.outcome {
                GapOutcome::DataUnavailable { .. } => counts.data_unavailable += 1,
                GapOutcome::NoGap(_) => counts.no_gap += 1,
                GapOutcome::StaleSetup { .. } => counts.stale += 1,
                GapOutcome::GapNotActionable(_) => counts.not_actionable += 1,
                GapOutcome::Signal(_) => counts.signals += 1,
                GapOutcome::Skipped { error, .. } => {
                    counts.skipped += 1;
                    if error.is_anomaly() {
                        counts.anomalies += 1;
                    }
                }
            }
        }
        counts
    }
}

fn sort_by_success_desc<T>(items: &mut [T], key: impl Fn(&T) -> f64) {
    // Stable sort keeps input order among equal rates.
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
}

/// Most recent Friday on or before `date`.
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let friday = Weekday::Fri.num_days_from_monday();
    let back = (date.weekday().num_days_from_monday() + 7 - friday) % 7;
    date - Duration::days(i64::from(back))
}

/// Data source and limits shared by both scans.
pub struct ScanContext<'a> {
    pub provider: &'a dyn DataProvider,
    pub options: ScanOptions,
}

impl<'a> ScanContext<'a> {
    pub fn new(provider: &'a dyn DataProvider, options: ScanOptions) -> Self {
        Self { provider, options }
    }

    fn map_in_order<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.options.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

/// Friday scan: fetch, compute indicators and look for this week's setup.
pub fn run_setup_scan(
    ctx: &ScanContext<'_>,
    basket: &Basket,
    stats: &SuccessRateTable,
    as_of: NaiveDate,
) -> SetupScan {
    let start = as_of - Duration::days(i64::from(ctx.options.setup_lookback_days));
    let calculator = IndicatorCalculator::new();
    let detector = SetupDetector::new();

    info!(
        symbols = basket.len(),
        %start,
        end = %as_of,
        provider = ctx.provider.name(),
        "starting setup scan"
    );

    let outcomes = ctx.map_in_order(basket.entries(), |entry: &BasketEntry| {
        let outcome = match fetch_bars(ctx.provider, &entry.symbol, start, as_of) {
            Err(e) => {
                warn!(symbol = %entry.symbol, error = %e, "data unavailable");
                SetupOutcome::DataUnavailable {
                    reason: e.to_string(),
                }
            }
            Ok(bars) => {
                let series = calculator.compute(&bars);
                match detector.detect(&entry.symbol, &entry.name, &bars, &series) {
                    Detection::Found(setup) => {
                        let setup = setup.with_success_rate(stats.rate_for(&entry.name));
                        info!(
                            symbol = %setup.symbol,
                            decline_pct = setup.decline_pct,
                            gap_success_pct = setup.gap_success_pct,
                            "setup found"
                        );
                        SetupOutcome::SetupFound(setup)
                    }
                    Detection::NotFound(miss) => {
                        debug!(symbol = %entry.symbol, ?miss, "no setup");
                        SetupOutcome::NoSetup(miss)
                    }
                }
            }
        };
        SymbolOutcome {
            symbol: entry.symbol.clone(),
            display_name: entry.name.clone(),
            outcome,
        }
    });

    SetupScan { as_of, outcomes }
}

/// Monday scan: measure the gap for every stored setup and size the trades.
pub fn run_gap_scan(
    ctx: &ScanContext<'_>,
    batch: &SetupBatch,
    capital: Capital,
    synthesizer: &SignalSynthesizer,
    as_of: NaiveDate,
) -> GapScan {
    let start = as_of - Duration::days(i64::from(ctx.options.gap_lookback_days));
    let detector = GapDetector::default();

    info!(
        batch_id = %batch.batch_id,
        setups = batch.setups.len(),
        %start,
        end = %as_of,
        "starting gap scan"
    );

    let outcomes = ctx.map_in_order(&batch.setups, |setup: &SetupCandidate| {
        let outcome = match fetch_bars(ctx.provider, &setup.symbol, start, as_of) {
            Err(e) => {
                warn!(symbol = %setup.symbol, error = %e, "data unavailable");
                GapOutcome::DataUnavailable {
                    reason: e.to_string(),
                }
            }
            Ok(bars) => match detector.detect(&setup.symbol, &bars) {
                Detection::NotFound(miss) => {
                    debug!(symbol = %setup.symbol, ?miss, "no gap");
                    GapOutcome::NoGap(miss)
                }
                Detection::Found(gap) if gap.friday_date != setup.friday_date => {
                    warn!(
                        symbol = %setup.symbol,
                        setup_friday = %setup.friday_date,
                        gap_friday = %gap.friday_date,
                        "setup is from a different week"
                    );
                    GapOutcome::StaleSetup {
                        setup_friday: setup.friday_date,
                        gap_friday: gap.friday_date,
                    }
                }
                Detection::Found(gap) if !gap.is_actionable => GapOutcome::GapNotActionable(gap),
                Detection::Found(gap) => match synthesizer.synthesize(setup, &gap, capital) {
                    Ok(signal) => GapOutcome::Signal(signal),
                    Err(error) => GapOutcome::Skipped { gap, error },
                },
            },
        };
        SymbolOutcome {
            symbol: setup.symbol.clone(),
            display_name: setup.display_name.clone(),
            outcome,
        }
    });

    let scan = GapScan {
        batch_id: batch.batch_id.clone(),
        as_of,
        outcomes,
    };
    let counts = scan.counts();
    info!(
        signals = counts.signals,
        not_actionable = counts.not_actionable,
        skipped = counts.skipped,
        data_unavailable = counts.data_unavailable,
        "gap scan complete"
    );
    scan
}
