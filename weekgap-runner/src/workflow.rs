//! Friday and Monday runs end to end.
//!
//! Friday: scan the basket, persist the setup batch (even when empty), render
//! the watchlist and deliver it with `setups.csv` attached.
//!
//! Monday: load the batch (explicit id or newest), scan gaps, write the signals
//! CSV and deliver the report. No batch at all is `PersistenceMissing`, which
//! still produces a "missing watchlist" notification before failing.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use weekgap_core::data::DataProvider;
use weekgap_core::synth::SignalSynthesizer;

use crate::config::{ConfigError, WeekgapConfig};
use crate::notify::{NotificationSink, NotifyError};
use crate::reporting::{self, Notification};
use crate::scan::{self, GapCounts, ScanContext, ScanOptions};
use crate::stats::SuccessRateTable;
use crate::store::{BatchStore, SetupBatch, StoreError};

/// Batch-level failures. Per-symbol problems never surface here.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No setup batch to pair Monday's gaps with. Distinct from a batch with zero setups.
    #[error("no Friday watchlist: {0}")]
    PersistenceMissing(StoreError),

    #[error(transparent)]
    Store(StoreError),

    #[error("failed to export signals: {0}")]
    Export(anyhow::Error),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl From<StoreError> for ScanError {
    fn from(e: StoreError) -> Self {
        if e.is_missing() {
            ScanError::PersistenceMissing(e)
        } else {
            ScanError::Store(e)
        }
    }
}

#[derive(Debug, Clone)]
pub struct FridaySummary {
    pub batch_id: String,
    pub week_ending: NaiveDate,
    pub setups: usize,
    pub data_unavailable: usize,
    pub batch_dir: PathBuf,
    pub delivered_to: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct MondaySummary {
    pub batch_id: String,
    pub counts: GapCounts,
    pub signals_csv: Option<PathBuf>,
    pub delivered_to: Option<PathBuf>,
}

/// One configured run: config, data source and delivery target.
pub struct Workflow<'a> {
    config: &'a WeekgapConfig,
    provider: &'a dyn DataProvider,
    sink: &'a dyn NotificationSink,
}

impl<'a> Workflow<'a> {
    pub fn new(
        config: &'a WeekgapConfig,
        provider: &'a dyn DataProvider,
        sink: &'a dyn NotificationSink,
    ) -> Self {
        Self {
            config,
            provider,
            sink,
        }
    }

    fn options(&self) -> ScanOptions {
        ScanOptions {
            setup_lookback_days: self.config.data.setup_lookback_days,
            gap_lookback_days: self.config.data.gap_lookback_days,
            parallel: self.config.scan.parallel,
        }
    }

    fn store(&self) -> BatchStore {
        BatchStore::new(&self.config.paths.store_dir)
    }

    /// Friday run. `now` stamps the batch; `as_of` is the last day of data.
    pub fn friday(&self, now: DateTime<Utc>, as_of: NaiveDate) -> Result<FridaySummary, ScanError> {
        let stats = SuccessRateTable::load_or_empty(&self.config.paths.stats_csv);
        let basket = self.config.basket();
        let ctx = ScanContext::new(self.provider, self.options());

        let scan = scan::run_setup_scan(&ctx, &basket, &stats, as_of);
        let watchlist = scan.watchlist();
        let week_ending = scan::week_ending(as_of);
        if week_ending != as_of {
            warn!(%as_of, %week_ending, "Friday scan run on a non-Friday");
        }

        let batch = SetupBatch::new(now, week_ending, watchlist);
        let paths = self.store().save(&batch)?;

        let mut notification = reporting::friday_report(as_of, &batch.batch_id, &batch.setups);
        if !batch.setups.is_empty() {
            notification.attachments.push(paths.setups_csv.clone());
        }
        let delivered_to = self.sink.deliver(&notification)?;

        info!(
            batch_id = %batch.batch_id,
            setups = batch.setups.len(),
            data_unavailable = scan.data_unavailable(),
            "Friday run complete"
        );

        Ok(FridaySummary {
            batch_id: batch.batch_id,
            week_ending,
            setups: batch.setups.len(),
            data_unavailable: scan.data_unavailable(),
            batch_dir: paths.dir,
            delivered_to,
        })
    }

    /// Monday run against `batch_id`, or the newest batch when `None`.
    pub fn monday(
        &self,
        batch_id: Option<&str>,
        as_of: NaiveDate,
    ) -> Result<MondaySummary, ScanError> {
        let capital = self.config.capital()?;
        let store = self.store();
        let loaded = match batch_id {
            Some(id) => store.load(id),
            None => store.load_latest(),
        };
        let batch = match loaded {
            Ok(batch) => batch,
            Err(e) if e.is_missing() => {
                error!(error = %e, "no Friday watchlist");
                self.sink
                    .deliver(&reporting::missing_watchlist_report(as_of, &e.to_string()))?;
                return Err(ScanError::PersistenceMissing(e));
            }
            Err(e) => return Err(ScanError::Store(e)),
        };

        let ctx = ScanContext::new(self.provider, self.options());
        let scan = scan::run_gap_scan(&ctx, &batch, capital, &SignalSynthesizer::default(), as_of);
        let signals = scan.signals();
        let counts = scan.counts();

        let signals_csv = if signals.is_empty() {
            None
        } else {
            Some(
                reporting::save_signals_csv(&signals, &self.config.paths.signals_dir, as_of)
                    .map_err(ScanError::Export)?,
            )
        };

        let mut notification: Notification =
            reporting::monday_report(as_of, &signals, capital, &counts);
        notification.attachments.extend(signals_csv.iter().cloned());
        let delivered_to = self.sink.deliver(&notification)?;

        info!(batch_id = %batch.batch_id, signals = counts.signals, "Monday run complete");

        Ok(MondaySummary {
            batch_id: batch.batch_id,
            counts,
            signals_csv,
            delivered_to,
        })
    }
}
