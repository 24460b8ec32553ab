//! weekgap runner — weekly scan orchestration.
//!
//! This crate builds on `weekgap-core` to provide:
//! - TOML configuration with a validated capital and basket
//! - Historical success-rate table
//! - Versioned setup-batch store (Friday → Monday hand-off)
//! - Friday setup scan and Monday gap scan, serial or on rayon
//! - HTML reports, signals CSV export and notification sinks

pub mod config;
pub mod notify;
pub mod reporting;
pub mod scan;
pub mod stats;
pub mod store;
pub mod workflow;

pub use config::{ConfigError, WeekgapConfig};
pub use notify::{LogSink, MultiSink, NotificationSink, NotifyError, OutboxSink};
pub use reporting::{Notification, Priority};
pub use scan::{
    run_gap_scan, run_setup_scan, GapCounts, GapOutcome, GapScan, ScanContext, ScanOptions,
    SetupOutcome, SetupScan, SymbolOutcome,
};
pub use stats::{StatsError, SuccessRateTable};
pub use store::{BatchManifest, BatchStore, SetupBatch, StoreError, SCHEMA_VERSION};
pub use workflow::{FridaySummary, MondaySummary, ScanError, Workflow};
