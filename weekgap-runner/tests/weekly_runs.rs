//! End-to-end Friday → Monday runs against an in-memory provider.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{Datelike, NaiveDate, TimeZone, Utc, Weekday};
use weekgap_core::data::{BasketEntry, DataError, DataProvider, DataSource, FetchResult, RawBar};
use weekgap_runner::{
    BatchStore, GapOutcome, Notification, NotificationSink, NotifyError, OutboxSink, ScanError,
    SetupOutcome, WeekgapConfig, Workflow,
};

// ── Fixtures ─────────────────────────────────────────────────────────

struct StaticProvider {
    bars: HashMap<String, Vec<RawBar>>,
}

impl DataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars: Vec<RawBar> = self
            .bars
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Static,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    fn subjects(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|n| n.subject.clone()).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn deliver(
        &self,
        notification: &Notification,
    ) -> Result<Option<std::path::PathBuf>, NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(None)
    }
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

const FRIDAY: (u32, u32) = (6, 14);
const MONDAY: (u32, u32) = (6, 17);

/// Weekday bars 2024-05-13..=2024-06-14 with the given Thursday high and
/// Friday (high, low, close), plus an optional Monday open.
fn week_bars(thu_high: f64, fri: (f64, f64, f64), monday_open: Option<f64>) -> Vec<RawBar> {
    let mut bars = Vec::new();
    let mut day = date(5, 13);
    while day <= date(FRIDAY.0, FRIDAY.1) {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            let (high, low, close) = match day.weekday() {
                Weekday::Thu if day == date(6, 13) => (thu_high, 104.0, 105.0),
                Weekday::Fri if day == date(6, 14) => fri,
                _ => (106.0, 104.0, 105.0),
            };
            bars.push(RawBar {
                date: day,
                open: 105.0,
                high,
                low,
                close,
                volume: 1_000,
            });
        }
        day = day.succ_opt().unwrap();
    }
    if let Some(open) = monday_open {
        bars.push(RawBar {
            date: date(MONDAY.0, MONDAY.1),
            open,
            high: open + 1.0,
            low: open - 1.5,
            close: open,
            volume: 1_200,
        });
    }
    bars
}

fn provider(monday_open: Option<f64>) -> StaticProvider {
    let mut bars = HashMap::new();
    bars.insert("A.NS".to_string(), week_bars(110.0, (108.0, 100.0, 104.0), monday_open));
    bars.insert("B.NS".to_string(), week_bars(110.0, (112.0, 100.0, 104.0), monday_open));
    StaticProvider { bars }
}

fn config(root: &Path, parallel: bool) -> WeekgapConfig {
    let mut config = WeekgapConfig::from_toml(
        r#"
[trading]
capital = 100000

[[basket]]
symbol = "A.NS"
name = "Alpha"

[[basket]]
symbol = "B.NS"
name = "Beta"

[[basket]]
symbol = "C.NS"
name = "Gamma"
"#,
    )
    .unwrap();
    config.scan.parallel = parallel;
    config.paths.store_dir = root.join("batches");
    config.paths.stats_csv = root.join("stats.csv");
    config.paths.outbox_dir = root.join("outbox");
    config.paths.signals_dir = root.join("signals");
    config
}

fn friday_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 14, 11, 0, 0).unwrap()
}

// ── Friday ───────────────────────────────────────────────────────────

#[test]
fn friday_run_persists_one_setup_with_success_rate() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path(), false);
    std::fs::write(
        &config.paths.stats_csv,
        "Symbol,Gap_Down_Success_Rate\nAlpha,96.0\nBeta,91.0\n",
    )
    .unwrap();
    let sink = RecordingSink::default();
    let data = provider(None);

    let summary = Workflow::new(&config, &data, &sink)
        .friday(friday_now(), date(FRIDAY.0, FRIDAY.1))
        .unwrap();

    assert_eq!(summary.setups, 1);
    assert_eq!(summary.data_unavailable, 1);
    assert_eq!(summary.week_ending, date(6, 14));

    let batch = BatchStore::new(&config.paths.store_dir).load_latest().unwrap();
    assert_eq!(batch.batch_id, summary.batch_id);
    assert_eq!(batch.setups.len(), 1);
    let setup = &batch.setups[0];
    assert_eq!(setup.symbol, "A.NS");
    assert_eq!(setup.display_name, "Alpha");
    assert_eq!(setup.gap_success_pct, 96.0);
    assert!((setup.decline_pct - (-1.818_181_818)).abs() < 1e-6);

    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Friday Alert: 1 Pattern Setups Found - 2024-06-14");
    assert_eq!(sent[0].attachments.len(), 1);
    assert!(sent[0].attachments[0].ends_with("setups.csv"));
}

#[test]
fn malformed_stats_table_does_not_stop_friday_run() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path(), false);
    std::fs::write(&config.paths.stats_csv, "Stock,Rate\nAlpha,96.0\n").unwrap();
    let sink = RecordingSink::default();

    let summary = Workflow::new(&config, &provider(None), &sink)
        .friday(friday_now(), date(FRIDAY.0, FRIDAY.1))
        .unwrap();

    assert_eq!(summary.setups, 1);
    let batch = BatchStore::new(&config.paths.store_dir).load_latest().unwrap();
    assert_eq!(batch.setups[0].symbol, "A.NS");
    assert_eq!(batch.setups[0].gap_success_pct, 0.0);
    assert_eq!(sink.subjects().len(), 1);
}

#[test]
fn friday_without_setups_still_saves_an_empty_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path(), false);
    let sink = RecordingSink::default();
    let data = StaticProvider {
        bars: HashMap::new(),
    };

    let summary = Workflow::new(&config, &data, &sink)
        .friday(friday_now(), date(FRIDAY.0, FRIDAY.1))
        .unwrap();
    assert_eq!(summary.setups, 0);
    assert_eq!(summary.data_unavailable, 3);
    assert!(sink.subjects()[0].starts_with("Friday Scanner: No Setups"));

    // Monday sees zero setups, which is not a missing watchlist.
    let monday = Workflow::new(&config, &data, &sink)
        .monday(None, date(MONDAY.0, MONDAY.1))
        .unwrap();
    assert_eq!(monday.counts.signals, 0);
    assert!(monday.signals_csv.is_none());
    assert!(sink.subjects()[1].starts_with("Monday Scanner: No Signals"));
}

// ── Monday ───────────────────────────────────────────────────────────

#[test]
fn monday_run_turns_gap_into_signal() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path(), false);
    let sink = RecordingSink::default();

    Workflow::new(&config, &provider(None), &sink)
        .friday(friday_now(), date(FRIDAY.0, FRIDAY.1))
        .unwrap();

    let summary = Workflow::new(&config, &provider(Some(102.0)), &sink)
        .monday(None, date(MONDAY.0, MONDAY.1))
        .unwrap();

    assert_eq!(summary.counts.signals, 1);
    let csv_path = summary.signals_csv.unwrap();
    assert!(csv_path.ends_with("signals_20240617.csv"));
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let row = csv.lines().nth(1).unwrap();
    assert!(row.starts_with("A.NS,Alpha,-1.92,0.0,102.00,100.00,108.00,166,"));

    let subjects = sink.subjects();
    assert_eq!(subjects[1], "TRADE ALERT: 1 Signals - Execute Today! - 2024-06-17");
}

#[test]
fn small_gap_is_not_actionable() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path(), false);
    let sink = RecordingSink::default();

    Workflow::new(&config, &provider(None), &sink)
        .friday(friday_now(), date(FRIDAY.0, FRIDAY.1))
        .unwrap();

    // 104 → 103.9 is about -0.1%
    let summary = Workflow::new(&config, &provider(Some(103.9)), &sink)
        .monday(None, date(MONDAY.0, MONDAY.1))
        .unwrap();
    assert_eq!(summary.counts.signals, 0);
    assert_eq!(summary.counts.not_actionable, 1);
}

#[test]
fn monday_without_any_batch_is_persistence_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path(), false);
    let sink = RecordingSink::default();

    let err = Workflow::new(&config, &provider(Some(102.0)), &sink)
        .monday(None, date(MONDAY.0, MONDAY.1))
        .unwrap_err();

    assert!(matches!(err, ScanError::PersistenceMissing(_)));
    let subjects = sink.subjects();
    assert_eq!(subjects.len(), 1);
    assert!(subjects[0].contains("No Watchlist"));
}

#[test]
fn unknown_explicit_batch_is_persistence_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path(), false);
    let sink = RecordingSink::default();

    let err = Workflow::new(&config, &provider(None), &sink)
        .monday(Some("setups_19990101_000000"), date(MONDAY.0, MONDAY.1))
        .unwrap_err();
    assert!(matches!(err, ScanError::PersistenceMissing(_)));
}

// ── Scan outcomes ────────────────────────────────────────────────────

#[test]
fn parallel_scan_matches_serial_order() {
    use weekgap_runner::{run_setup_scan, ScanContext, ScanOptions, SuccessRateTable};
    use weekgap_core::data::Basket;

    let basket = Basket::new(vec![
        BasketEntry::new("A.NS", "Alpha"),
        BasketEntry::new("B.NS", "Beta"),
        BasketEntry::new("C.NS", "Gamma"),
    ]);
    let data = provider(None);
    let stats = SuccessRateTable::empty();

    let scan = |parallel| {
        let ctx = ScanContext::new(
            &data,
            ScanOptions {
                parallel,
                ..ScanOptions::default()
            },
        );
        run_setup_scan(&ctx, &basket, &stats, date(FRIDAY.0, FRIDAY.1)).outcomes
    };

    let serial = scan(false);
    let parallel = scan(true);
    assert_eq!(serial, parallel);

    let symbols: Vec<_> = serial.iter().map(|o| o.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["A.NS", "B.NS", "C.NS"]);
    assert!(matches!(serial[0].outcome, SetupOutcome::SetupFound(_)));
    assert!(matches!(serial[1].outcome, SetupOutcome::NoSetup(_)));
    assert!(matches!(serial[2].outcome, SetupOutcome::DataUnavailable { .. }));
}

#[test]
fn degenerate_risk_is_skipped_not_fatal() {
    use weekgap_runner::{run_gap_scan, ScanContext, ScanOptions, SetupBatch};
    use weekgap_core::domain::{Capital, SetupCandidate};
    use weekgap_core::synth::{SignalError, SignalSynthesizer};

    // Stored Friday high equals Monday's open: zero stop distance.
    let setup = SetupCandidate {
        symbol: "A.NS".into(),
        display_name: "Alpha".into(),
        friday_date: date(6, 14),
        thursday_high: 110.0,
        friday_high: 102.0,
        friday_low: 100.0,
        friday_close: 104.0,
        decline_pct: SetupCandidate::decline_pct(110.0, 102.0),
        rsi_at_friday: None,
        below_sma20: false,
        volume_ratio: None,
        gap_success_pct: 0.0,
    };
    let batch = SetupBatch::new(friday_now(), date(6, 14), vec![setup]);
    let data = provider(Some(102.0));
    let ctx = ScanContext::new(&data, ScanOptions::default());

    let scan = run_gap_scan(
        &ctx,
        &batch,
        Capital::new(100_000.0).unwrap(),
        &SignalSynthesizer::default(),
        date(MONDAY.0, MONDAY.1),
    );
    match &scan.outcomes[0].outcome {
        GapOutcome::Skipped { error, .. } => {
            assert!(matches!(error, SignalError::DegenerateRisk { .. }));
        }
        other => panic!("expected skip, got {other:?}"),
    }
    let counts = scan.counts();
    assert_eq!(counts.skipped, 1);
    assert_eq!(counts.anomalies, 1);
    assert_eq!(counts.signals, 0);
}

#[test]
fn outbox_receives_friday_report() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path(), true);
    let sink = OutboxSink::new(&config.paths.outbox_dir, None);

    let summary = Workflow::new(&config, &provider(None), &sink)
        .friday(friday_now(), date(FRIDAY.0, FRIDAY.1))
        .unwrap();

    let dir = summary.delivered_to.unwrap();
    assert!(dir.starts_with(&config.paths.outbox_dir));
    assert!(dir.join("message.html").exists());
    assert!(dir.join("setups.csv").exists());
}
