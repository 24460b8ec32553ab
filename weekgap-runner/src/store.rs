//! Versioned setup-batch store.
//!
//! The Friday scan writes one batch per run:
//!
//! ```text
//! <store>/<batch_id>/setups.csv     ordered SetupCandidate records
//! <store>/<batch_id>/manifest.json  schema_version, batch_id, created_at,
//!                                   week_ending, record_count, content_hash
//! ```
//!
//! The manifest is written last (via rename), so a batch without a manifest is
//! incomplete and never loaded. Loading checks schema version, batch id,
//! record count and the BLAKE3 hash of `setups.csv`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use weekgap_core::domain::SetupCandidate;

/// Current batch schema version. Newer versions are rejected on load.
pub const SCHEMA_VERSION: u32 = 1;

const SETUPS_FILE: &str = "setups.csv";
const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("csv error in batch {batch_id}: {reason}")]
    Csv { batch_id: String, reason: String },

    #[error("invalid manifest for batch {batch_id}: {reason}")]
    Manifest { batch_id: String, reason: String },

    #[error("invalid batch id {0:?}")]
    InvalidBatchId(String),

    #[error("batch {batch_id} not found")]
    BatchMissing { batch_id: String },

    #[error("no setup batches in {}", dir.display())]
    NoBatches { dir: PathBuf },

    #[error("unsupported schema version {found} (max supported: {max})")]
    UnsupportedSchema { found: u32, max: u32 },

    #[error("manifest names batch {found}, expected {expected}")]
    BatchIdMismatch { expected: String, found: String },

    #[error("batch {batch_id} content hash mismatch")]
    HashMismatch { batch_id: String },

    #[error("batch {batch_id} has {found} records, manifest says {expected}")]
    RecordCountMismatch {
        batch_id: String,
        expected: usize,
        found: usize,
    },
}

impl StoreError {
    /// True when there is simply nothing to load, as opposed to a damaged batch.
    pub fn is_missing(&self) -> bool {
        matches!(self, StoreError::BatchMissing { .. } | StoreError::NoBatches { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchManifest {
    pub schema_version: u32,
    pub batch_id: String,
    pub created_at: DateTime<Utc>,
    /// Friday the setups were detected on.
    pub week_ending: NaiveDate,
    pub record_count: usize,
    /// BLAKE3 hex digest of `setups.csv`.
    pub content_hash: String,
}

/// One Friday run's setups, in basket order.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupBatch {
    pub batch_id: String,
    pub created_at: DateTime<Utc>,
    pub week_ending: NaiveDate,
    pub setups: Vec<SetupCandidate>,
}

impl SetupBatch {
    /// New batch with an id derived from the creation time.
    pub fn new(
        created_at: DateTime<Utc>,
        week_ending: NaiveDate,
        setups: Vec<SetupCandidate>,
    ) -> Self {
        Self {
            batch_id: format!("{BATCH_ID_PREFIX}{}", created_at.format(BATCH_ID_STAMP)),
            created_at,
            week_ending,
            setups,
        }
    }
}

/// Files of a saved batch.
#[derive(Debug, Clone)]
pub struct BatchPaths {
    pub dir: PathBuf,
    pub setups_csv: PathBuf,
    pub manifest: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BatchStore {
    root: PathBuf,
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

const BATCH_ID_PREFIX: &str = "setups_";
const BATCH_ID_STAMP: &str = "%Y%m%d_%H%M%S";

/// Batch ids are `setups_YYYYMMDD_HHMMSS` with a real date and time.
fn validate_batch_id(batch_id: &str) -> Result<(), StoreError> {
    let valid = batch_id.strip_prefix(BATCH_ID_PREFIX).is_some_and(|stamp| {
        stamp.len() == 15
            && stamp
                .char_indices()
                .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() })
            && NaiveDateTime::parse_from_str(stamp, BATCH_ID_STAMP).is_ok()
    });
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidBatchId(batch_id.to_string()))
    }
}

impl BatchStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn save(&self, batch: &SetupBatch) -> Result<BatchPaths, StoreError> {
        validate_batch_id(&batch.batch_id)?;
        let dir = self.root.join(&batch.batch_id);
        std::fs::create_dir_all(&dir).map_err(io_err(&dir))?;

        let csv_bytes = encode_setups(&batch.batch_id, &batch.setups)?;
        let setups_csv = dir.join(SETUPS_FILE);
        std::fs::write(&setups_csv, &csv_bytes).map_err(io_err(&setups_csv))?;

        let manifest = BatchManifest {
            schema_version: SCHEMA_VERSION,
            batch_id: batch.batch_id.clone(),
            created_at: batch.created_at,
            week_ending: batch.week_ending,
            record_count: batch.setups.len(),
            content_hash: blake3::hash(&csv_bytes).to_hex().to_string(),
        };
        let json = serde_json::to_string_pretty(&manifest).map_err(|e| StoreError::Manifest {
            batch_id: batch.batch_id.clone(),
            reason: e.to_string(),
        })?;

        let manifest_path = dir.join(MANIFEST_FILE);
        let tmp_path = dir.join(format!("{MANIFEST_FILE}.tmp"));
        std::fs::write(&tmp_path, json).map_err(io_err(&tmp_path))?;
        std::fs::rename(&tmp_path, &manifest_path).map_err(io_err(&manifest_path))?;

        info!(
            batch_id = %batch.batch_id,
            records = batch.setups.len(),
            dir = %dir.display(),
            "setup batch saved"
        );

        Ok(BatchPaths {
            dir,
            setups_csv,
            manifest: manifest_path,
        })
    }

    pub fn load(&self, batch_id: &str) -> Result<SetupBatch, StoreError> {
        validate_batch_id(batch_id)?;
        let dir = self.root.join(batch_id);
        let manifest = self.read_manifest(&dir, batch_id)?;

        if manifest.schema_version > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                found: manifest.schema_version,
                max: SCHEMA_VERSION,
            });
        }
        if manifest.batch_id != batch_id {
            return Err(StoreError::BatchIdMismatch {
                expected: batch_id.to_string(),
                found: manifest.batch_id,
            });
        }

        let setups_csv = dir.join(SETUPS_FILE);
        let csv_bytes = std::fs::read(&setups_csv).map_err(io_err(&setups_csv))?;
        if blake3::hash(&csv_bytes).to_hex().as_str() != manifest.content_hash {
            return Err(StoreError::HashMismatch {
                batch_id: batch_id.to_string(),
            });
        }

        let setups = decode_setups(batch_id, &csv_bytes)?;
        if setups.len() != manifest.record_count {
            return Err(StoreError::RecordCountMismatch {
                batch_id: batch_id.to_string(),
                expected: manifest.record_count,
                found: setups.len(),
            });
        }

        debug!(batch_id, records = setups.len(), "setup batch loaded");
        Ok(SetupBatch {
            batch_id: manifest.batch_id,
            created_at: manifest.created_at,
            week_ending: manifest.week_ending,
            setups,
        })
    }

    /// Load the batch with the newest `created_at`.
    pub fn load_latest(&self) -> Result<SetupBatch, StoreError> {
        let latest = self
            .list()?
            .into_iter()
            .next_back()
            .ok_or_else(|| StoreError::NoBatches {
                dir: self.root.clone(),
            })?;
        self.load(&latest.batch_id)
    }

    /// Complete batches, oldest first. Directories without a readable
    /// manifest are skipped.
    pub fn list(&self) -> Result<Vec<BatchManifest>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.root).map_err(io_err(&self.root))?;

        let mut manifests = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_err(&self.root))?;
            let path = entry.path();
            if !path.is_dir() || !path.join(MANIFEST_FILE).exists() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match self.read_manifest(&path, &name) {
                Ok(manifest) => manifests.push(manifest),
                Err(e) => warn!(dir = %path.display(), error = %e, "skipping unreadable batch"),
            }
        }
        manifests.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.batch_id.cmp(&b.batch_id))
        });
        Ok(manifests)
    }

    fn read_manifest(&self, dir: &Path, batch_id: &str) -> Result<BatchManifest, StoreError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Err(StoreError::BatchMissing {
                batch_id: batch_id.to_string(),
            });
        }
        let json = std::fs::read_to_string(&path).map_err(io_err(&path))?;
        serde_json::from_str(&json).map_err(|e| StoreError::Manifest {
            batch_id: batch_id.to_string(),
            reason: e.to_string(),
        })
    }
}

fn encode_setups(batch_id: &str, setups: &[SetupCandidate]) -> Result<Vec<u8>, StoreError> {
    let csv_err = |reason: String| StoreError::Csv {
        batch_id: batch_id.to_string(),
        reason,
    };
    // Header is written explicitly so an empty batch still has one.
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(vec![]);
    wtr.write_record(SETUP_COLUMNS).map_err(|e| csv_err(e.to_string()))?;
    for setup in setups {
        wtr.serialize(setup).map_err(|e| csv_err(e.to_string()))?;
    }
    wtr.into_inner().map_err(|e| csv_err(e.to_string()))
}

fn decode_setups(batch_id: &str, bytes: &[u8]) -> Result<Vec<SetupCandidate>, StoreError> {
    let mut reader = csv::Reader::from_reader(bytes);
    reader
        .deserialize::<SetupCandidate>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::Csv {
            batch_id: batch_id.to_string(),
            reason: e.to_string(),
        })
}

/// Column order of `setups.csv`; matches the field order of `SetupCandidate`.
const SETUP_COLUMNS: [&str; 12] = [
    "symbol",
    "display_name",
    "friday_date",
    "thursday_high",
    "friday_high",
    "friday_low",
    "friday_close",
    "decline_pct",
    "rsi_at_friday",
    "below_sma20",
    "volume_ratio",
    "gap_success_pct",
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn setup(symbol: &str, rsi: Option<f64>) -> SetupCandidate {
        SetupCandidate {
            symbol: symbol.into(),
            display_name: format!("{symbol} Ltd"),
            friday_date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
            thursday_high: 110.0,
            friday_high: 108.0,
            friday_low: 100.0,
            friday_close: 104.0,
            decline_pct: SetupCandidate::decline_pct(110.0, 108.0),
            rsi_at_friday: rsi,
            below_sma20: true,
            volume_ratio: Some(1.463_414_634_146_341_4),
            gap_success_pct: 91.25,
        }
    }

    fn batch(hour: u32, setups: Vec<SetupCandidate>) -> SetupBatch {
        SetupBatch::new(
            Utc.with_ymd_and_hms(2024, 6, 14, hour, 30, 0).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
            setups,
        )
    }

    #[test]
    fn round_trip_preserves_records() {
        let tmp = tempfile::tempdir().unwrap();
        let store = BatchStore::new(tmp.path());
        let original = batch(10, vec![setup("A.NS", Some(38.123_456_789)), setup("B.NS", None)]);

        let paths = store.save(&original).unwrap();
        assert!(paths.setups_csv.exists());
        assert!(paths.manifest.exists());

        let loaded = store.load(&original.batch_id).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn empty_batch_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = BatchStore::new(tmp.path());
        let original = batch(10, Vec::new());
        store.save(&original).unwrap();
        assert!(store.load(&original.batch_id).unwrap().setups.is_empty());
    }

    #[test]
    fn latest_is_newest_created_at() {
        let tmp = tempfile::tempdir().unwrap();
        let store = BatchStore::new(tmp.path());
        store.save(&batch(15, vec![setup("NEW.NS", None)])).unwrap();
        store.save(&batch(9, vec![setup("OLD.NS", None)])).unwrap();

        let latest = store.load_latest().unwrap();
        assert_eq!(latest.setups[0].symbol, "NEW.NS");
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn empty_store_has_no_batches() {
        let tmp = tempfile::tempdir().unwrap();
        let err = BatchStore::new(tmp.path().join("nothing")).load_latest().unwrap_err();
        assert!(matches!(err, StoreError::NoBatches { .. }));
        assert!(err.is_missing());
    }

    #[test]
    fn unknown_batch_is_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let err = BatchStore::new(tmp.path()).load("setups_20240101_000000").unwrap_err();
        assert!(matches!(err, StoreError::BatchMissing { .. }));
    }

    #[test]
    fn malformed_batch_ids_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = BatchStore::new(tmp.path());
        for id in [
            "../etc",
            "setups_copy",
            "setups_2024061_1030000",
            "setups_20241314_103000",
            "setups_20240614-103000",
            "setups_20240614_103000_extra",
            "batch_20240614_103000",
        ] {
            let err = store.load(id).unwrap_err();
            assert!(matches!(err, StoreError::InvalidBatchId(_)), "{id}");
            assert!(!err.is_missing(), "{id}");
        }
        assert!(validate_batch_id("setups_20240614_103000").is_ok());
    }

    #[test]
    fn tampered_csv_fails_hash_check() {
        let tmp = tempfile::tempdir().unwrap();
        let store = BatchStore::new(tmp.path());
        let original = batch(10, vec![setup("A.NS", None)]);
        let paths = store.save(&original).unwrap();

        let csv = std::fs::read_to_string(&paths.setups_csv).unwrap();
        std::fs::write(&paths.setups_csv, csv.replace("100", "99")).unwrap();

        assert!(matches!(
            store.load(&original.batch_id),
            Err(StoreError::HashMismatch { .. })
        ));
    }

    #[test]
    fn newer_schema_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = BatchStore::new(tmp.path());
        let original = batch(10, vec![setup("A.NS", None)]);
        let paths = store.save(&original).unwrap();

        let json = std::fs::read_to_string(&paths.manifest).unwrap();
        let bumped = json.replace("\"schema_version\": 1", "\"schema_version\": 99");
        std::fs::write(&paths.manifest, bumped).unwrap();

        assert!(matches!(
            store.load(&original.batch_id),
            Err(StoreError::UnsupportedSchema { found: 99, .. })
        ));
    }

    #[test]
    fn copied_batch_dir_fails_id_check() {
        let tmp = tempfile::tempdir().unwrap();
        let store = BatchStore::new(tmp.path());
        let original = batch(10, vec![setup("A.NS", None)]);
        let paths = store.save(&original).unwrap();

        let copy = tmp.path().join("setups_20240101_000000");
        std::fs::create_dir_all(&copy).unwrap();
        std::fs::copy(&paths.setups_csv, copy.join(SETUPS_FILE)).unwrap();
        std::fs::copy(&paths.manifest, copy.join(MANIFEST_FILE)).unwrap();

        assert!(matches!(
            store.load("setups_20240101_000000"),
            Err(StoreError::BatchIdMismatch { .. })
        ));
    }

    #[test]
    fn batch_without_manifest_is_not_listed() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("setups_partial")).unwrap();
        std::fs::write(tmp.path().join("setups_partial").join(SETUPS_FILE), "x").unwrap();
        assert!(BatchStore::new(tmp.path()).list().unwrap().is_empty());
    }
}
