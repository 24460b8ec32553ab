//! Historical gap-down success rates, keyed by display name.
//!
//! Source is a CSV with at least the columns `Symbol` and
//! `Gap_Down_Success_Rate`; other columns are ignored. The table is optional:
//! a missing or unreadable file means the scan runs with every rate at zero.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("failed to read success-rate table {path}: {reason}")]
    Read { path: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct StatsRow {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Gap_Down_Success_Rate", deserialize_with = "csv::invalid_option")]
    rate: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SuccessRateTable {
    rates: HashMap<String, f64>,
}

impl SuccessRateTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            rates: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Load the table. A missing file yields an empty table and a warning.
    pub fn load(path: &Path) -> Result<Self, StatsError> {
        if !path.exists() {
            warn!(path = %path.display(), "success-rate table not found, rates default to 0");
            return Ok(Self::empty());
        }
        let read_err = |e: csv::Error| StatsError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
        let mut rates = HashMap::new();
        for row in reader.deserialize::<StatsRow>() {
            let row = row.map_err(read_err)?;
            match row.rate.filter(|r| r.is_finite()) {
                Some(rate) => {
                    rates.insert(row.symbol, rate);
                }
                None => debug!(symbol = %row.symbol, "no usable success rate"),
            }
        }
        debug!(entries = rates.len(), "success-rate table loaded");
        Ok(Self { rates })
    }

    /// Load the table, or fall back to an empty one with a warning when the
    /// file cannot be read or parsed.
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring success-rate table, rates default to 0");
            Self::empty()
        })
    }

    /// Success rate in percent; 0 when the name is not in the table.
    pub fn rate_for(&self, display_name: &str) -> f64 {
        self.rates.get(display_name).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
