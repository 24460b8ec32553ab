//! Offline provider reading `<dir>/<SYMBOL>.csv`.
//!
//! Expected header: `date,open,high,low,close,volume` with ISO dates. Rows
//! outside the requested range are filtered out; a missing file is
//! `SymbolNotFound`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};

#[derive(Debug, Clone)]
pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_dir"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let csv_err = |e: csv::Error| DataError::Csv {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        };

        let mut reader = csv::Reader::from_path(&path).map_err(csv_err)?;
        let mut bars = Vec::new();
        for row in reader.deserialize::<RawBar>() {
            let bar = row.map_err(csv_err)?;
            if bar.date >= start && bar.date <= end {
                bars.push(bar);
            }
        }

        if bars.is_empty() {
            return Err(DataError::Empty {
                symbol: symbol.to_string(),
            });
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvDirectory,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}
