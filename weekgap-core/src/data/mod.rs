//! Market data: providers, canonicalization, and the symbol basket.

pub mod basket;
pub mod canonicalize;
pub mod circuit_breaker;
pub mod csv_dir;
pub mod provider;
pub mod yahoo;

pub use basket::{Basket, BasketEntry};
pub use canonicalize::canonicalize;
pub use circuit_breaker::CircuitBreaker;
pub use csv_dir::CsvDirProvider;
pub use provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
pub use yahoo::{ProviderOptions, YahooProvider};

use chrono::NaiveDate;

use crate::domain::Bar;

/// Fetch and canonicalize one symbol. A series that canonicalizes to nothing
/// is reported as `DataError::Empty`.
pub fn fetch_bars(
    provider: &dyn DataProvider,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Bar>, DataError> {
    let result = provider.fetch(symbol, start, end)?;
    let bars = canonicalize(result.bars);
    if bars.is_empty() {
        return Err(DataError::Empty {
            symbol: symbol.to_string(),
        });
    }
    Ok(bars)
}
