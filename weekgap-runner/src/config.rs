//! TOML configuration for the weekly scans.
//!
//! Every section except `[trading]` has defaults. Capital is validated into a
//! `Capital` before any scan starts; an empty `[[basket]]` list falls back to
//! the built-in NIFTY 50 basket.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use weekgap_core::data::{Basket, BasketEntry, ProviderOptions};
use weekgap_core::domain::{Capital, CapitalError};
use weekgap_core::indicators::MIN_HISTORY;

pub const DEFAULT_CONFIG_FILE: &str = "weekgap.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid capital: {0}")]
    Capital(#[from] CapitalError),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("refusing to overwrite existing config {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekgapConfig {
    pub trading: TradingConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub basket: Vec<BasketEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradingConfig {
    /// Raw amount; see `WeekgapConfig::capital` for the validated value.
    pub capital: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Calendar days fetched for the Friday scan. Must cover `MIN_HISTORY` trading days.
    pub setup_lookback_days: u32,
    /// Calendar days fetched for the Monday scan.
    pub gap_lookback_days: u32,
    pub fetch_timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            setup_lookback_days: 31,
            gap_lookback_days: 7,
            fetch_timeout_secs: 20,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub store_dir: PathBuf,
    pub stats_csv: PathBuf,
    pub outbox_dir: PathBuf,
    pub signals_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store_dir: "batches".into(),
            stats_csv: "nifty50_summary_stats.csv".into(),
            outbox_dir: "outbox".into(),
            signals_dir: "signals".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotifyConfig {
    pub recipient: Option<String>,
}

impl WeekgapConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capital()?;
        // Five weekdays per seven calendar days, before holidays.
        let min_days = (MIN_HISTORY as u32 * 7).div_ceil(5);
        if self.data.setup_lookback_days < min_days {
            return Err(ConfigError::Invalid(format!(
                "data.setup_lookback_days must be at least {min_days} \
                 to cover {MIN_HISTORY} trading days"
            )));
        }
        if self.data.gap_lookback_days < 4 {
            return Err(ConfigError::Invalid(
                "data.gap_lookback_days must be at least 4 to span Friday to Monday".into(),
            ));
        }
        if self.data.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("data.fetch_timeout_secs must be positive".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for entry in &self.basket {
            if entry.symbol.trim().is_empty() {
                return Err(ConfigError::Invalid("basket entry with empty symbol".into()));
            }
            if !seen.insert(entry.symbol.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate basket symbol {}",
                    entry.symbol
                )));
            }
        }
        Ok(())
    }

    pub fn capital(&self) -> Result<Capital, ConfigError> {
        Ok(Capital::new(self.trading.capital)?)
    }

    pub fn basket(&self) -> Basket {
        if self.basket.is_empty() {
            Basket::nifty50()
        } else {
            Basket::new(self.basket.clone())
        }
    }

    pub fn provider_options(&self) -> ProviderOptions {
        ProviderOptions {
            timeout: Duration::from_secs(self.data.fetch_timeout_secs),
            max_retries: self.data.max_retries,
        }
    }
}

/// Commented sample written by `weekgap init-config`.
pub fn sample_toml() -> &'static str {
    r#"# weekgap configuration

[trading]
# Account capital; 1% of it is risked per trade.
capital = 100000.0

[data]
setup_lookback_days = 31
gap_lookback_days = 7
fetch_timeout_secs = 20
max_retries = 2

[scan]
parallel = false

[paths]
store_dir = "batches"
stats_csv = "nifty50_summary_stats.csv"
outbox_dir = "outbox"
signals_dir = "signals"

[notify]
# recipient = "trader@example.com"

# Leave out [[basket]] entirely to scan the built-in NIFTY 50 basket.
# [[basket]]
# symbol = "RELIANCE.NS"
# name = "Reliance"
"#
}

/// Write the sample config, refusing to clobber an existing file.
pub fn write_sample(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    std::fs::write(path, sample_toml()).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_parses_with_defaults() {
        let config = WeekgapConfig::from_toml(sample_toml()).unwrap();
        assert_eq!(config.capital().unwrap().amount(), 100_000.0);
        assert_eq!(config.data, DataConfig::default());
        assert_eq!(config.paths, PathsConfig::default());
        assert!(!config.scan.parallel);
        assert_eq!(config.basket().len(), Basket::nifty50().len());
    }

    #[test]
    fn minimal_config_only_needs_capital() {
        let config = WeekgapConfig::from_toml("[trading]\ncapital = 50000\n").unwrap();
        assert_eq!(config.trading.capital, 50_000.0);
        assert_eq!(config.provider_options().timeout, Duration::from_secs(20));
    }

    #[test]
    fn missing_trading_section_is_parse_error() {
        assert!(matches!(
            WeekgapConfig::from_toml("[scan]\nparallel = true\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn non_positive_capital_is_rejected() {
        for capital in ["0", "-5000.0"] {
            let toml = format!("[trading]\ncapital = {capital}\n");
            assert!(matches!(
                WeekgapConfig::from_toml(&toml),
                Err(ConfigError::Capital(_))
            ));
        }
    }

    #[test]
    fn custom_basket_replaces_default() {
        let toml = r#"
[trading]
capital = 100000

[[basket]]
symbol = "A.NS"
name = "Alpha"

[[basket]]
symbol = "B.NS"
name = "Beta"
"#;
        let basket = WeekgapConfig::from_toml(toml).unwrap().basket();
        assert_eq!(basket.len(), 2);
        assert_eq!(basket.display_name("B.NS"), Some("Beta"));
    }

    #[test]
    fn duplicate_basket_symbol_is_rejected() {
        let toml = r#"
[trading]
capital = 100000

[[basket]]
symbol = "A.NS"
name = "Alpha"

[[basket]]
symbol = "A.NS"
name = "Again"
"#;
        assert!(matches!(
            WeekgapConfig::from_toml(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn short_setup_lookback_is_rejected() {
        let toml = "[trading]\ncapital = 1000\n[data]\nsetup_lookback_days = 10\n";
        assert!(matches!(
            WeekgapConfig::from_toml(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn write_sample_refuses_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        write_sample(&path).unwrap();
        assert!(WeekgapConfig::load(&path).is_ok());
        assert!(matches!(
            write_sample(&path),
            Err(ConfigError::AlreadyExists(_))
        ));
    }
}
