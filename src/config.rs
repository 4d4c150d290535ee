//! Configuration file handling
//!
//! Settings live in a TOML file found at `--config`, else `$PAYDAY_CONFIG`,
//! else `<config home>/payday/config.toml`. Every key is optional.
//!
//! ```toml
//! portfolio = "~/.payday/portfolio.csv"
//!
//! [currency]
//! base = "USD"
//! quote = "KRW"
//!
//! [markets]
//! local = "US"
//! destination = "KR"
//!
//! [holidays]
//! KR = ["2024-10-01"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calendar::{BusinessCalendar, Market};
use crate::error::PaydayError;
use crate::pricing::CurrencyPair;

pub const CONFIG_ENV: &str = "PAYDAY_CONFIG";
pub const PORTFOLIO_ENV: &str = "PAYDAY_PORTFOLIO";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Portfolio file; `.csv` or `.xlsx`
    pub portfolio: Option<PathBuf>,
    pub currency: CurrencyConfig,
    pub markets: MarketsConfig,
    /// Extra closures per market on top of the built-in rules
    pub holidays: BTreeMap<Market, Vec<NaiveDate>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurrencyConfig {
    pub base: String,
    pub quote: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        let pair = CurrencyPair::default();
        Self {
            base: pair.base,
            quote: pair.quote,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketsConfig {
    pub local: Market,
    pub destination: Market,
}

impl Default for MarketsConfig {
    fn default() -> Self {
        Self {
            local: Market::Us,
            destination: Market::Kr,
        }
    }
}

impl Config {
    /// Default config file location (`<config home>/payday/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dir_spec::config_home().map(|dir| dir.join("payday").join("config.toml"))
    }

    /// Load the configuration.
    ///
    /// An explicitly given file must exist; the environment and default
    /// locations fall back to defaults when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (Some(path.to_path_buf()), true),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(path) => (Some(PathBuf::from(path)), true),
                None => (Self::default_path(), false),
            },
        };

        let mut config = match path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {:?}", path);
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {:?}", path))?;
                Self::from_toml_str(&text)
                    .with_context(|| format!("Invalid config file {:?}", path))?
            }
            Some(path) if required => {
                return Err(PaydayError::Config(format!("config file {:?} not found", path)).into());
            }
            _ => {
                debug!("No config file, using defaults");
                Config::default()
            }
        };

        if let Ok(portfolio) = std::env::var(PORTFOLIO_ENV) {
            debug!("{} overrides portfolio path", PORTFOLIO_ENV);
            config.portfolio = Some(PathBuf::from(portfolio));
        }

        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, PaydayError> {
        toml::from_str(text).map_err(|e| PaydayError::Config(e.to_string()))
    }

    /// Portfolio file, defaulting to `~/.payday/portfolio.csv`
    pub fn portfolio_path(&self) -> Result<PathBuf> {
        match &self.portfolio {
            Some(path) => expand_home(path),
            None => Ok(home_dir()?.join(".payday").join("portfolio.csv")),
        }
    }

    pub fn currency_pair(&self) -> CurrencyPair {
        CurrencyPair::new(&self.currency.base, &self.currency.quote)
    }

    /// Business calendar of `market` including configured extra holidays
    pub fn calendar(&self, market: Market) -> BusinessCalendar {
        let extra = self.holidays.get(&market).cloned().unwrap_or_default();
        BusinessCalendar::for_market(market).with_extra_holidays(extra)
    }

    pub fn local_calendar(&self) -> BusinessCalendar {
        self.calendar(self.markets.local)
    }

    pub fn destination_calendar(&self) -> BusinessCalendar {
        self.calendar(self.markets.destination)
    }
}

fn home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home))
}

fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(home_dir()?.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}
