use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{MarketDataProvider, OptionsChainProvider, RiskFreeRateProvider};
use crate::errors::{Result, ScreenerError};
use crate::models::option::{OptionChain, OptionQuote};
use crate::models::price::DailySeries;
use crate::util::arrow_utils;

const DAILY_SUFFIX: &str = "_daily.arrow";
const OPTIONS_SUFFIX: &str = "_options.json";
const RATES_FILE: &str = "rates.json";

/// Options snapshot for one ticker as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsSnapshot {
    pub expiries: Vec<NaiveDate>,
    #[serde(default)]
    pub chains: Vec<ChainSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub expiry: NaiveDate,
    #[serde(default)]
    pub puts: Vec<OptionQuote>,
    #[serde(default)]
    pub calls: Vec<OptionQuote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesSnapshot {
    pub short_term_rate_pct: f64,
}

/// Local directory of previously captured market data:
/// `<TICKER>_daily.arrow`, `<TICKER>_options.json` and `rates.json`.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn daily_path(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{}{}", ticker.to_uppercase(), DAILY_SUFFIX))
    }

    pub fn options_path(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{}{}", ticker.to_uppercase(), OPTIONS_SUFFIX))
    }

    pub fn rates_path(&self) -> PathBuf {
        self.data_dir.join(RATES_FILE)
    }

    pub fn save_daily(&self, series: &DailySeries) -> Result<PathBuf> {
        let path = self.daily_path(series.ticker());
        arrow_utils::save_daily_series_to_arrow(series, &path)?;
        Ok(path)
    }

    pub fn save_options(&self, ticker: &str, snapshot: &OptionsSnapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.options_path(ticker);
        fs::write(&path, serde_json::to_vec_pretty(snapshot)?)?;
        info!("Saved {} expiries for {} to {}", snapshot.expiries.len(), ticker, path.display());
        Ok(path)
    }

    pub fn save_rate(&self, rate_pct: f64) -> Result<PathBuf> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.rates_path();
        let snapshot = RatesSnapshot { short_term_rate_pct: rate_pct };
        fs::write(&path, serde_json::to_vec_pretty(&snapshot)?)?;
        Ok(path)
    }

    fn load_options(&self, ticker: &str) -> Result<OptionsSnapshot> {
        let path = self.options_path(ticker);
        let raw = fs::read(&path).map_err(|e| {
            ScreenerError::ProviderUnavailable(format!("options snapshot {}: {}", path.display(), e))
        })?;
        serde_json::from_slice(&raw).map_err(|e| {
            ScreenerError::ProviderUnavailable(format!("options snapshot {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl MarketDataProvider for SnapshotStore {
    async fn fetch_daily_history(&self, ticker: &str) -> Result<DailySeries> {
        let path = self.daily_path(ticker);
        if !path.exists() {
            return Err(ScreenerError::TickerNotFound(ticker.to_string()));
        }

        info!("Loading daily history for {} from {}", ticker, path.display());
        arrow_utils::read_daily_series_from_arrow(&path, ticker).map_err(|e| match e {
            data_err @ (ScreenerError::InsufficientData(_) | ScreenerError::DataError(_)) => data_err,
            other => ScreenerError::ProviderUnavailable(format!("{}: {}", path.display(), other)),
        })
    }
}

#[async_trait]
impl OptionsChainProvider for SnapshotStore {
    async fn list_expiries(&self, ticker: &str) -> Result<Vec<NaiveDate>> {
        let mut expiries = self.load_options(ticker)?.expiries;
        expiries.sort();
        expiries.dedup();
        debug!("{} listed expiries for {}", expiries.len(), ticker);
        Ok(expiries)
    }

    async fn fetch_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<OptionChain> {
        let snapshot = self.load_options(ticker)?;
        // a listed expiry without captured quotes is an empty chain
        let chain = snapshot
            .chains
            .into_iter()
            .find(|c| c.expiry == expiry)
            .unwrap_or(ChainSnapshot {
                expiry,
                puts: Vec::new(),
                calls: Vec::new(),
            });
        Ok(OptionChain::new(chain.expiry, chain.puts, chain.calls))
    }
}

#[async_trait]
impl RiskFreeRateProvider for SnapshotStore {
    async fn current_short_term_rate(&self) -> Result<f64> {
        let path = self.rates_path();
        let raw = fs::read(&path).map_err(|e| {
            ScreenerError::ProviderUnavailable(format!("rates snapshot {}: {}", path.display(), e))
        })?;
        let rates: RatesSnapshot = serde_json::from_slice(&raw).map_err(|e| {
            ScreenerError::ProviderUnavailable(format!("rates snapshot {}: {}", path.display(), e))
        })?;
        Ok(rates.short_term_rate_pct)
    }
}
