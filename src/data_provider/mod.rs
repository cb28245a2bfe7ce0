pub mod csv_import;
pub mod snapshot;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::Result;
use crate::models::option::OptionChain;
use crate::models::price::DailySeries;

pub use snapshot::SnapshotStore;

/// Source of daily price history.
#[async_trait]
pub trait MarketDataProvider {
    /// Full daily history for `ticker`, or `TickerNotFound`.
    async fn fetch_daily_history(&self, ticker: &str) -> Result<DailySeries>;
}

/// Source of listed option expiries and chains.
#[async_trait]
pub trait OptionsChainProvider {
    /// Listed expiries, ascending.
    async fn list_expiries(&self, ticker: &str) -> Result<Vec<NaiveDate>>;

    async fn fetch_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<OptionChain>;
}

#[async_trait]
pub trait RiskFreeRateProvider {
    /// Annualised short-term bill yield in percent.
    async fn current_short_term_rate(&self) -> Result<f64>;
}
