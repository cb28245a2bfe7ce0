use chrono::{NaiveDate, Utc};
use log::{error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::{Id, JoinSet};

use crate::analysis::position::size_position;
use crate::analysis::{greeks, strike, CspEngine, HistoryAnalysis};
use crate::config::Config;
use crate::data_provider::{
    MarketDataProvider, OptionsChainProvider, RiskFreeRateProvider, SnapshotStore,
};
use crate::errors::{Result, ScreenerError};
use crate::models::option::MatchedPut;
use crate::models::price::DailySeries;
use crate::models::report::{PricedPut, PutLeg, ScreeningReport};
use crate::pricing::{BlackScholesModel, PricingModel};

/// Reports and per-ticker failures of one screening run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub reports: Vec<ScreeningReport>,
    pub failures: Vec<(String, ScreenerError)>,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty() && self.failures.is_empty()
    }
}

/// Screens securities against the configured providers, one task per ticker.
#[derive(Clone)]
pub struct ScreeningService {
    config: Arc<Config>,
    engine: CspEngine,
    market: Arc<dyn MarketDataProvider + Send + Sync>,
    chains: Arc<dyn OptionsChainProvider + Send + Sync>,
    rates: Arc<dyn RiskFreeRateProvider + Send + Sync>,
    pricing: Arc<dyn PricingModel + Send + Sync>,
}

impl ScreeningService {
    pub fn new(
        config: Arc<Config>,
        market: Arc<dyn MarketDataProvider + Send + Sync>,
        chains: Arc<dyn OptionsChainProvider + Send + Sync>,
        rates: Arc<dyn RiskFreeRateProvider + Send + Sync>,
        pricing: Arc<dyn PricingModel + Send + Sync>,
    ) -> Self {
        Self {
            engine: CspEngine::new(config.clone()),
            config,
            market,
            chains,
            rates,
            pricing,
        }
    }

    /// Every provider backed by the snapshot directory in `config.data_dir`, priced with Black-Scholes.
    pub fn from_snapshot_store(config: Arc<Config>) -> Result<Self> {
        let store = Arc::new(SnapshotStore::new(&config.data_dir));
        let pricing = Arc::new(BlackScholesModel::new()?);
        Ok(Self::new(config, store.clone(), store.clone(), store, pricing))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Configured evaluation date, or today in New York.
    pub fn evaluation_date(&self) -> NaiveDate {
        self.config.evaluation_date.unwrap_or_else(|| {
            Utc::now()
                .with_timezone(&chrono_tz::America::New_York)
                .date_naive()
        })
    }

    pub async fn screen_ticker(&self, ticker: &str) -> Result<ScreeningReport> {
        info!("Screening {}", ticker);
        let daily = self.market.fetch_daily_history(ticker).await?;
        let analysis = self.engine.analyze_history(&daily)?;

        let put = match self.price_put(&daily, &analysis).await {
            Ok(priced) => PutLeg::Priced(priced),
            Err(e @ ScreenerError::NoEligibleExpiry { .. }) => {
                warn!("{}: {}, option fields left empty", daily.ticker(), e);
                PutLeg::Unavailable {
                    reason: e.to_string(),
                }
            }
            Err(e) => return Err(e),
        };

        Ok(ScreeningReport::new(
            daily.ticker(),
            self.config.csp_safety_pct,
            analysis,
            put,
        ))
    }

    async fn price_put(&self, daily: &DailySeries, analysis: &HistoryAnalysis) -> Result<PricedPut> {
        let ticker = daily.ticker();
        let today = self.evaluation_date();

        let expiries = self.chains.list_expiries(ticker).await?;
        let expiry = strike::select_expiry(&expiries, today, self.config.min_expiry_days)?;
        let chain = self.chains.fetch_chain(ticker, expiry).await?;

        let quote = strike::match_strike(analysis.target_strike, &chain)?.clone();
        let max_pain = strike::max_pain(&chain)?;
        let matched = MatchedPut {
            days_to_expiry: (expiry - today).num_days(),
            expiry,
            quote,
        };

        let rate_pct = self.rates.current_short_term_rate().await?;
        let greeks = greeks::put_greeks(self.pricing.as_ref(), daily.last().close, &matched, rate_pct)?;
        let position = size_position(
            self.config.cash_on_hand,
            matched.quote.strike,
            matched.quote.last_price,
        );

        info!(
            "{}: put {} exp {} ({} days), delta {}, {} contracts",
            ticker,
            matched.quote.strike,
            matched.expiry,
            matched.days_to_expiry,
            greeks.delta,
            position.max_contracts
        );

        Ok(PricedPut {
            matched,
            greeks,
            max_pain,
            position,
        })
    }

    /// Screen every ticker concurrently. A failing ticker is recorded and the rest continue.
    pub async fn screen_all(&self, tickers: &[String]) -> BatchOutcome {
        let mut tasks = JoinSet::new();
        let mut spawned: HashMap<Id, (usize, String)> = HashMap::new();
        for (index, ticker) in tickers.iter().enumerate() {
            let service = self.clone();
            let task_ticker = ticker.clone();
            let handle = tasks.spawn(async move { service.screen_ticker(&task_ticker).await });
            spawned.insert(handle.id(), (index, ticker.clone()));
        }

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, result) = match joined {
                Ok((id, result)) => (id, result),
                Err(e) => {
                    let id = e.id();
                    (id, Err(ScreenerError::TaskFailed(e.to_string())))
                }
            };
            let Some((index, ticker)) = spawned.remove(&id) else {
                error!("Screening task {} finished without a ticker", id);
                continue;
            };

            match result {
                Ok(report) => reports.push((index, report)),
                Err(e) => {
                    warn!("Skipping {}: [{}] {}", ticker, e.kind(), e);
                    failures.push((index, ticker, e));
                }
            }
        }

        // completion order is arbitrary; keep the caller's order
        reports.sort_by_key(|(index, _)| *index);
        failures.sort_by_key(|(index, _, _)| *index);

        info!(
            "Screened {} tickers: {} reports, {} failures",
            tickers.len(),
            reports.len(),
            failures.len()
        );

        BatchOutcome {
            reports: reports.into_iter().map(|(_, r)| r).collect(),
            failures: failures.into_iter().map(|(_, t, e)| (t, e)).collect(),
        }
    }
}
