use chrono::{NaiveDate, Weekday};
use log::warn;
use std::env;
use std::path::PathBuf;

use crate::errors::{Result, ScreenerError};

/// How a weekly return is compared against a candidate threshold during the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdComparison {
    /// Count weeks with a return strictly below the threshold.
    Strict,
    /// Count weeks with a return at or below the threshold.
    Inclusive,
}

impl ThresholdComparison {
    pub fn breaches(self, weekly_return_pct: f64, threshold_pct: f64) -> bool {
        match self {
            ThresholdComparison::Strict => weekly_return_pct < threshold_pct,
            ThresholdComparison::Inclusive => weekly_return_pct <= threshold_pct,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub tickers: Vec<String>,
    pub csp_safety_pct: f64,
    pub cash_on_hand: f64,
    pub min_expiry_days: i64,
    pub week_end: Weekday,
    pub threshold_comparison: ThresholdComparison,
    pub data_dir: PathBuf,
    pub results_dir: PathBuf,
    /// Fixed evaluation date; `None` means today in the market's timezone.
    pub evaluation_date: Option<NaiveDate>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            tickers: vec!["AAPL", "AMZN", "GOOG", "META", "SPY"]
                .into_iter()
                .map(String::from)
                .collect(),
            csp_safety_pct: 10.0,
            cash_on_hand: 10_000.0,
            min_expiry_days: 7,
            week_end: Weekday::Sun,
            threshold_comparison: ThresholdComparison::Strict,
            data_dir: PathBuf::from("stock_data"),
            results_dir: PathBuf::from("results"),
            evaluation_date: None,
        }
    }

    /// Start from defaults and apply any of the recognised environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();

        if let Ok(tickers) = env::var("TICKERS") {
            config = config.with_tickers(tickers.split(',').map(str::to_string).collect());
        }
        if let Some(pct) = Self::env_f64("CSP_SAFETY_PCT")? {
            config = config.with_safety_pct(pct);
        }
        if let Some(cash) = Self::env_f64("CASH_ON_HAND")? {
            config = config.with_cash_on_hand(cash);
        }
        if let Ok(days) = env::var("MIN_EXPIRY_DAYS") {
            config = config.with_min_expiry_days(days.trim().parse::<i64>()?);
        }
        if let Ok(dir) = env::var("STOCK_DATA_DIR") {
            config = config.with_data_dir(&dir);
        }
        if let Ok(dir) = env::var("RESULTS_DATA_DIR") {
            config = config.with_results_dir(&dir);
        }

        Ok(config)
    }

    fn env_f64(key: &str) -> Result<Option<f64>> {
        match env::var(key) {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|e| ScreenerError::InvalidConfig(format!("{}={}: {}", key, raw, e))),
            Err(_) => Ok(None),
        }
    }

    pub fn with_tickers(mut self, tickers: Vec<String>) -> Self {
        self.tickers = tickers
            .into_iter()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    pub fn with_safety_pct(mut self, pct: f64) -> Self {
        self.csp_safety_pct = pct;
        self
    }

    pub fn with_cash_on_hand(mut self, cash: f64) -> Self {
        self.cash_on_hand = cash;
        self
    }

    pub fn with_min_expiry_days(mut self, days: i64) -> Self {
        self.min_expiry_days = days;
        self
    }

    pub fn with_week_end(mut self, week_end: Weekday) -> Self {
        self.week_end = week_end;
        self
    }

    pub fn with_threshold_comparison(mut self, comparison: ThresholdComparison) -> Self {
        self.threshold_comparison = comparison;
        self
    }

    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.data_dir = PathBuf::from(dir);
        self
    }

    pub fn with_results_dir(mut self, dir: &str) -> Self {
        self.results_dir = PathBuf::from(dir);
        self
    }

    pub fn with_evaluation_date(mut self, date: NaiveDate) -> Self {
        self.evaluation_date = Some(date);
        self
    }

    /// Reject values the engine cannot work with. Called once before the config is shared.
    pub fn validate(self) -> Result<Self> {
        if !self.csp_safety_pct.is_finite() || self.csp_safety_pct <= 0.0 || self.csp_safety_pct > 100.0 {
            return Err(ScreenerError::InvalidConfig(format!(
                "safety percentage must be in (0, 100], got {}",
                self.csp_safety_pct
            )));
        }
        if !self.cash_on_hand.is_finite() || self.cash_on_hand < 0.0 {
            return Err(ScreenerError::InvalidConfig(format!(
                "cash on hand must be a non-negative amount, got {}",
                self.cash_on_hand
            )));
        }
        if self.min_expiry_days < 0 {
            return Err(ScreenerError::InvalidConfig(format!(
                "minimum days to expiry cannot be negative, got {}",
                self.min_expiry_days
            )));
        }
        if self.tickers.is_empty() {
            warn!("No tickers configured");
        }
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_normalises_tickers() {
        let config = Config::new().with_tickers(vec![" aapl".into(), "".into(), "spy ".into()]);
        assert_eq!(config.tickers, vec!["AAPL".to_string(), "SPY".to_string()]);
    }

    #[test]
    fn test_validate_rejects_out_of_range_safety() {
        assert!(Config::new().with_safety_pct(0.0).validate().is_err());
        assert!(Config::new().with_safety_pct(120.0).validate().is_err());
        assert!(Config::new().with_safety_pct(f64::NAN).validate().is_err());
        assert!(Config::new().with_safety_pct(5.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_cash() {
        let err = Config::new().with_cash_on_hand(-1.0).validate().unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidConfig(_)));
    }

    #[test]
    fn test_threshold_comparison_boundary() {
        assert!(!ThresholdComparison::Strict.breaches(-1.0, -1.0));
        assert!(ThresholdComparison::Inclusive.breaches(-1.0, -1.0));
        assert!(ThresholdComparison::Strict.breaches(-1.5, -1.0));
    }
}
