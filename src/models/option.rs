use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Put or call quote from an options-chain snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub strike: f64,
    pub last_price: f64,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub open_interest: u64,
    /// Implied volatility in percent (25.0 means 25%).
    pub implied_vol_pct: f64,
}

/// All quotes for a single expiry, each side ascending by strike.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionChain {
    pub expiry: NaiveDate,
    pub puts: Vec<OptionQuote>,
    pub calls: Vec<OptionQuote>,
}

impl OptionChain {
    pub fn new(expiry: NaiveDate, mut puts: Vec<OptionQuote>, mut calls: Vec<OptionQuote>) -> Self {
        puts.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        calls.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        Self { expiry, puts, calls }
    }
}

/// Put sensitivities as produced by a pricing model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GreeksResult {
    pub delta: f64,
    pub theta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub rho: f64,
}

/// The put picked for the recommendation, with everything pricing needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPut {
    pub quote: OptionQuote,
    pub expiry: NaiveDate,
    pub days_to_expiry: i64,
}
