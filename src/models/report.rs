use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::position::PositionSize;
use crate::analysis::HistoryAnalysis;
use crate::models::option::{GreeksResult, MatchedPut};

/// Option side of a report. `Unavailable` is used only when no expiry was far enough out.
#[derive(Debug, Clone, PartialEq)]
pub enum PutLeg {
    Priced(PricedPut),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedPut {
    pub matched: MatchedPut,
    pub greeks: GreeksResult,
    pub max_pain: f64,
    pub position: PositionSize,
}

/// Final, fully populated result for one security.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningReport {
    pub ticker: String,
    pub safety_pct: f64,
    pub analysis: HistoryAnalysis,
    pub put: PutLeg,
}

impl ScreeningReport {
    pub fn new(ticker: &str, safety_pct: f64, analysis: HistoryAnalysis, put: PutLeg) -> Self {
        Self {
            ticker: ticker.to_string(),
            safety_pct,
            analysis,
            put,
        }
    }

    pub fn priced_put(&self) -> Option<&PricedPut> {
        match &self.put {
            PutLeg::Priced(priced) => Some(priced),
            PutLeg::Unavailable { .. } => None,
        }
    }
}

const NOT_AVAILABLE: &str = "N/A";

/// One flat row per report, as written by tabular sinks.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Data Start Date")]
    pub start_week: NaiveDate,
    #[serde(rename = "Data End Date")]
    pub end_week: NaiveDate,
    #[serde(rename = "Total Weeks")]
    pub total_weeks: usize,
    #[serde(rename = "Avg Weekly Return")]
    pub avg_weekly_return_pct: f64,
    #[serde(rename = "Lowest Move Date")]
    pub lowest_move_week: NaiveDate,
    #[serde(rename = "Lowest Move Close")]
    pub lowest_move_close: f64,
    #[serde(rename = "Lowest Move %")]
    pub lowest_move_pct: f64,
    #[serde(rename = "Last Close Date")]
    pub last_close_date: NaiveDate,
    #[serde(rename = "Last Close Price")]
    pub last_close: f64,
    #[serde(rename = "200 Day MA")]
    pub sma_200: String,
    #[serde(rename = "50 Day MA")]
    pub sma_50: String,
    #[serde(rename = "RSI")]
    pub rsi: f64,
    #[serde(rename = "MACD Line")]
    pub macd_line: f64,
    #[serde(rename = "MACD Signal")]
    pub macd_signal: f64,
    #[serde(rename = "MACD Histogram")]
    pub macd_histogram: f64,
    #[serde(rename = "Bollinger Upper")]
    pub bollinger_upper: f64,
    #[serde(rename = "Bollinger Middle")]
    pub bollinger_middle: f64,
    #[serde(rename = "Bollinger Lower")]
    pub bollinger_lower: f64,
    #[serde(rename = "CSP Safety %")]
    pub safety_pct: f64,
    #[serde(rename = "Target Strike (% Under Close)")]
    pub threshold_pct: f64,
    #[serde(rename = "% Chance Assigned")]
    pub occurrence_pct: f64,
    #[serde(rename = "Longest Run")]
    pub longest_run: usize,
    #[serde(rename = "Shortest Run")]
    pub shortest_run: usize,
    #[serde(rename = "Average Run")]
    pub average_run: f64,
    #[serde(rename = "Target Strike")]
    pub target_strike: f64,
    #[serde(rename = "Breached Recently")]
    pub breached_recently: bool,
    #[serde(rename = "Recent Breaches")]
    pub breach_count: usize,
    #[serde(rename = "Weeks Since Breach")]
    pub weeks_since_breach: i64,
    #[serde(rename = "Option Strike Used")]
    pub strike_used: String,
    #[serde(rename = "Option Expiry Date")]
    pub expiry: String,
    #[serde(rename = "Option Days to Expiry")]
    pub days_to_expiry: String,
    #[serde(rename = "Max Pain")]
    pub max_pain: String,
    #[serde(rename = "Option Last Price")]
    pub last_price: String,
    #[serde(rename = "Option Volume")]
    pub volume: String,
    #[serde(rename = "Option Open Interest")]
    pub open_interest: String,
    #[serde(rename = "Option Implied Vol")]
    pub implied_vol_pct: String,
    #[serde(rename = "Option Delta")]
    pub delta: String,
    #[serde(rename = "Option Theta")]
    pub theta: String,
    #[serde(rename = "Option Gamma")]
    pub gamma: String,
    #[serde(rename = "Option Vega")]
    pub vega: String,
    #[serde(rename = "Option Rho")]
    pub rho: String,
    #[serde(rename = "Cash On Hand")]
    pub cash_on_hand: String,
    #[serde(rename = "Max Contracts")]
    pub max_contracts: String,
    #[serde(rename = "Potential Profit")]
    pub potential_profit: String,
}

fn opt_to_cell<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

impl From<&ScreeningReport> for ReportRow {
    fn from(report: &ScreeningReport) -> Self {
        let a = &report.analysis;
        let priced = report.priced_put();

        ReportRow {
            ticker: report.ticker.clone(),
            start_week: a.summary.start_week,
            end_week: a.summary.end_week,
            total_weeks: a.summary.total_weeks,
            avg_weekly_return_pct: a.summary.avg_weekly_return_pct,
            lowest_move_week: a.summary.lowest_move_week,
            lowest_move_close: a.summary.lowest_move_close,
            lowest_move_pct: a.summary.lowest_move_pct,
            last_close_date: a.summary.last_close_date,
            last_close: a.summary.last_close,
            sma_200: opt_to_cell(a.indicators.sma_200),
            sma_50: opt_to_cell(a.indicators.sma_50),
            rsi: a.indicators.rsi,
            macd_line: a.indicators.macd_line,
            macd_signal: a.indicators.macd_signal,
            macd_histogram: a.indicators.macd_histogram,
            bollinger_upper: a.indicators.bollinger_upper,
            bollinger_middle: a.indicators.bollinger_middle,
            bollinger_lower: a.indicators.bollinger_lower,
            safety_pct: report.safety_pct,
            threshold_pct: a.threshold.threshold_pct,
            occurrence_pct: a.threshold.occurrence_pct,
            longest_run: a.runs.longest_run,
            shortest_run: a.runs.shortest_run,
            average_run: a.runs.average_run,
            target_strike: a.target_strike,
            breached_recently: a.breach.breached_recently,
            breach_count: a.breach.breach_count,
            weeks_since_breach: a.breach.weeks_since_breach_or_sentinel(),
            strike_used: opt_to_cell(priced.map(|p| p.matched.quote.strike)),
            expiry: opt_to_cell(priced.map(|p| p.matched.expiry)),
            days_to_expiry: opt_to_cell(priced.map(|p| p.matched.days_to_expiry)),
            max_pain: opt_to_cell(priced.map(|p| p.max_pain)),
            last_price: opt_to_cell(priced.map(|p| p.matched.quote.last_price)),
            volume: opt_to_cell(priced.map(|p| p.matched.quote.volume)),
            open_interest: opt_to_cell(priced.map(|p| p.matched.quote.open_interest)),
            implied_vol_pct: opt_to_cell(priced.map(|p| p.matched.quote.implied_vol_pct)),
            delta: opt_to_cell(priced.map(|p| p.greeks.delta)),
            theta: opt_to_cell(priced.map(|p| p.greeks.theta)),
            gamma: opt_to_cell(priced.map(|p| p.greeks.gamma)),
            vega: opt_to_cell(priced.map(|p| p.greeks.vega)),
            rho: opt_to_cell(priced.map(|p| p.greeks.rho)),
            cash_on_hand: opt_to_cell(priced.map(|p| p.position.cash_on_hand)),
            max_contracts: opt_to_cell(priced.map(|p| p.position.max_contracts)),
            potential_profit: opt_to_cell(priced.map(|p| p.position.potential_profit_display.clone())),
        }
    }
}
