pub mod breach;
pub mod daily_moves;
pub mod greeks;
pub mod indicators;
pub mod position;
pub mod resampler;
pub mod strike;
pub mod summary;
pub mod threshold;

use log::info;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::Result;
use crate::models::price::DailySeries;

use breach::BreachIndicator;
use indicators::IndicatorSet;
use summary::SeriesSummary;
use threshold::{RunStats, ThresholdResult};

/// Everything derived from the price history alone, before any option data is involved.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryAnalysis {
    pub summary: SeriesSummary,
    pub indicators: IndicatorSet,
    pub threshold: ThresholdResult,
    pub runs: RunStats,
    pub breach: BreachIndicator,
    pub target_strike: f64,
}

/// Pure, synchronous per-security computation.
#[derive(Debug, Clone)]
pub struct CspEngine {
    config: Arc<Config>,
}

impl CspEngine {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn analyze_history(&self, daily: &DailySeries) -> Result<HistoryAnalysis> {
        let weekly = resampler::resample_weekly(daily.points(), self.config.week_end)?;
        let summary = summary::summarize(daily, &weekly);
        let indicators = indicators::compute_indicators(&daily.closes())?;

        let threshold = threshold::scan_threshold(
            &weekly,
            self.config.csp_safety_pct,
            self.config.threshold_comparison,
        )?;
        let runs = threshold::run_stats(&weekly, threshold.threshold_pct)?;
        let breach = breach::recent_breach(&weekly, threshold.threshold_pct, runs.average_run_weeks());
        let target_strike = strike::target_strike(summary.last_close, threshold.threshold_pct);

        info!(
            "{}: {} weeks, threshold {}% ({}% occurred), target strike {}",
            daily.ticker(),
            weekly.len(),
            threshold.threshold_pct,
            threshold.occurrence_pct,
            target_strike
        );

        Ok(HistoryAnalysis {
            summary,
            indicators,
            threshold,
            runs,
            breach,
            target_strike,
        })
    }
}
