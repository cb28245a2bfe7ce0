use log::debug;
use serde::Serialize;

use crate::models::price::WeeklySeries;
use crate::util::round_to;

/// Whether the series recently fell through the risk threshold, and how long ago it last did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreachIndicator {
    pub window_weeks: usize,
    pub breached_recently: bool,
    pub breach_count: usize,
    /// Whole weeks between the last breach and the latest week; `None` if it never happened.
    pub weeks_since_breach: Option<i64>,
}

impl BreachIndicator {
    /// Value used in flat reports, where a missing breach is written as -1.
    pub fn weeks_since_breach_or_sentinel(&self) -> i64 {
        self.weeks_since_breach.unwrap_or(-1)
    }
}

pub fn recent_breach(weekly: &WeeklySeries, threshold_pct: f64, window_weeks: usize) -> BreachIndicator {
    let changes: Vec<Option<f64>> = weekly
        .bars()
        .iter()
        .map(|b| b.change_ratio.map(|r| round_to(r * 100.0, 2)))
        .collect();
    let below = |c: &Option<f64>| c.map_or(false, |pct| pct < threshold_pct);

    let window_start = changes.len().saturating_sub(window_weeks);
    let breach_count = changes[window_start..].iter().filter(|c| below(c)).count();

    let latest = weekly.last().week_ending;
    let weeks_since_breach = changes
        .iter()
        .rposition(below)
        .map(|idx| (latest - weekly.bars()[idx].week_ending).num_days() / 7);

    debug!(
        "{} breaches of {}% in the last {} weeks, last breach {:?} weeks ago",
        breach_count, threshold_pct, window_weeks, weeks_since_breach
    );

    BreachIndicator {
        window_weeks,
        breached_recently: breach_count > 0,
        breach_count,
        weeks_since_breach,
    }
}
