//! Weekly-move risk threshold: the smallest adverse weekly move that historically happens
//! less often than the configured safety percentage, and how long the series tends to
//! stay above it.

use log::debug;
use serde::Serialize;

use crate::config::ThresholdComparison;
use crate::errors::{Result, ScreenerError};
use crate::models::price::WeeklySeries;
use crate::util::round_to;

const STEP_PCT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdResult {
    /// Negative multiple of 0.5, in percent.
    pub threshold_pct: f64,
    /// Share of weeks that moved past the threshold, rounded to 2 decimals.
    pub occurrence_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunStats {
    pub longest_run: usize,
    pub shortest_run: usize,
    pub average_run: f64,
}

impl RunStats {
    /// Average run rounded half-to-even to whole weeks.
    pub fn average_run_weeks(&self) -> usize {
        self.average_run.round_ties_even() as usize
    }
}

/// Percentage of `returns` that breach `threshold_pct`.
pub fn occurrence_pct(returns: &[f64], threshold_pct: f64, comparison: ThresholdComparison) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let hits = returns
        .iter()
        .filter(|r| comparison.breaches(**r, threshold_pct))
        .count();
    hits as f64 / returns.len() as f64 * 100.0
}

/// Walk thresholds -0.5, -1.0, ... down to the floor of the worst weekly return and stop
/// at the first one whose occurrence is below `safety_pct`. Occurrence only grows as the
/// threshold approaches zero, so the first hit is the least negative qualifying threshold.
pub fn scan_threshold(
    weekly: &WeeklySeries,
    safety_pct: f64,
    comparison: ThresholdComparison,
) -> Result<ThresholdResult> {
    let returns: Vec<f64> = weekly.returns_pct().collect();
    let worst = returns
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    if !worst.is_finite() {
        return Err(ScreenerError::InsufficientData(
            "no weekly returns to scan".to_string(),
        ));
    }

    let floor = worst.floor().min(-STEP_PCT);
    let mut k: u32 = 1;
    loop {
        let threshold_pct = -(k as f64) * STEP_PCT;
        if threshold_pct < floor {
            break;
        }

        let pct = occurrence_pct(&returns, threshold_pct, comparison);
        if pct < safety_pct {
            debug!(
                "Threshold {}% occurs {:.4}% of {} weeks (safety {}%)",
                threshold_pct,
                pct,
                returns.len(),
                safety_pct
            );
            return Ok(ThresholdResult {
                threshold_pct,
                occurrence_pct: round_to(pct, 2),
            });
        }
        k += 1;
    }

    Err(ScreenerError::NoQualifyingThreshold { safety_pct })
}

/// Lengths of the maximal runs of weeks whose change stayed at or above the threshold.
pub fn run_lengths(weekly: &WeeklySeries, threshold_pct: f64) -> Vec<usize> {
    let bound = threshold_pct / 100.0;
    let mut runs = Vec::new();
    let mut current = 0usize;

    for bar in weekly.bars() {
        let above = bar.change_ratio.map_or(false, |r| r >= bound);
        if above {
            current += 1;
        } else if current > 0 {
            runs.push(current);
            current = 0;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}

pub fn run_stats(weekly: &WeeklySeries, threshold_pct: f64) -> Result<RunStats> {
    let runs = run_lengths(weekly, threshold_pct);
    let (longest_run, shortest_run) = match (runs.iter().max(), runs.iter().min()) {
        (Some(max), Some(min)) => (*max, *min),
        _ => {
            return Err(ScreenerError::InsufficientData(format!(
                "no week held at or above a {}% move",
                threshold_pct
            )))
        }
    };
    let mean = runs.iter().sum::<usize>() as f64 / runs.len() as f64;

    Ok(RunStats {
        longest_run,
        shortest_run,
        average_run: round_to(mean, 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::resampler::resample_weekly;
    use crate::models::price::PricePoint;
    use chrono::{Duration, NaiveDate, Weekday};

    /// One close per week, every Monday.
    fn weekly_from_closes(closes: &[f64]) -> WeeklySeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points: Vec<PricePoint> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint::from_close(start + Duration::weeks(i as i64), *c))
            .collect();
        resample_weekly(&points, Weekday::Sun).unwrap()
    }

    #[test]
    fn test_average_run_rounds_half_to_even() {
        // runs of [2,2,2,2,2,2,2,3] weeks, each broken by a -20% week
        let mut closes = vec![100.0];
        let mut close = 100.0;
        for (i, len) in [2, 2, 2, 2, 2, 2, 2, 3].iter().enumerate() {
            if i > 0 {
                close *= 0.8;
                closes.push(close);
            }
            closes.extend(std::iter::repeat(close).take(*len));
        }
        let weekly = weekly_from_closes(&closes);

        let stats = run_stats(&weekly, -5.0).unwrap();
        assert_eq!(stats.longest_run, 3);
        assert_eq!(stats.shortest_run, 2);
        assert_eq!(stats.average_run, 2.12);
        assert_eq!(stats.average_run_weeks(), 2);
    }

    #[test]
    fn test_scan_reference_series() {
        let weekly = weekly_from_closes(&[100.0, 95.0, 90.0, 80.0, 95.0, 100.0]);
        let result = scan_threshold(&weekly, 10.0, ThresholdComparison::Strict).unwrap();
        // -11.0 still catches the -11.11% week (1 of 5 = 20%), -11.5 catches none
        assert_eq!(result.threshold_pct, -11.5);
        assert_eq!(result.occurrence_pct, 0.0);

        let returns: Vec<f64> = weekly.returns_pct().collect();
        assert_eq!(occurrence_pct(&returns, -0.5, ThresholdComparison::Strict), 60.0);
    }

    #[test]
    fn test_scan_is_optimal() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + 8.0 * ((i as f64) * 0.7).sin() + (i % 5) as f64)
            .collect();
        let weekly = weekly_from_closes(&closes);
        let returns: Vec<f64> = weekly.returns_pct().collect();

        for safety in [5.0, 10.0, 20.0, 35.0] {
            let result = scan_threshold(&weekly, safety, ThresholdComparison::Strict).unwrap();
            assert!(result.threshold_pct <= -0.5);
            assert_eq!(result.threshold_pct % 0.5, 0.0);
            assert!(occurrence_pct(&returns, result.threshold_pct, ThresholdComparison::Strict) < safety);

            let mut t = result.threshold_pct + STEP_PCT;
            while t <= -STEP_PCT {
                assert!(occurrence_pct(&returns, t, ThresholdComparison::Strict) >= safety);
                t += STEP_PCT;
            }
        }
    }

    #[test]
    fn test_scan_without_any_drop_uses_first_step() {
        let weekly = weekly_from_closes(&[100.0, 101.0, 103.0, 104.0]);
        let result = scan_threshold(&weekly, 10.0, ThresholdComparison::Strict).unwrap();
        assert_eq!(result.threshold_pct, -0.5);
        assert_eq!(result.occurrence_pct, 0.0);
    }

    #[test]
    fn test_inclusive_scan_can_exhaust() {
        // a single -50% week: strict finds -50, inclusive never clears it
        let weekly = weekly_from_closes(&[100.0, 50.0]);
        let strict = scan_threshold(&weekly, 10.0, ThresholdComparison::Strict).unwrap();
        assert_eq!(strict.threshold_pct, -50.0);

        let inclusive = scan_threshold(&weekly, 10.0, ThresholdComparison::Inclusive);
        assert!(matches!(
            inclusive,
            Err(ScreenerError::NoQualifyingThreshold { .. })
        ));
    }

    #[test]
    fn test_run_stats() {
        // changes: _, -5%, +5.26%, +10%, -20%, +1%, +1%, +1%
        let weekly = weekly_from_closes(&[100.0, 95.0, 100.0, 110.0, 88.0, 88.88, 89.7688, 90.666488]);
        let stats = run_stats(&weekly, -4.5).unwrap();
        assert_eq!(run_lengths(&weekly, -4.5), vec![2, 3]);
        assert_eq!(stats.longest_run, 3);
        assert_eq!(stats.shortest_run, 2);
        assert_eq!(stats.average_run, 2.5);
        assert_eq!(stats.average_run_weeks(), 2);
        assert!(stats.longest_run >= stats.shortest_run && stats.shortest_run >= 1);
    }

    #[test]
    fn test_run_stats_without_runs() {
        let weekly = weekly_from_closes(&[100.0, 50.0, 25.0]);
        assert!(matches!(
            run_stats(&weekly, -10.0),
            Err(ScreenerError::InsufficientData(_))
        ));
    }
}
