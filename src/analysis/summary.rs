use chrono::NaiveDate;
use serde::Serialize;

use crate::models::price::{DailySeries, WeeklySeries};
use crate::util::round_to;

/// Descriptive facts about the analysed history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub start_week: NaiveDate,
    pub end_week: NaiveDate,
    pub total_weeks: usize,
    pub avg_weekly_return_pct: f64,
    pub lowest_move_week: NaiveDate,
    pub lowest_move_close: f64,
    pub lowest_move_pct: f64,
    pub last_close_date: NaiveDate,
    pub last_close: f64,
}

pub fn summarize(daily: &DailySeries, weekly: &WeeklySeries) -> SeriesSummary {
    let returns: Vec<f64> = weekly.returns_pct().collect();
    let avg = returns.iter().sum::<f64>() / returns.len().max(1) as f64;

    // first week has no return, so start from the second; ties keep the earliest week
    let lowest = weekly.bars()[1..]
        .iter()
        .fold(&weekly.bars()[1], |low, bar| {
            if bar.return_pct < low.return_pct {
                bar
            } else {
                low
            }
        });

    SeriesSummary {
        start_week: weekly.first().week_ending,
        end_week: weekly.last().week_ending,
        total_weeks: weekly.len(),
        avg_weekly_return_pct: round_to(avg, 2),
        lowest_move_week: lowest.week_ending,
        lowest_move_close: round_to(lowest.close(), 2),
        lowest_move_pct: round_to(lowest.return_pct.unwrap_or(0.0), 3),
        last_close_date: daily.last().date,
        last_close: round_to(daily.last().close, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::resampler::resample_weekly;
    use crate::models::price::PricePoint;
    use chrono::{Duration, Weekday};

    #[test]
    fn test_summary_of_reference_series() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let points: Vec<PricePoint> = [100.0, 95.0, 90.0, 80.0, 95.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint::from_close(start + Duration::weeks(i as i64), *c))
            .collect();
        let daily = DailySeries::new("TEST", points).unwrap();
        let weekly = resample_weekly(daily.points(), Weekday::Sun).unwrap();

        let summary = summarize(&daily, &weekly);
        assert_eq!(summary.total_weeks, 6);
        assert_eq!(summary.start_week, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
        assert_eq!(summary.lowest_move_week, NaiveDate::from_ymd_opt(2024, 1, 28).unwrap());
        assert_eq!(summary.lowest_move_close, 80.0);
        assert_eq!(summary.lowest_move_pct, -11.111);
        assert_eq!(summary.last_close, 100.0);
        assert_eq!(summary.last_close_date, NaiveDate::from_ymd_opt(2024, 2, 6).unwrap());
    }
}
