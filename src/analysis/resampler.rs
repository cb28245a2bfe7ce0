use chrono::{Datelike, Duration, NaiveDate, Weekday};
use log::debug;
use std::collections::BTreeMap;

use crate::errors::{Result, ScreenerError};
use crate::models::price::{PricePoint, WeeklyBar, WeeklySeries};

/// Date of the `week_end` day that closes the week containing `date`.
pub fn week_ending(date: NaiveDate, week_end: Weekday) -> NaiveDate {
    let target = week_end.num_days_from_monday() as i64;
    let current = date.weekday().num_days_from_monday() as i64;
    date + Duration::days((target - current).rem_euclid(7))
}

/// Collapse daily points into one point per week (the last one observed) and attach
/// week-over-week changes. Weeks without any data are skipped.
pub fn resample_weekly(points: &[PricePoint], week_end: Weekday) -> Result<WeeklySeries> {
    let mut buckets: BTreeMap<NaiveDate, &PricePoint> = BTreeMap::new();

    for point in points {
        let key = week_ending(point.date, week_end);
        match buckets.get(&key) {
            Some(existing) if existing.date > point.date => {}
            _ => {
                buckets.insert(key, point);
            }
        }
    }

    if buckets.len() < 2 {
        return Err(ScreenerError::InsufficientData(format!(
            "need at least 2 weeks of history, got {}",
            buckets.len()
        )));
    }

    let mut bars: Vec<WeeklyBar> = Vec::with_capacity(buckets.len());
    for (week, point) in buckets {
        let change_ratio = bars.last().map(|prev| point.close / prev.close() - 1.0);
        bars.push(WeeklyBar {
            week_ending: week,
            point: point.clone(),
            change_ratio,
            return_pct: change_ratio.map(|r| r * 100.0),
        });
    }

    debug!("Resampled {} daily points into {} weeks", points.len(), bars.len());
    Ok(WeeklySeries::from_bars(week_end, bars))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn points(start: NaiveDate, closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint::from_close(start + Duration::days(i as i64), *c))
            .collect()
    }

    #[test]
    fn test_week_ending_sunday() {
        // 2024-06-03 is a Monday
        assert_eq!(week_ending(date(2024, 6, 3), Weekday::Sun), date(2024, 6, 9));
        assert_eq!(week_ending(date(2024, 6, 9), Weekday::Sun), date(2024, 6, 9));
        assert_eq!(week_ending(date(2024, 6, 10), Weekday::Sun), date(2024, 6, 16));
        assert_eq!(week_ending(date(2024, 6, 3), Weekday::Fri), date(2024, 6, 7));
    }

    #[test]
    fn test_single_week_is_insufficient() {
        // Mon..Fri of one week
        let daily = points(date(2024, 6, 3), &[100.0, 102.0, 99.0, 95.0, 97.0]);
        let err = resample_weekly(&daily, Weekday::Sun).unwrap_err();
        assert!(matches!(err, ScreenerError::InsufficientData(_)));
    }

    #[test]
    fn test_keeps_last_point_and_skips_empty_weeks() {
        let mut daily = points(date(2024, 6, 3), &[10.0, 11.0, 12.0]);
        // nothing in the week of 2024-06-10
        daily.extend(points(date(2024, 6, 18), &[9.0, 15.0]));

        let weekly = resample_weekly(&daily, Weekday::Sun).unwrap();
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly.first().week_ending, date(2024, 6, 9));
        assert_eq!(weekly.first().close(), 12.0);
        assert_eq!(weekly.first().return_pct, None);
        assert_eq!(weekly.last().week_ending, date(2024, 6, 23));
        assert_eq!(weekly.last().close(), 15.0);
        assert!((weekly.last().return_pct.unwrap() - 25.0).abs() < 1e-9);
        assert!((weekly.last().change_ratio.unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_resampling_is_idempotent() {
        let daily = points(date(2024, 1, 1), &(0..60).map(|i| 100.0 + (i % 7) as f64).collect::<Vec<_>>());
        let weekly = resample_weekly(&daily, Weekday::Sun).unwrap();
        let again = resample_weekly(&weekly.points(), Weekday::Sun).unwrap();
        assert_eq!(weekly, again);
    }
}
