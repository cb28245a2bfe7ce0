use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ScreenerError};

/// One daily bar. Only `close` is required by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<i64>,
}

impl PricePoint {
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

/// Daily history of one security, ascending by date with unique dates.
#[derive(Debug, Clone)]
pub struct DailySeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl DailySeries {
    pub fn new(ticker: &str, mut points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ScreenerError::InsufficientData(format!(
                "no daily history for {}",
                ticker
            )));
        }

        if let Some(bad) = points.iter().find(|p| !p.close.is_finite() || p.close <= 0.0) {
            return Err(ScreenerError::DataError(format!(
                "{}: close on {} must be positive, got {}",
                ticker, bad.date, bad.close
            )));
        }

        points.sort_by(|a, b| a.date.cmp(&b.date));
        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(ScreenerError::DataError(format!(
                "{}: duplicate daily bar for {}",
                ticker, pair[0].date
            )));
        }

        Ok(Self {
            ticker: ticker.to_uppercase(),
            points,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn last(&self) -> &PricePoint {
        // non-empty by construction
        &self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The last daily bar of one calendar week plus the change against the previous week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyBar {
    /// Label of the bucket: the configured week-end day of this week.
    pub week_ending: NaiveDate,
    pub point: PricePoint,
    /// Fractional change `close_t / close_{t-1} - 1`; `None` for the first week.
    pub change_ratio: Option<f64>,
    /// `change_ratio * 100`; `None` for the first week.
    pub return_pct: Option<f64>,
}

impl WeeklyBar {
    pub fn close(&self) -> f64 {
        self.point.close
    }
}

/// Weekly view of a `DailySeries`. Always holds at least two weeks.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySeries {
    week_end: Weekday,
    bars: Vec<WeeklyBar>,
}

impl WeeklySeries {
    pub(crate) fn from_bars(week_end: Weekday, bars: Vec<WeeklyBar>) -> Self {
        Self { week_end, bars }
    }

    pub fn week_end(&self) -> Weekday {
        self.week_end
    }

    pub fn bars(&self) -> &[WeeklyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> &WeeklyBar {
        &self.bars[0]
    }

    pub fn last(&self) -> &WeeklyBar {
        &self.bars[self.bars.len() - 1]
    }

    /// Weekly returns in percent, skipping the first week which has none.
    pub fn returns_pct(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().filter_map(|b| b.return_pct)
    }

    /// The underlying daily bars kept for each week.
    pub fn points(&self) -> Vec<PricePoint> {
        self.bars.iter().map(|b| b.point.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_daily_series_sorts_input() {
        let series = DailySeries::new(
            "spy",
            vec![PricePoint::from_close(day(5), 2.0), PricePoint::from_close(day(4), 1.0)],
        )
        .unwrap();
        assert_eq!(series.ticker(), "SPY");
        assert_eq!(series.closes(), vec![1.0, 2.0]);
        assert_eq!(series.last().date, day(5));
    }

    #[test]
    fn test_daily_series_rejects_duplicates_and_bad_closes() {
        let dup = DailySeries::new(
            "X",
            vec![PricePoint::from_close(day(4), 1.0), PricePoint::from_close(day(4), 2.0)],
        );
        assert!(matches!(dup, Err(ScreenerError::DataError(_))));

        let zero = DailySeries::new("X", vec![PricePoint::from_close(day(4), 0.0)]);
        assert!(matches!(zero, Err(ScreenerError::DataError(_))));

        let empty = DailySeries::new("X", vec![]);
        assert!(matches!(empty, Err(ScreenerError::InsufficientData(_))));
    }
}
