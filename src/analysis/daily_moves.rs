use chrono::NaiveDate;
use serde::Serialize;

use crate::models::price::DailySeries;
use crate::util::round_to;

/// Day-over-day move statistics of a daily series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMoveStats {
    pub total_days: usize,
    pub avg_daily_return_pct: f64,
    /// Mean of the absolute daily returns.
    pub avg_daily_move_pct: f64,
    pub move_limit_pct: f64,
    /// Days whose absolute return exceeded `move_limit_pct`, in date order.
    pub large_moves: Vec<(NaiveDate, f64)>,
}

pub fn daily_moves(daily: &DailySeries, move_limit_pct: f64) -> DailyMoveStats {
    let returns: Vec<(NaiveDate, f64)> = daily
        .points()
        .windows(2)
        .map(|w| (w[1].date, 100.0 * (w[1].close / w[0].close - 1.0)))
        .collect();

    let count = returns.len().max(1) as f64;
    let avg_return = returns.iter().map(|(_, r)| r).sum::<f64>() / count;
    let avg_move = returns.iter().map(|(_, r)| r.abs()).sum::<f64>() / count;

    DailyMoveStats {
        total_days: daily.len(),
        avg_daily_return_pct: round_to(avg_return, 3),
        avg_daily_move_pct: round_to(avg_move, 3),
        move_limit_pct,
        large_moves: returns
            .into_iter()
            .filter(|(_, r)| r.abs() > move_limit_pct)
            .map(|(d, r)| (d, round_to(r, 3)))
            .collect(),
    }
}
