use chrono::{Duration, NaiveDate};
use log::{debug, info};

use crate::errors::{Result, ScreenerError};
use crate::models::option::{OptionChain, OptionQuote};
use crate::util::round_to;

/// Last close moved by `threshold_pct` and rounded down to a 0.5 increment.
pub fn target_strike(last_close: f64, threshold_pct: f64) -> f64 {
    (last_close * ((100.0 + threshold_pct) / 100.0) * 2.0).floor() / 2.0
}

/// Earliest expiry at least `min_days` calendar days after `from`.
pub fn select_expiry(expiries: &[NaiveDate], from: NaiveDate, min_days: i64) -> Result<NaiveDate> {
    let earliest = from + Duration::days(min_days);
    expiries
        .iter()
        .copied()
        .filter(|e| *e >= earliest)
        .min()
        .ok_or(ScreenerError::NoEligibleExpiry { from, min_days })
}

/// The put quoted at `target` or, failing that, the nearest strike. Ties go to the lower
/// strike because quotes are scanned in ascending order.
pub fn match_strike<'a>(target: f64, chain: &'a OptionChain) -> Result<&'a OptionQuote> {
    if chain.puts.is_empty() {
        return Err(ScreenerError::EmptyChain(chain.expiry));
    }

    if let Some(exact) = chain.puts.iter().find(|q| q.strike == target) {
        return Ok(exact);
    }

    let mut best = &chain.puts[0];
    for quote in &chain.puts[1..] {
        if (quote.strike - target).abs() < (best.strike - target).abs() {
            best = quote;
        }
    }
    info!(
        "No exact match for strike {}, using closest strike {}",
        target, best.strike
    );
    Ok(best)
}

/// Strike at which option holders of this expiry collectively recover the least.
pub fn max_pain(chain: &OptionChain) -> Result<f64> {
    let mut strikes: Vec<f64> = chain
        .calls
        .iter()
        .chain(chain.puts.iter())
        .map(|q| q.strike)
        .collect();
    strikes.sort_by(|a, b| a.total_cmp(b));
    strikes.dedup();

    let mut best: Option<(f64, f64)> = None;
    for strike in strikes {
        let call_pain: f64 = chain
            .calls
            .iter()
            .map(|c| (strike - c.strike).max(0.0) * c.open_interest as f64)
            .sum();
        let put_pain: f64 = chain
            .puts
            .iter()
            .map(|p| (p.strike - strike).max(0.0) * p.open_interest as f64)
            .sum();
        let total = call_pain + put_pain;

        if best.map_or(true, |(_, lowest)| total < lowest) {
            best = Some((strike, total));
        }
    }

    let (strike, pain) = best.ok_or(ScreenerError::EmptyChain(chain.expiry))?;
    debug!("Max pain for {} at {} (total {})", chain.expiry, strike, pain);
    Ok(round_to(strike, 2))
}
