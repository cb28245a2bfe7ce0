use log::debug;

use crate::errors::Result;
use crate::models::option::{GreeksResult, MatchedPut};
use crate::pricing::PricingModel;
use crate::util::round_to;

/// Scale market inputs for the pricing model and round what comes back.
pub fn put_greeks(
    model: &dyn PricingModel,
    last_close: f64,
    matched: &MatchedPut,
    rate_pct: f64,
) -> Result<GreeksResult> {
    let spot = round_to(last_close, 3);
    let vol_pct = round_to(matched.quote.implied_vol_pct, 3);

    debug!(
        "Pricing put: spot={} strike={} rate={}% days={} vol={}% last={}",
        spot, matched.quote.strike, rate_pct, matched.days_to_expiry, vol_pct, matched.quote.last_price
    );

    let raw = model.price(
        spot,
        matched.quote.strike,
        rate_pct,
        matched.days_to_expiry,
        vol_pct,
        matched.quote.last_price,
    )?;

    Ok(GreeksResult {
        delta: round_to(raw.delta, 3),
        theta: round_to(raw.theta, 3),
        gamma: round_to(raw.gamma, 3),
        vega: round_to(raw.vega, 3),
        rho: round_to(raw.rho, 3),
    })
}
