pub mod black_scholes;

use crate::errors::Result;
use crate::models::option::GreeksResult;

pub use black_scholes::BlackScholesModel;

/// Theoretical put sensitivities from market inputs.
///
/// Inputs are in the units option traders quote them in: `rate_pct` and
/// `volatility_pct` are annualised percentages, time is in calendar days.
pub trait PricingModel {
    fn price(
        &self,
        spot: f64,
        strike: f64,
        rate_pct: f64,
        days_to_expiry: i64,
        volatility_pct: f64,
        known_price: f64,
    ) -> Result<GreeksResult>;
}
