//! European put greeks under Black-Scholes.
//!
//! Theta is per calendar day, vega per volatility point and rho per rate point.

use log::debug;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use super::PricingModel;
use crate::errors::{Result, ScreenerError};
use crate::models::option::GreeksResult;

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone)]
pub struct BlackScholesModel {
    normal: Normal,
}

impl BlackScholesModel {
    pub fn new() -> Result<Self> {
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ScreenerError::ProviderUnavailable(format!("normal distribution: {}", e)))?;
        Ok(Self { normal })
    }

    /// Theoretical put value, used to sanity check a quoted price.
    pub fn put_value(&self, spot: f64, strike: f64, rate_pct: f64, days: i64, volatility_pct: f64) -> Result<f64> {
        let p = Inputs::new(spot, strike, rate_pct, days, volatility_pct)?;
        let (d1, d2) = p.d1_d2();
        Ok(self.value_at(&p, d1, d2))
    }

    fn value_at(&self, p: &Inputs, d1: f64, d2: f64) -> f64 {
        p.k * (-p.r * p.t).exp() * self.normal.cdf(-d2) - p.s * self.normal.cdf(-d1)
    }
}

struct Inputs {
    s: f64,
    k: f64,
    r: f64,
    t: f64,
    v: f64,
}

impl Inputs {
    fn new(spot: f64, strike: f64, rate_pct: f64, days: i64, volatility_pct: f64) -> Result<Self> {
        if !(spot > 0.0 && strike > 0.0 && days > 0 && volatility_pct > 0.0) || !rate_pct.is_finite() {
            return Err(ScreenerError::ProviderUnavailable(format!(
                "cannot price put: spot={} strike={} rate={}% days={} vol={}%",
                spot, strike, rate_pct, days, volatility_pct
            )));
        }
        Ok(Self {
            s: spot,
            k: strike,
            r: rate_pct / 100.0,
            t: days as f64 / DAYS_PER_YEAR,
            v: volatility_pct / 100.0,
        })
    }

    fn d1_d2(&self) -> (f64, f64) {
        let sqrt_t = self.t.sqrt();
        let d1 = ((self.s / self.k).ln() + (self.r + 0.5 * self.v * self.v) * self.t) / (self.v * sqrt_t);
        (d1, d1 - self.v * sqrt_t)
    }
}

impl PricingModel for BlackScholesModel {
    fn price(
        &self,
        spot: f64,
        strike: f64,
        rate_pct: f64,
        days_to_expiry: i64,
        volatility_pct: f64,
        known_price: f64,
    ) -> Result<GreeksResult> {
        let p = Inputs::new(spot, strike, rate_pct, days_to_expiry, volatility_pct)?;
        let (d1, d2) = p.d1_d2();

        // the quote only informs the log; greeks come from the model
        let model_value = self.value_at(&p, d1, d2);
        debug!(
            "put {} @ {}: model value {:.3}, quoted {:.3} (diff {:.3})",
            strike,
            spot,
            model_value,
            known_price,
            known_price - model_value
        );
        let sqrt_t = p.t.sqrt();
        let pdf_d1 = self.normal.pdf(d1);
        let discount = (-p.r * p.t).exp();
        let n_neg_d2 = self.normal.cdf(-d2);

        Ok(GreeksResult {
            delta: -self.normal.cdf(-d1),
            theta: (-p.s * pdf_d1 * p.v / (2.0 * sqrt_t) + p.r * p.k * discount * n_neg_d2) / DAYS_PER_YEAR,
            gamma: pdf_d1 / (p.s * p.v * sqrt_t),
            vega: p.s * pdf_d1 * sqrt_t / 100.0,
            rho: -p.k * p.t * discount * n_neg_d2 / 100.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atm_put_greeks() {
        // S = K = 100, r = 0, sigma = 20%, t = 1 year
        // d1 = 0.1, d2 = -0.1
        let model = BlackScholesModel::new().unwrap();
        let g = model.price(100.0, 100.0, 0.0, 365, 20.0, 7.97).unwrap();

        assert!((g.delta - (-0.460172)).abs() < 1e-5);
        assert!((g.gamma - 0.0198476).abs() < 1e-6);
        assert!((g.vega - 0.396953).abs() < 1e-5);
        assert!((g.theta - (-0.0108754)).abs() < 1e-6);
        assert!((g.rho - (-0.539828)).abs() < 1e-5);
    }

    #[test]
    fn test_put_value_matches_reference() {
        let model = BlackScholesModel::new().unwrap();
        let value = model.put_value(100.0, 100.0, 0.0, 365, 20.0).unwrap();
        assert!((value - 7.965567).abs() < 1e-5);
    }

    #[test]
    fn test_quoted_price_does_not_move_greeks() {
        let model = BlackScholesModel::new().unwrap();
        let near_model = model.price(100.0, 95.0, 5.0, 30, 25.0, 1.0).unwrap();
        let far_off = model.price(100.0, 95.0, 5.0, 30, 25.0, 40.0).unwrap();
        assert_eq!(near_model, far_off);

        let value = model.put_value(100.0, 95.0, 5.0, 30, 25.0).unwrap();
        assert!(value > 0.0 && value < 95.0);
    }

    #[test]
    fn test_rejects_expired_option() {
        let model = BlackScholesModel::new().unwrap();
        let err = model.price(100.0, 95.0, 5.0, 0, 30.0, 1.0).unwrap_err();
        assert!(matches!(err, ScreenerError::ProviderUnavailable(_)));
    }
}
