use serde::Serialize;

use crate::util::{format_currency, round_to};

pub const SHARES_PER_CONTRACT: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSize {
    pub cash_on_hand: f64,
    pub max_contracts: u64,
    pub potential_profit: f64,
    /// `potential_profit` as `$1,234.56`.
    pub potential_profit_display: String,
}

/// How many puts the cash can secure at `strike`, and the premium they would collect.
/// Not enough cash for one contract is a valid zero-contract result.
pub fn size_position(cash_on_hand: f64, strike: f64, option_last_price: f64) -> PositionSize {
    let collateral = strike * SHARES_PER_CONTRACT;
    let max_contracts = if collateral > 0.0 && cash_on_hand > 0.0 {
        (cash_on_hand / collateral).floor() as u64
    } else {
        0
    };
    let potential_profit = round_to(max_contracts as f64 * option_last_price * SHARES_PER_CONTRACT, 2);

    PositionSize {
        cash_on_hand,
        max_contracts,
        potential_profit,
        potential_profit_display: format_currency(potential_profit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_contracts() {
        let size = size_position(10_000.0, 50.0, 1.25);
        assert_eq!(size.max_contracts, 2);
        assert_eq!(size.potential_profit, 250.0);
        assert_eq!(size.potential_profit_display, "$250.00");
    }

    #[test]
    fn test_not_enough_cash_is_zero_contracts() {
        let size = size_position(4_999.0, 50.0, 1.25);
        assert_eq!(size.max_contracts, 0);
        assert_eq!(size.potential_profit_display, "$0.00");
    }

    #[test]
    fn test_thousands_separator() {
        let size = size_position(1_000_000.0, 20.0, 0.87);
        assert_eq!(size.max_contracts, 500);
        assert_eq!(size.potential_profit_display, "$43,500.00");
    }
}
