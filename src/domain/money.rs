//! Monetary representation.

use rust_decimal::Decimal;

/// Currency amount represented as a Decimal for precision.
pub type Money = Decimal;

/// Number of decimal places monetary values carry at rest.
pub const MONEY_DP: u32 = 2;

/// Round a monetary value to two decimal places (banker's rounding).
///
/// Only ledger fields and proposition impacts are rounded; intermediate
/// accumulator multiplication keeps full precision.
#[must_use]
pub fn round_money(value: Money) -> Money {
    value.round_dp(MONEY_DP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round_money(dec!(14.583333)), dec!(14.58));
        assert_eq!(round_money(dec!(90.909090)), dec!(90.91));
    }

    #[test]
    fn midpoint_rounds_to_even() {
        assert_eq!(round_money(dec!(0.125)), dec!(0.12));
        assert_eq!(round_money(dec!(0.135)), dec!(0.14));
    }

    #[test]
    fn negative_values_round_symmetrically() {
        assert_eq!(round_money(dec!(-3.336)), dec!(-3.34));
    }
}
