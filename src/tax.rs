//! Tax
//!
//! Conversion between displayed prices and tax-exclusive base prices.

use rust_decimal::Decimal;

use crate::money::percent_of;

/// Tax-exclusive base price for a displayed price.
///
/// A tax-inclusive price with a positive rate is divided by `1 + rate/100`;
/// anything else is already a base price. Zero and negative rates mean no tax.
/// The result is unrounded.
pub fn base_price(displayed: Decimal, is_tax_inclusive: bool, tax_percent: Decimal) -> Decimal {
    if is_tax_inclusive && tax_percent > Decimal::ZERO {
        displayed / (Decimal::ONE + tax_percent / Decimal::ONE_HUNDRED)
    } else {
        displayed
    }
}

/// Tax owed on a base amount, unrounded. Non-positive rates owe nothing.
pub fn tax_on(base: Decimal, tax_percent: Decimal) -> Decimal {
    if tax_percent > Decimal::ZERO {
        percent_of(base, tax_percent)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn inclusive_price_is_divided_out() {
        assert_eq!(base_price(dec!(118), true, dec!(18)), dec!(100));
        assert_eq!(base_price(dec!(105), true, dec!(5)), dec!(100));
    }

    #[test]
    fn exclusive_price_is_unchanged() {
        assert_eq!(base_price(dec!(99), false, dec!(18)), dec!(99));
    }

    #[test]
    fn non_positive_rate_means_no_tax() {
        assert_eq!(base_price(dec!(118), true, Decimal::ZERO), dec!(118));
        assert_eq!(base_price(dec!(118), true, dec!(-18)), dec!(118));
        assert_eq!(tax_on(dec!(100), dec!(-5)), Decimal::ZERO);
    }

    #[test]
    fn tax_on_base() {
        assert_eq!(tax_on(dec!(100), dec!(18)), dec!(18));
        assert_eq!(tax_on(dec!(99), dec!(18)), dec!(17.82));
    }

    #[test]
    fn base_price_round_trips_grossed_up_prices() {
        let tolerance = dec!(0.000000000001);

        for base in [dec!(0), dec!(1), dec!(9.99), dec!(100), dec!(1234.56), dec!(99999.99)] {
            for rate in [dec!(0), dec!(5), dec!(12), dec!(12.5), dec!(18), dec!(28)] {
                let displayed = base * (Decimal::ONE + rate / Decimal::ONE_HUNDRED);
                let recovered = base_price(displayed, true, rate);

                assert!(
                    (recovered - base).abs() <= tolerance,
                    "base {base} at {rate}% recovered as {recovered}"
                );
            }
        }
    }
}
