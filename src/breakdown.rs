//! Pricing Breakdown
//!
//! The immutable result of one pricing pass. A breakdown is rebuilt from
//! scratch whenever any input changes; nothing patches it in place.

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::{
    cart::{CartLines, LineBreakdown},
    fees::{AppliedFee, PlatformFeeTotals},
    money::{MONEY_DECIMAL_PLACES, PricingError, to_minor_units, to_money},
    promotions::AppliedPromoCodeInfo,
    surcharge::VisitingCharge,
};

/// Customer-facing tax caption.
///
/// Cosmetic only; it never feeds back into any amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rate", rename_all = "snake_case")]
pub enum TaxLabel {
    /// Everything taxed is taxed at this one rate.
    Single(Decimal),

    /// Several rates contribute to the tax total.
    Combined,

    /// No tax is charged.
    Zero,
}

impl TaxLabel {
    /// Derive the caption for a set of priced components.
    ///
    /// A single rate is shown when every line shares one non-zero rate, the
    /// visiting charge is untaxed or taxed at that rate, and no platform fee
    /// carries a tax rate of its own.
    pub fn derive(
        lines: &[LineBreakdown],
        visiting_charge: Option<&VisitingCharge>,
        platform_fees: &[AppliedFee],
        total_tax: Decimal,
    ) -> Self {
        let mut rates = lines.iter().map(|line| line.tax_percent);

        let shared_rate = match rates.next() {
            Some(first) if first > Decimal::ZERO && rates.all(|rate| rate == first) => Some(first),
            _ => None,
        };

        if let Some(rate) = shared_rate {
            let charge_agrees = visiting_charge
                .is_none_or(|charge| charge.tax_amount.is_zero() || charge.tax_percent == rate);
            let fees_untaxed = platform_fees
                .iter()
                .all(|fee| fee.tax_rate_percent_on_fee.is_zero());

            if charge_agrees && fees_untaxed {
                return TaxLabel::Single(rate);
            }
        }

        if total_tax > Decimal::ZERO {
            TaxLabel::Combined
        } else {
            TaxLabel::Zero
        }
    }
}

impl fmt::Display for TaxLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxLabel::Single(rate) => write!(f, "Tax ({}%)", rate.normalize()),
            TaxLabel::Combined => f.write_str("Total Tax"),
            TaxLabel::Zero => f.write_str("Tax (0%)"),
        }
    }
}

/// Authoritative order pricing.
///
/// `grand_total = subtotal_base + visiting charge base - discount_amount
/// + fee bases + total_tax`, where `total_tax` sums line, visiting charge
/// and fee taxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    /// Priced cart lines
    pub line_items: Vec<LineBreakdown>,

    /// Displayed subtotal before any discount
    pub sum_of_displayed_prices: Decimal,

    /// Tax-exclusive subtotal
    pub subtotal_base: Decimal,

    /// Promo discount, within `[0, sum_of_displayed_prices]`
    pub discount_amount: Decimal,

    /// Promo code behind the discount
    pub applied_promo_code: Option<AppliedPromoCodeInfo>,

    /// Minimum booking surcharge
    pub visiting_charge: Option<VisitingCharge>,

    /// Applied platform fees, in configuration order
    pub platform_fees: Vec<AppliedFee>,

    /// Line, visiting charge and fee taxes
    pub total_tax: Decimal,

    /// Amount payable
    pub grand_total: Decimal,

    /// Tax caption
    pub effective_tax_label: TaxLabel,
}

impl PricingBreakdown {
    /// Breakdown of an empty cart.
    pub fn empty() -> Self {
        Self {
            line_items: Vec::new(),
            sum_of_displayed_prices: Decimal::ZERO,
            subtotal_base: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            applied_promo_code: None,
            visiting_charge: None,
            platform_fees: Vec::new(),
            total_tax: Decimal::ZERO,
            grand_total: Decimal::ZERO,
            effective_tax_label: TaxLabel::Zero,
        }
    }

    /// Combine the output of every pricing stage.
    pub fn assemble(
        cart_lines: CartLines,
        applied_promo_code: Option<AppliedPromoCodeInfo>,
        visiting_charge: Option<VisitingCharge>,
        fees: PlatformFeeTotals,
    ) -> Self {
        let discount_amount = applied_promo_code
            .as_ref()
            .map_or(Decimal::ZERO, |promo| promo.calculated_discount);

        let (charge_base, charge_tax) = visiting_charge
            .as_ref()
            .map_or((Decimal::ZERO, Decimal::ZERO), |charge| {
                (charge.base, charge.tax_amount)
            });

        let total_tax = cart_lines.total_tax() + charge_tax + fees.total_fee_tax;

        let grand_total = cart_lines.subtotal_base + charge_base - discount_amount
            + fees.total_fee_base
            + total_tax;

        let effective_tax_label = TaxLabel::derive(
            &cart_lines.lines,
            visiting_charge.as_ref(),
            &fees.fees,
            total_tax,
        );

        Self {
            line_items: cart_lines.lines,
            sum_of_displayed_prices: cart_lines.sum_of_displayed_prices,
            subtotal_base: cart_lines.subtotal_base,
            discount_amount,
            applied_promo_code,
            visiting_charge,
            platform_fees: fees.fees,
            total_tax,
            grand_total,
            effective_tax_label,
        }
    }

    /// Whether the breakdown prices no lines.
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Sum of line taxes.
    pub fn line_tax(&self) -> Decimal {
        self.line_items.iter().map(|line| line.tax_amount).sum()
    }

    /// Sum of platform fee amounts before tax.
    pub fn platform_fee_base(&self) -> Decimal {
        self.platform_fees
            .iter()
            .map(|fee| fee.calculated_fee_amount)
            .sum()
    }

    /// Sum of platform fee taxes.
    pub fn platform_fee_tax(&self) -> Decimal {
        self.platform_fees
            .iter()
            .map(|fee| fee.tax_amount_on_fee)
            .sum()
    }

    /// Grand total in integer minor units (two decimal places).
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MinorUnitsOverflow`] if the total does not fit in an `i64`.
    pub fn grand_total_minor_units(&self) -> Result<i64, PricingError> {
        to_minor_units(self.grand_total, MONEY_DECIMAL_PLACES)
    }

    /// Grand total as [`Money`], the amount handed to the payment session.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MinorUnitsOverflow`] if the total does not fit in an `i64`.
    pub fn payable_amount(
        &self,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, PricingError> {
        to_money(self.grand_total, currency)
    }
}

impl Default for PricingBreakdown {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::{
        catalog::ServiceId,
        fees::{FeeType, PlatformFeeConfig},
    };

    use super::*;

    fn line(rate: Decimal, base: Decimal) -> LineBreakdown {
        LineBreakdown {
            service_id: ServiceId::from("svc"),
            name: "Service".to_string(),
            quantity: 1,
            unit_price: base,
            line_displayed_total: base,
            line_base_total: base,
            tax_percent: rate,
            tax_amount: base * rate / Decimal::ONE_HUNDRED,
            is_tax_inclusive: false,
        }
    }

    fn charge(rate: Decimal, tax_amount: Decimal) -> VisitingCharge {
        VisitingCharge {
            displayed: dec!(99),
            base: dec!(99),
            tax_percent: rate,
            tax_amount,
            is_tax_inclusive: false,
        }
    }

    #[test]
    fn label_single_rate() {
        let lines = [line(dec!(18), dec!(100)), line(dec!(18.00), dec!(200))];

        let label = TaxLabel::derive(&lines, None, &[], dec!(54));

        assert_eq!(label, TaxLabel::Single(dec!(18)));
        assert_eq!(label.to_string(), "Tax (18%)");
    }

    #[test]
    fn label_keeps_fractional_rates() {
        assert_eq!(TaxLabel::Single(dec!(12.50)).to_string(), "Tax (12.5%)");
    }

    #[test]
    fn label_mixed_line_rates() {
        let lines = [line(dec!(18), dec!(100)), line(dec!(5), dec!(100))];

        let label = TaxLabel::derive(&lines, None, &[], dec!(23));

        assert_eq!(label, TaxLabel::Combined);
        assert_eq!(label.to_string(), "Total Tax");
    }

    #[test]
    fn label_visiting_charge_must_agree_or_be_untaxed() {
        let lines = [line(dec!(18), dec!(100))];

        let untaxed = charge(dec!(12), Decimal::ZERO);
        let same_rate = charge(dec!(18), dec!(17.82));
        let other_rate = charge(dec!(12), dec!(11.88));

        assert_eq!(
            TaxLabel::derive(&lines, Some(&untaxed), &[], dec!(18)),
            TaxLabel::Single(dec!(18))
        );
        assert_eq!(
            TaxLabel::derive(&lines, Some(&same_rate), &[], dec!(35.82)),
            TaxLabel::Single(dec!(18))
        );
        assert_eq!(
            TaxLabel::derive(&lines, Some(&other_rate), &[], dec!(29.88)),
            TaxLabel::Combined
        );
    }

    #[test]
    fn label_taxed_fee_forces_combined() {
        let lines = [line(dec!(18), dec!(100))];
        let fee = PlatformFeeConfig::new("Convenience Fee", FeeType::Fixed, dec!(10))
            .with_tax_rate(dec!(18))
            .apply(dec!(100));

        assert_eq!(
            TaxLabel::derive(&lines, None, &[fee], dec!(19.80)),
            TaxLabel::Combined
        );
    }

    #[test]
    fn label_zero_when_nothing_is_taxed() {
        let lines = [line(Decimal::ZERO, dec!(100))];

        let label = TaxLabel::derive(&lines, None, &[], Decimal::ZERO);

        assert_eq!(label, TaxLabel::Zero);
        assert_eq!(label.to_string(), "Tax (0%)");
        assert_eq!(TaxLabel::derive(&[], None, &[], Decimal::ZERO), TaxLabel::Zero);
    }

    #[test]
    fn assemble_balances_the_total() {
        let cart_lines = CartLines {
            lines: vec![line(dec!(18), dec!(400))],
            sum_of_displayed_prices: dec!(400),
            subtotal_base: dec!(400),
            warnings: smallvec::SmallVec::new(),
        };
        let promo = AppliedPromoCodeInfo {
            id: "p".to_string(),
            code: "FLAT50".to_string(),
            discount_type: FeeType::Fixed,
            discount_value: dec!(50),
            calculated_discount: dec!(50),
        };
        let fees = crate::fees::aggregate_platform_fees(
            &[PlatformFeeConfig::new("Convenience Fee", FeeType::Percentage, dec!(5))
                .with_tax_rate(dec!(18))],
            dec!(400),
        );

        let breakdown = PricingBreakdown::assemble(
            cart_lines,
            Some(promo),
            Some(charge(dec!(18), dec!(17.82))),
            fees,
        );

        // 72 line tax + 17.82 charge tax + 3.60 fee tax
        assert_eq!(breakdown.total_tax, dec!(93.42));
        // 400 + 99 - 50 + 20 + 93.42
        assert_eq!(breakdown.grand_total, dec!(562.42));
        assert_eq!(breakdown.discount_amount, dec!(50));
        assert_eq!(breakdown.effective_tax_label, TaxLabel::Combined);
    }

    #[test]
    fn empty_breakdown_is_all_zero() -> TestResult {
        let breakdown = PricingBreakdown::empty();

        assert!(breakdown.is_empty());
        assert_eq!(breakdown.grand_total_minor_units()?, 0);
        assert_eq!(breakdown.payable_amount(INR)?, Money::from_minor(0, INR));
        assert_eq!(breakdown.effective_tax_label, TaxLabel::Zero);

        Ok(())
    }

    #[test]
    fn payable_amount_is_in_minor_units() -> TestResult {
        let breakdown = PricingBreakdown {
            grand_total: dec!(1168.82),
            ..PricingBreakdown::empty()
        };

        assert_eq!(breakdown.grand_total_minor_units()?, 116_882);
        assert_eq!(breakdown.payable_amount(INR)?, Money::from_minor(116_882, INR));

        Ok(())
    }
}
