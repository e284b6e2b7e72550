//! Visiting Charge
//!
//! A surcharge added when an order falls below the minimum booking amount.
//! The threshold is checked against the post-discount subtotal, so a promo
//! can push an order under the minimum.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    money::{round_money, sanitize_amount, sanitize_percent},
    tax::{base_price, tax_on},
};

/// Minimum booking policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumBookingPolicy {
    /// Whether the policy applies at all.
    #[serde(default)]
    pub enabled: bool,

    /// Orders strictly below this post-discount value pay the visiting charge.
    #[serde(default)]
    pub minimum_booking_amount: Decimal,

    /// Displayed visiting charge.
    #[serde(default)]
    pub visiting_charge_amount: Decimal,

    /// Whether the visiting charge already includes tax.
    #[serde(default)]
    pub is_tax_inclusive: bool,

    /// Tax rate on the visiting charge, in percent points.
    #[serde(default)]
    pub tax_percent: Decimal,

    /// Whether tax is added on the visiting charge.
    #[serde(default)]
    pub tax_on_charge_enabled: bool,
}

impl MinimumBookingPolicy {
    /// An enabled policy.
    pub fn new(minimum_booking_amount: Decimal, visiting_charge_amount: Decimal) -> Self {
        Self {
            enabled: true,
            minimum_booking_amount,
            visiting_charge_amount,
            ..Self::default()
        }
    }

    /// A policy that never applies.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Set how the visiting charge is taxed.
    #[must_use]
    pub fn with_tax(mut self, tax_percent: Decimal, is_tax_inclusive: bool) -> Self {
        self.tax_percent = tax_percent;
        self.is_tax_inclusive = is_tax_inclusive;
        self.tax_on_charge_enabled = true;
        self
    }
}

/// Visiting charge line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitingCharge {
    /// Charge as configured
    pub displayed: Decimal,

    /// Tax-exclusive charge
    pub base: Decimal,

    /// Rate applied, in percent points
    pub tax_percent: Decimal,

    /// Tax on the charge
    pub tax_amount: Decimal,

    /// Whether the configured charge included tax
    pub is_tax_inclusive: bool,
}

/// Visiting charge owed for an order, if any.
///
/// The charge applies when `0 < sum_of_displayed_prices - discount_amount < minimum`.
/// Reaching the minimum exactly does not trigger it.
pub fn calculate_visiting_charge(
    policy: &MinimumBookingPolicy,
    sum_of_displayed_prices: Decimal,
    discount_amount: Decimal,
) -> Option<VisitingCharge> {
    if !policy.enabled {
        return None;
    }

    let post_discount_subtotal = sum_of_displayed_prices - discount_amount;

    if post_discount_subtotal <= Decimal::ZERO
        || post_discount_subtotal >= policy.minimum_booking_amount
    {
        return None;
    }

    let displayed = sanitize_amount(
        policy.visiting_charge_amount,
        "visiting_charge_amount",
        "minimum_booking",
    );

    if displayed.is_zero() {
        return None;
    }

    let tax_percent = sanitize_percent(policy.tax_percent, "tax_percent", "minimum_booking");
    let unrounded_base = base_price(displayed, policy.is_tax_inclusive, tax_percent);

    let tax_amount = if policy.tax_on_charge_enabled {
        round_money(tax_on(unrounded_base, tax_percent))
    } else {
        Decimal::ZERO
    };

    debug!(%post_discount_subtotal, %displayed, "visiting charge applied");

    Some(VisitingCharge {
        displayed,
        base: round_money(unrounded_base),
        tax_percent,
        tax_amount,
        is_tax_inclusive: policy.is_tax_inclusive,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    fn policy() -> MinimumBookingPolicy {
        MinimumBookingPolicy::new(dec!(500), dec!(99)).with_tax(dec!(18), false)
    }

    #[test]
    fn below_minimum_adds_taxed_charge() -> TestResult {
        let charge =
            calculate_visiting_charge(&policy(), dec!(450), dec!(50)).ok_or("expected charge")?;

        assert_eq!(charge.displayed, dec!(99));
        assert_eq!(charge.base, dec!(99));
        assert_eq!(charge.tax_amount, dec!(17.82));

        Ok(())
    }

    #[test]
    fn reaching_minimum_exactly_is_enough() {
        assert_eq!(calculate_visiting_charge(&policy(), dec!(600), dec!(100)), None);
        assert_eq!(calculate_visiting_charge(&policy(), dec!(500), Decimal::ZERO), None);
    }

    #[test]
    fn nothing_to_charge_on_empty_or_fully_discounted_order() {
        assert_eq!(calculate_visiting_charge(&policy(), Decimal::ZERO, Decimal::ZERO), None);
        assert_eq!(calculate_visiting_charge(&policy(), dec!(300), dec!(300)), None);
    }

    #[test]
    fn disabled_policy_never_charges() {
        assert_eq!(
            calculate_visiting_charge(&MinimumBookingPolicy::disabled(), dec!(10), Decimal::ZERO),
            None
        );
    }

    #[test]
    fn inclusive_charge_is_split() -> TestResult {
        let policy = MinimumBookingPolicy::new(dec!(500), dec!(118)).with_tax(dec!(18), true);

        let charge =
            calculate_visiting_charge(&policy, dec!(200), Decimal::ZERO).ok_or("expected charge")?;

        assert_eq!(charge.base, dec!(100));
        assert_eq!(charge.tax_amount, dec!(18));

        Ok(())
    }

    #[test]
    fn tax_switch_off_charges_no_tax() -> TestResult {
        let policy = MinimumBookingPolicy {
            tax_on_charge_enabled: false,
            ..policy()
        };

        let charge =
            calculate_visiting_charge(&policy, dec!(200), Decimal::ZERO).ok_or("expected charge")?;

        assert_eq!(charge.base, dec!(99));
        assert_eq!(charge.tax_amount, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn negative_charge_is_ignored() {
        let policy = MinimumBookingPolicy::new(dec!(500), dec!(-99));

        assert_eq!(calculate_visiting_charge(&policy, dec!(200), Decimal::ZERO), None);
    }
}
