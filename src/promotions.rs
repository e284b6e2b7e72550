//! Promotions
//!
//! Promo codes, their eligibility rules and the discount they grant.

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{AdjustmentType, round_money, sanitize_amount};

pub mod evaluator;
pub mod listing;
pub mod rejection;
pub mod repository;

/// How a promo code's value is applied.
pub type DiscountType = AdjustmentType;

/// Normalise a customer-entered code for lookup.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn default_active() -> bool {
    true
}

/// Promo code document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCode {
    /// Document identifier
    pub id: String,

    /// Code the customer types
    pub code: String,

    /// Percentage or fixed discount
    pub discount_type: DiscountType,

    /// Percent points or amount, depending on `discount_type`.
    pub discount_value: Decimal,

    /// Minimum pre-discount order value
    #[serde(default)]
    pub min_booking_amount: Option<Decimal>,

    /// Global redemption cap
    #[serde(default)]
    pub max_uses: Option<u32>,

    /// Per-customer redemption cap
    #[serde(default)]
    pub max_uses_per_user: Option<u32>,

    /// Redemptions so far, across all customers
    #[serde(default)]
    pub uses_count: u32,

    /// First valid day, from its start
    #[serde(default)]
    pub valid_from: Option<Date>,

    /// Last valid day, to its end
    #[serde(default)]
    pub valid_until: Option<Date>,

    /// Switched off codes never apply.
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Hidden codes work when typed but are never advertised.
    #[serde(default)]
    pub is_hidden: bool,
}

impl PromoCode {
    /// Create an active, unrestricted code.
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        discount_type: DiscountType,
        discount_value: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            discount_type,
            discount_value,
            min_booking_amount: None,
            max_uses: None,
            max_uses_per_user: None,
            uses_count: 0,
            valid_from: None,
            valid_until: None,
            is_active: true,
            is_hidden: false,
        }
    }

    /// Whether `code` refers to this promo.
    pub fn matches(&self, code: &str) -> bool {
        normalize_code(&self.code) == normalize_code(code)
    }

    /// Discount granted against a pre-discount subtotal, clamped to `[0, subtotal]`.
    pub fn discount_for(&self, sum_of_displayed_prices: Decimal) -> Decimal {
        clamped_discount(
            self.discount_type,
            self.discount_value,
            sum_of_displayed_prices,
            &self.code,
        )
    }
}

fn clamped_discount(
    discount_type: DiscountType,
    discount_value: Decimal,
    sum_of_displayed_prices: Decimal,
    code: &str,
) -> Decimal {
    let value = sanitize_amount(discount_value, "discount_value", code);
    let ceiling = sum_of_displayed_prices.max(Decimal::ZERO);

    round_money(discount_type.amount_on(value, ceiling)).clamp(Decimal::ZERO, ceiling)
}

/// A promo code that passed validation, with the discount it granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPromoCodeInfo {
    /// Promo document identifier
    pub id: String,

    /// Code as stored
    pub code: String,

    /// Percentage or fixed discount
    pub discount_type: DiscountType,

    /// Configured value
    pub discount_value: Decimal,

    /// Discount granted, already clamped
    pub calculated_discount: Decimal,
}

impl AppliedPromoCodeInfo {
    /// Apply `promo` against a pre-discount subtotal.
    pub fn from_promo(promo: &PromoCode, sum_of_displayed_prices: Decimal) -> Self {
        Self {
            id: promo.id.clone(),
            code: promo.code.clone(),
            discount_type: promo.discount_type,
            discount_value: promo.discount_value,
            calculated_discount: promo.discount_for(sum_of_displayed_prices),
        }
    }

    /// The same promo re-priced against a new pre-discount subtotal.
    #[must_use]
    pub fn repriced(&self, sum_of_displayed_prices: Decimal) -> Self {
        Self {
            calculated_discount: clamped_discount(
                self.discount_type,
                self.discount_value,
                sum_of_displayed_prices,
                &self.code,
            ),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn codes_match_case_insensitively() {
        let promo = PromoCode::new("p1", "Save10", DiscountType::Percentage, dec!(10));

        assert!(promo.matches(" save10 "));
        assert!(promo.matches("SAVE10"));
        assert!(!promo.matches("SAVE20"));
    }

    #[test]
    fn percentage_discount_is_share_of_subtotal() {
        let promo = PromoCode::new("p1", "SAVE10", DiscountType::Percentage, dec!(10));

        assert_eq!(promo.discount_for(dec!(1000)), dec!(100));
        assert_eq!(promo.discount_for(dec!(333.33)), dec!(33.33));
    }

    #[test]
    fn fixed_discount_is_clamped_to_subtotal() {
        let promo = PromoCode::new("p1", "FLAT500", DiscountType::Fixed, dec!(500));

        assert_eq!(promo.discount_for(dec!(1000)), dec!(500));
        assert_eq!(promo.discount_for(dec!(300)), dec!(300));
        assert_eq!(promo.discount_for(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn oversized_percentage_is_clamped() {
        let promo = PromoCode::new("p1", "FREE", DiscountType::Percentage, dec!(150));

        assert_eq!(promo.discount_for(dec!(200)), dec!(200));
    }

    #[test]
    fn negative_discount_value_grants_nothing() {
        let promo = PromoCode::new("p1", "BROKEN", DiscountType::Fixed, dec!(-50));

        assert_eq!(promo.discount_for(dec!(200)), Decimal::ZERO);
    }

    #[test]
    fn repriced_follows_the_new_subtotal() {
        let promo = PromoCode::new("p1", "SAVE10", DiscountType::Percentage, dec!(10));
        let applied = AppliedPromoCodeInfo::from_promo(&promo, dec!(1000));

        assert_eq!(applied.calculated_discount, dec!(100));
        assert_eq!(applied.repriced(dec!(400)).calculated_discount, dec!(40));
        assert_eq!(applied.repriced(dec!(400)).code, "SAVE10");
    }
}
