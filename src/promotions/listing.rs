//! Available Offers
//!
//! Filters promo codes down to the ones worth advertising for a cart.

use jiff::civil::DateTime;
use rust_decimal::Decimal;

use crate::promotions::{PromoCode, evaluator::check_eligibility};

/// Codes the customer could apply to a cart with this pre-discount subtotal.
///
/// Hidden codes are never listed. Per-customer limits are not checked here,
/// since they need a usage lookup.
pub fn list_available_promo_codes<'a>(
    promo_codes: impl IntoIterator<Item = &'a PromoCode>,
    sum_of_displayed_prices: Decimal,
    now: DateTime,
) -> Vec<&'a PromoCode> {
    promo_codes
        .into_iter()
        .filter(|promo| !promo.is_hidden)
        .filter(|promo| check_eligibility(promo, sum_of_displayed_prices, now).is_ok())
        .collect()
}
