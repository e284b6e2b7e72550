//! Promo Code Evaluation
//!
//! Rules run in a fixed order and stop at the first failure:
//!
//! 1. the code exists
//! 2. the promo is active
//! 3. the validity window has started (from the start of `valid_from`)
//! 4. the validity window has not ended (until the end of `valid_until`)
//! 5. the pre-discount subtotal meets `min_booking_amount`
//! 6. global redemptions are below `max_uses`
//! 7. the customer's redemptions are below `max_uses_per_user`

use jiff::civil::{DateTime, Time};
use rust_decimal::Decimal;
use tracing::debug;

use crate::promotions::{AppliedPromoCodeInfo, PromoCode, rejection::PromoRejectionReason};

/// Caller-supplied facts a promo is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationContext {
    /// Current local date-time of the marketplace.
    pub now: DateTime,

    /// How often this customer already redeemed the code, when known.
    ///
    /// `None` skips the per-customer rule.
    pub user_usage_count: Option<u32>,
}

impl EvaluationContext {
    /// Context with no known customer usage.
    pub fn at(now: DateTime) -> Self {
        Self {
            now,
            user_usage_count: None,
        }
    }

    /// Attach the customer's usage count.
    #[must_use]
    pub fn with_user_usage(mut self, count: u32) -> Self {
        self.user_usage_count = Some(count);
        self
    }
}

/// Check rules 2 to 6 for an already-resolved promo.
///
/// # Errors
///
/// Returns the first failing rule's [`PromoRejectionReason`].
pub fn check_eligibility(
    promo: &PromoCode,
    sum_of_displayed_prices: Decimal,
    now: DateTime,
) -> Result<(), PromoRejectionReason> {
    if !promo.is_active {
        return Err(PromoRejectionReason::Inactive);
    }

    if let Some(valid_from) = promo.valid_from
        && now < valid_from.to_datetime(Time::midnight())
    {
        return Err(PromoRejectionReason::NotYetValid);
    }

    if let Some(valid_until) = promo.valid_until
        && now > valid_until.to_datetime(Time::MAX)
    {
        return Err(PromoRejectionReason::Expired);
    }

    if let Some(minimum) = promo.min_booking_amount
        && sum_of_displayed_prices < minimum
    {
        return Err(PromoRejectionReason::MinimumNotMet);
    }

    if let Some(max_uses) = promo.max_uses
        && promo.uses_count >= max_uses
    {
        return Err(PromoRejectionReason::GlobalLimitReached);
    }

    Ok(())
}

/// Validate `code` against the promo it resolved to and compute its discount.
///
/// `promo` is the repository lookup result for `code`; a lookup that found a
/// document for a different code counts as not found.
///
/// # Errors
///
/// Returns the first failing rule's [`PromoRejectionReason`]. Rejections are
/// ordinary outcomes: the caller prices the order without a discount.
pub fn evaluate_promo_code(
    code: &str,
    sum_of_displayed_prices: Decimal,
    promo: Option<&PromoCode>,
    context: &EvaluationContext,
) -> Result<AppliedPromoCodeInfo, PromoRejectionReason> {
    let result = evaluate(code, sum_of_displayed_prices, promo, context);

    if let Err(reason) = &result {
        debug!(code, %reason, "promo code rejected");
    }

    result
}

fn evaluate(
    code: &str,
    sum_of_displayed_prices: Decimal,
    promo: Option<&PromoCode>,
    context: &EvaluationContext,
) -> Result<AppliedPromoCodeInfo, PromoRejectionReason> {
    let promo = promo
        .filter(|promo| promo.matches(code))
        .ok_or(PromoRejectionReason::NotFound)?;

    check_eligibility(promo, sum_of_displayed_prices, context.now)?;

    if let (Some(limit), Some(used)) = (promo.max_uses_per_user, context.user_usage_count)
        && used >= limit
    {
        return Err(PromoRejectionReason::PerUserLimitReached);
    }

    Ok(AppliedPromoCodeInfo::from_promo(
        promo,
        sum_of_displayed_prices,
    ))
}
