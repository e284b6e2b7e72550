//! Promo Code Rejections

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a promo code was not applied.
///
/// Variants are listed in the order the rules are checked.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoRejectionReason {
    /// No promo exists for the code.
    #[error("promo code not found")]
    NotFound,

    /// The promo has been switched off.
    #[error("promo code is not active")]
    Inactive,

    /// The promo's validity window has not started.
    #[error("promo code is not valid yet")]
    NotYetValid,

    /// The promo's validity window has ended.
    #[error("promo code has expired")]
    Expired,

    /// The order is below the promo's minimum booking amount.
    #[error("order total is below the promo code's minimum")]
    MinimumNotMet,

    /// The promo has been redeemed as often as allowed.
    #[error("promo code usage limit reached")]
    GlobalLimitReached,

    /// This customer has redeemed the promo as often as allowed.
    #[error("promo code already used the maximum number of times")]
    PerUserLimitReached,
}
