//! Warnings
//!
//! Non-fatal conditions surfaced alongside a breakdown.

use thiserror::Error;

use crate::{catalog::ServiceId, promotions::rejection::PromoRejectionReason};

/// Something the caller should know about, which did not stop pricing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingWarning {
    /// A cart entry references a service missing from the catalog; it was left out.
    #[error("service {service_id} is no longer available")]
    StaleCartEntry {
        /// The missing service.
        service_id: ServiceId,
    },

    /// A cart entry had a zero quantity; it was left out.
    #[error("service {service_id} has a zero quantity")]
    ZeroQuantity {
        /// The affected service.
        service_id: ServiceId,
    },

    /// An applied promo code stopped qualifying and was removed.
    #[error("promo code {code} was removed: {reason}")]
    PromoRemoved {
        /// The removed code.
        code: String,

        /// Why it no longer qualifies.
        reason: PromoRejectionReason,
    },
}
