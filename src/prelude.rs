//! Booking pricing prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    breakdown::{PricingBreakdown, TaxLabel},
    cart::{CartEntry, LineBreakdown},
    catalog::{CatalogLookup, CatalogSnapshot, PriceTier, ServiceId, ServicePriceRecord, TierError},
    checkout::{CheckoutDraft, CheckoutError, OrderPricing, PaymentMethod},
    config::{ConfigError, ConfigProvider, PricingConfig},
    fees::{AppliedFee, FeeType, PlatformFeeConfig},
    fixtures::{Fixture, FixtureError},
    money::{AdjustmentType, PricingError},
    pricing::{Priced, compute_pricing, price_cart_lines},
    promotions::{
        AppliedPromoCodeInfo, DiscountType, PromoCode,
        evaluator::{EvaluationContext, evaluate_promo_code},
        listing::list_available_promo_codes,
        rejection::PromoRejectionReason,
        repository::{InMemoryPromoRepository, PromoRepository},
    },
    receipt::RenderError,
    surcharge::{MinimumBookingPolicy, VisitingCharge, calculate_visiting_charge},
    warnings::PricingWarning,
};
