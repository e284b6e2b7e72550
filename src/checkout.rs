//! Checkout
//!
//! [`CheckoutDraft`] carries a customer's cart through checkout. Every
//! mutation ends in [`CheckoutDraft::recompute`], which re-validates the
//! applied promo and rebuilds the breakdown from scratch, so the breakdown
//! always reflects the draft's current inputs.

use jiff::civil::DateTime;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    breakdown::PricingBreakdown,
    cart::{CartEntry, LineBreakdown, compute_lines},
    catalog::{CatalogLookup, ServiceId},
    config::ConfigProvider,
    fees::AppliedFee,
    money::{PricingError, to_minor_units},
    pricing::{Priced, PricingWarnings, price_cart_lines},
    promotions::{
        AppliedPromoCodeInfo, PromoCode,
        evaluator::{EvaluationContext, evaluate_promo_code},
        listing::list_available_promo_codes,
        rejection::PromoRejectionReason,
        repository::PromoRepository,
    },
    surcharge::VisitingCharge,
    warnings::PricingWarning,
};

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid online before the visit.
    Online,

    /// Paid to the professional once the work is done.
    PayAfterService,
}

/// Errors placing an order
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing in the cart can be priced.
    #[error("cannot place an order for an empty cart")]
    EmptyCart,

    /// No payment method was chosen.
    #[error("no payment method selected")]
    MissingPaymentMethod,

    /// The payable amount could not be handed over.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Immutable pricing snapshot of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPricing {
    /// Customer placing the order
    pub user_id: Option<String>,

    /// When the order was priced
    pub priced_at: DateTime,

    /// Chosen payment method
    pub payment_method: PaymentMethod,

    /// ISO 4217 currency code
    pub currency: String,

    /// Priced lines
    pub line_items: Vec<LineBreakdown>,

    /// Displayed subtotal before discount
    pub sum_of_displayed_prices: Decimal,

    /// Tax-exclusive subtotal
    pub subtotal_base: Decimal,

    /// Applied promo code
    pub promo_code: Option<String>,

    /// Promo discount
    pub discount_amount: Decimal,

    /// Minimum booking surcharge
    pub visiting_charge: Option<VisitingCharge>,

    /// Platform fees
    pub platform_fees: Vec<AppliedFee>,

    /// Customer-facing tax caption
    pub tax_label: String,

    /// All taxes
    pub total_tax: Decimal,

    /// Amount payable
    pub grand_total: Decimal,

    /// Amount payable, in minor units of `currency`
    pub payable_minor_units: i64,
}

impl OrderPricing {
    /// Snapshot a breakdown.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: the breakdown prices no lines.
    /// - [`CheckoutError::Pricing`]: the grand total has no minor-unit representation.
    pub fn from_breakdown(
        breakdown: &PricingBreakdown,
        currency: &'static Currency,
        payment_method: PaymentMethod,
        priced_at: DateTime,
        user_id: Option<String>,
    ) -> Result<Self, CheckoutError> {
        if breakdown.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let payable_minor_units = to_minor_units(breakdown.grand_total, currency.exponent)?;

        Ok(Self {
            user_id,
            priced_at,
            payment_method,
            currency: currency.iso_alpha_code.to_string(),
            line_items: breakdown.line_items.clone(),
            sum_of_displayed_prices: breakdown.sum_of_displayed_prices,
            subtotal_base: breakdown.subtotal_base,
            promo_code: breakdown
                .applied_promo_code
                .as_ref()
                .map(|promo| promo.code.clone()),
            discount_amount: breakdown.discount_amount,
            visiting_charge: breakdown.visiting_charge.clone(),
            platform_fees: breakdown.platform_fees.clone(),
            tax_label: breakdown.effective_tax_label.to_string(),
            total_tax: breakdown.total_tax,
            grand_total: breakdown.grand_total,
            payable_minor_units,
        })
    }
}

/// A cart on its way through checkout.
#[derive(Debug)]
pub struct CheckoutDraft<'a, C, R, P> {
    catalog: &'a C,
    promo_codes: &'a R,
    config: P,
    user_id: Option<String>,
    now: DateTime,
    entries: Vec<CartEntry>,
    applied_promo: Option<AppliedPromoCodeInfo>,
    payment_method: Option<PaymentMethod>,
    priced: Priced,
}

impl<'a, C, R, P> CheckoutDraft<'a, C, R, P>
where
    C: CatalogLookup,
    R: PromoRepository,
    P: ConfigProvider,
{
    /// Start an empty draft.
    pub fn new(catalog: &'a C, promo_codes: &'a R, config: P, now: DateTime) -> Self {
        Self {
            catalog,
            promo_codes,
            config,
            user_id: None,
            now,
            entries: Vec::new(),
            applied_promo: None,
            payment_method: None,
            priced: Priced {
                breakdown: PricingBreakdown::empty(),
                warnings: PricingWarnings::new(),
            },
        }
    }

    /// Attach the signed-in customer, enabling per-customer promo limits.
    #[must_use]
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.recompute();
        self
    }

    /// Add `quantity` of a service, merging with an existing entry.
    pub fn add_service(&mut self, service_id: impl Into<ServiceId>, quantity: u32) {
        let service_id = service_id.into();

        match self
            .entries
            .iter_mut()
            .find(|entry| entry.service_id == service_id)
        {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => self.entries.push(CartEntry::new(service_id, quantity)),
        }

        self.recompute();
    }

    /// Set a service's quantity. Zero removes the service.
    pub fn set_quantity(&mut self, service_id: &ServiceId, quantity: u32) {
        if quantity == 0 {
            self.remove_service(service_id);
            return;
        }

        match self
            .entries
            .iter_mut()
            .find(|entry| &entry.service_id == service_id)
        {
            Some(entry) => entry.quantity = quantity,
            None => self
                .entries
                .push(CartEntry::new(service_id.clone(), quantity)),
        }

        self.recompute();
    }

    /// Remove a service, returning whether it was in the cart.
    pub fn remove_service(&mut self, service_id: &ServiceId) -> bool {
        let before = self.entries.len();

        self.entries.retain(|entry| &entry.service_id != service_id);

        let removed = self.entries.len() != before;

        self.recompute();

        removed
    }

    /// Validate and apply a promo code, replacing any applied one.
    ///
    /// A rejected code leaves the draft unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule's [`PromoRejectionReason`].
    pub fn apply_promo_code(
        &mut self,
        code: &str,
    ) -> Result<AppliedPromoCodeInfo, PromoRejectionReason> {
        let sum_of_displayed_prices = self.priced.breakdown.sum_of_displayed_prices;

        let applied = evaluate_promo_code(
            code,
            sum_of_displayed_prices,
            self.promo_codes.find_by_code(code),
            &self.evaluation_context(code),
        )?;

        self.applied_promo = Some(applied.clone());
        self.recompute();

        Ok(applied)
    }

    /// Remove the applied promo code, returning it.
    pub fn remove_promo_code(&mut self) -> Option<AppliedPromoCodeInfo> {
        let removed = self.applied_promo.take();

        self.recompute();

        removed
    }

    /// Swap in new pricing configuration.
    pub fn reload_config(&mut self, config: P) {
        self.config = config;
        self.recompute();
    }

    /// Move the draft's clock.
    pub fn set_now(&mut self, now: DateTime) {
        self.now = now;
        self.recompute();
    }

    /// Choose how the customer pays.
    pub fn set_payment_method(&mut self, payment_method: PaymentMethod) {
        self.payment_method = Some(payment_method);
    }

    /// Rebuild the breakdown from the draft's current inputs.
    ///
    /// An applied promo is run through every rule again against the new
    /// subtotal. If it fails, it is removed and a
    /// [`PricingWarning::PromoRemoved`] is reported. A promo that still
    /// qualifies on an emptied cart stays applied with a zero discount.
    #[tracing::instrument(skip_all, fields(entries = self.entries.len()))]
    pub fn recompute(&mut self) {
        let cart_lines = compute_lines(&self.entries, self.catalog);

        let mut removed = None;

        if let Some(applied) = self.applied_promo.take() {
            match self.revalidate(&applied.code, cart_lines.sum_of_displayed_prices) {
                Ok(revalidated) => self.applied_promo = Some(revalidated),
                Err(reason) => {
                    warn!(code = %applied.code, %reason, "applied promo code removed");

                    removed = Some(PricingWarning::PromoRemoved {
                        code: applied.code,
                        reason,
                    });
                }
            }
        }

        self.priced = price_cart_lines(
            cart_lines,
            self.applied_promo.as_ref(),
            self.config.platform_fees(),
            self.config.minimum_booking_policy(),
        );

        self.priced.warnings.extend(removed);

        debug!(
            grand_total = %self.priced.breakdown.grand_total,
            warnings = self.priced.warnings.len(),
            "checkout recomputed"
        );
    }

    fn revalidate(
        &self,
        code: &str,
        sum_of_displayed_prices: Decimal,
    ) -> Result<AppliedPromoCodeInfo, PromoRejectionReason> {
        evaluate_promo_code(
            code,
            sum_of_displayed_prices,
            self.promo_codes.find_by_code(code),
            &self.evaluation_context(code),
        )
    }

    fn evaluation_context(&self, code: &str) -> EvaluationContext {
        let context = EvaluationContext::at(self.now);

        match &self.user_id {
            Some(user_id) => {
                context.with_user_usage(self.promo_codes.count_user_usage(user_id, code))
            }
            None => context,
        }
    }

    /// Promo codes worth advertising for the current cart.
    pub fn available_promo_codes(&self) -> Vec<&'a PromoCode> {
        list_available_promo_codes(
            self.promo_codes.list_active(),
            self.priced.breakdown.sum_of_displayed_prices,
            self.now,
        )
    }

    /// Snapshot the order for payment.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: nothing in the cart can be priced.
    /// - [`CheckoutError::MissingPaymentMethod`]: no payment method was chosen.
    /// - [`CheckoutError::Pricing`]: the grand total has no minor-unit representation.
    pub fn place_order(&self) -> Result<OrderPricing, CheckoutError> {
        if self.priced.breakdown.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let payment_method = self
            .payment_method
            .ok_or(CheckoutError::MissingPaymentMethod)?;

        OrderPricing::from_breakdown(
            &self.priced.breakdown,
            self.config.payment_currency(),
            payment_method,
            self.now,
            self.user_id.clone(),
        )
    }

    /// Current breakdown.
    pub fn breakdown(&self) -> &PricingBreakdown {
        &self.priced.breakdown
    }

    /// Warnings from the latest recompute.
    pub fn warnings(&self) -> &[PricingWarning] {
        &self.priced.warnings
    }

    /// Cart entries, in the order they were added.
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Applied promo code, if it still qualifies.
    pub fn applied_promo(&self) -> Option<&AppliedPromoCodeInfo> {
        self.applied_promo.as_ref()
    }

    /// Chosen payment method.
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Configuration in force.
    pub fn config(&self) -> &P {
        &self.config
    }
}
