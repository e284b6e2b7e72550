//! Pricing
//!
//! One pure pass from cart entries to a [`PricingBreakdown`]. The pass runs
//! in a fixed order:
//!
//! 1. price every line and sum the pre-discount subtotal
//! 2. re-price the applied promo against that subtotal
//! 3. decide the visiting charge on the post-discount subtotal
//! 4. price platform fees on the pre-discount subtotal
//! 5. total everything up

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    breakdown::PricingBreakdown,
    cart::{CartEntry, CartLines, compute_lines},
    catalog::CatalogLookup,
    fees::{PlatformFeeConfig, aggregate_platform_fees},
    promotions::AppliedPromoCodeInfo,
    surcharge::{MinimumBookingPolicy, calculate_visiting_charge},
    warnings::PricingWarning,
};

/// Warnings raised by one pricing pass.
pub type PricingWarnings = SmallVec<[PricingWarning; 2]>;

/// A breakdown plus the non-fatal anomalies met while computing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Priced {
    /// Computed pricing
    pub breakdown: PricingBreakdown,

    /// Entries left out and other anomalies
    pub warnings: PricingWarnings,
}

/// Price a cart.
///
/// `applied_promo` must already have passed promo validation; only its
/// discount is re-computed here, clamped to the current subtotal. An empty
/// cart, or one where no entry resolves, prices to an all-zero breakdown.
#[tracing::instrument(skip_all, fields(entries = entries.len()))]
pub fn compute_pricing(
    entries: &[CartEntry],
    catalog: &impl CatalogLookup,
    applied_promo: Option<&AppliedPromoCodeInfo>,
    platform_fees: &[PlatformFeeConfig],
    minimum_booking: &MinimumBookingPolicy,
) -> Priced {
    price_cart_lines(
        compute_lines(entries, catalog),
        applied_promo,
        platform_fees,
        minimum_booking,
    )
}

/// Price lines that were already computed with [`compute_lines`].
///
/// On an empty cart the applied promo stays on the breakdown with a zero
/// discount, so it takes effect again once services are added.
pub fn price_cart_lines(
    mut cart_lines: CartLines,
    applied_promo: Option<&AppliedPromoCodeInfo>,
    platform_fees: &[PlatformFeeConfig],
    minimum_booking: &MinimumBookingPolicy,
) -> Priced {
    let warnings = std::mem::take(&mut cart_lines.warnings);
    let sum_of_displayed_prices = cart_lines.sum_of_displayed_prices;

    let applied_promo = applied_promo.map(|promo| promo.repriced(sum_of_displayed_prices));

    if cart_lines.is_empty() {
        debug!("nothing to price");

        return Priced {
            breakdown: PricingBreakdown {
                applied_promo_code: applied_promo,
                ..PricingBreakdown::empty()
            },
            warnings,
        };
    }

    let discount_amount = applied_promo
        .as_ref()
        .map(|promo| promo.calculated_discount)
        .unwrap_or_default();

    let visiting_charge =
        calculate_visiting_charge(minimum_booking, sum_of_displayed_prices, discount_amount);

    let fees = aggregate_platform_fees(platform_fees, sum_of_displayed_prices);

    let breakdown = PricingBreakdown::assemble(cart_lines, applied_promo, visiting_charge, fees);

    debug!(
        %sum_of_displayed_prices,
        %discount_amount,
        total_tax = %breakdown.total_tax,
        grand_total = %breakdown.grand_total,
        "cart priced"
    );

    Priced {
        breakdown,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::{
        breakdown::TaxLabel,
        catalog::{CatalogSnapshot, ServiceId, ServicePriceRecord},
        fees::FeeType,
        promotions::{DiscountType, PromoCode},
    };

    use super::*;

    fn catalog() -> CatalogSnapshot {
        [
            ServicePriceRecord::new("deep-clean", "Deep Cleaning", dec!(1180))
                .with_tax(dec!(18), true),
            ServicePriceRecord::new("fan", "Fan Repair", dec!(250)).with_tax(dec!(18), false),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn prices_lines_discount_and_fees() -> TestResult {
        let promo = AppliedPromoCodeInfo::from_promo(
            &PromoCode::new("p", "SAVE10", DiscountType::Percentage, dec!(10)),
            dec!(1430),
        );
        let fees = [
            PlatformFeeConfig::new("Convenience Fee", FeeType::Fixed, dec!(29))
                .with_tax_rate(dec!(18)),
        ];

        let priced = compute_pricing(
            &[CartEntry::new("deep-clean", 1), CartEntry::new("fan", 1)],
            &catalog(),
            Some(&promo),
            &fees,
            &MinimumBookingPolicy::new(dec!(299), dec!(49)),
        );
        let breakdown = priced.breakdown;

        assert!(priced.warnings.is_empty());
        assert_eq!(breakdown.sum_of_displayed_prices, dec!(1430));
        assert_eq!(breakdown.subtotal_base, dec!(1250));
        assert_eq!(breakdown.discount_amount, dec!(143));
        assert_eq!(breakdown.visiting_charge, None);
        // 180 + 45 line tax + 5.22 fee tax
        assert_eq!(breakdown.total_tax, dec!(230.22));
        // 1250 - 143 + 29 + 230.22
        assert_eq!(breakdown.grand_total, dec!(1366.22));
        assert_eq!(breakdown.effective_tax_label, TaxLabel::Combined);

        Ok(())
    }

    #[test]
    fn promo_is_repriced_against_current_subtotal() -> TestResult {
        let promo = AppliedPromoCodeInfo::from_promo(
            &PromoCode::new("p", "FLAT500", DiscountType::Fixed, dec!(500)),
            dec!(5000),
        );

        let priced = compute_pricing(
            &[CartEntry::new("fan", 1)],
            &catalog(),
            Some(&promo),
            &[],
            &MinimumBookingPolicy::disabled(),
        );

        let applied = priced
            .breakdown
            .applied_promo_code
            .ok_or("promo should stay applied")?;

        assert_eq!(applied.calculated_discount, dec!(250));
        assert_eq!(priced.breakdown.discount_amount, dec!(250));

        Ok(())
    }

    #[test]
    fn empty_cart_prices_to_zero() -> TestResult {
        let promo = AppliedPromoCodeInfo::from_promo(
            &PromoCode::new("p", "FLAT50", DiscountType::Fixed, dec!(50)),
            dec!(500),
        );

        let priced = compute_pricing(
            &[],
            &catalog(),
            Some(&promo),
            &[PlatformFeeConfig::new("Convenience Fee", FeeType::Fixed, dec!(29))],
            &MinimumBookingPolicy::new(dec!(299), dec!(49)),
        );

        let applied = priced
            .breakdown
            .applied_promo_code
            .clone()
            .ok_or("promo should stay applied")?;

        assert_eq!(applied.code, "FLAT50");
        assert_eq!(applied.calculated_discount, Decimal::ZERO);
        assert_eq!(
            priced.breakdown,
            PricingBreakdown {
                applied_promo_code: Some(applied),
                ..PricingBreakdown::empty()
            }
        );
        assert!(priced.warnings.is_empty());

        Ok(())
    }

    #[test]
    fn stale_entries_are_reported_and_skipped() {
        let priced = compute_pricing(
            &[CartEntry::new("fan", 2), CartEntry::new("retired", 1)],
            &catalog(),
            None,
            &[],
            &MinimumBookingPolicy::disabled(),
        );

        assert_eq!(priced.breakdown.line_items.len(), 1);
        assert_eq!(priced.breakdown.sum_of_displayed_prices, dec!(500));
        assert_eq!(
            priced.warnings.as_slice(),
            &[PricingWarning::StaleCartEntry {
                service_id: ServiceId::from("retired")
            }]
        );
    }

    #[test]
    fn discount_can_trigger_visiting_charge() -> TestResult {
        let promo = AppliedPromoCodeInfo::from_promo(
            &PromoCode::new("p", "FLAT100", DiscountType::Fixed, dec!(100)),
            dec!(500),
        );

        let priced = compute_pricing(
            &[CartEntry::new("fan", 2)],
            &catalog(),
            Some(&promo),
            &[],
            &MinimumBookingPolicy::new(dec!(499), dec!(49)),
        );

        let charge = priced
            .breakdown
            .visiting_charge
            .ok_or("expected visiting charge")?;

        assert_eq!(charge.base, dec!(49));
        assert_eq!(charge.tax_amount, Decimal::ZERO);
        // 500 + 49 - 100 + 90 line tax
        assert_eq!(priced.breakdown.grand_total, dec!(539));

        Ok(())
    }

    #[test]
    fn same_inputs_price_identically() {
        let entries = [CartEntry::new("deep-clean", 3), CartEntry::new("fan", 1)];
        let fees = [PlatformFeeConfig::new("Convenience Fee", FeeType::Percentage, dec!(2.5))];
        let policy = MinimumBookingPolicy::new(dec!(299), dec!(49));

        let first = compute_pricing(&entries, &catalog(), None, &fees, &policy);
        let second = compute_pricing(&entries, &catalog(), None, &fees, &policy);

        assert_eq!(first, second);
    }
}
