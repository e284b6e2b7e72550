//! Cart
//!
//! Cart entries and the per-line price and tax computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::warn;

use crate::{
    catalog::{CatalogLookup, ServiceId, ServicePriceRecord},
    money::{round_money, sanitize_percent},
    tax::{base_price, tax_on},
    warnings::PricingWarning,
};

/// A service and how many of it the customer booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Booked service
    pub service_id: ServiceId,

    /// Booked quantity, at least one.
    pub quantity: u32,
}

impl CartEntry {
    /// Create a new cart entry.
    pub fn new(service_id: impl Into<ServiceId>, quantity: u32) -> Self {
        Self {
            service_id: service_id.into(),
            quantity,
        }
    }
}

/// Priced cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreakdown {
    /// Booked service
    pub service_id: ServiceId,

    /// Service name
    pub name: String,

    /// Booked quantity
    pub quantity: u32,

    /// Effective displayed unit price
    pub unit_price: Decimal,

    /// `unit_price × quantity`
    pub line_displayed_total: Decimal,

    /// Tax-exclusive line total
    pub line_base_total: Decimal,

    /// Tax rate applied to the line, in percent points
    pub tax_percent: Decimal,

    /// Tax on the line base total
    pub tax_amount: Decimal,

    /// Whether the displayed price included tax
    pub is_tax_inclusive: bool,
}

impl LineBreakdown {
    /// Price one cart entry against its catalog record.
    pub fn compute(record: &ServicePriceRecord, quantity: u32) -> Self {
        let tax_percent = sanitize_percent(record.tax_percent, "tax_percent", record.id.as_str());
        let unit_price = record.unit_price(quantity);
        let quantity_dec = Decimal::from(quantity);

        let unrounded_base =
            base_price(unit_price, record.is_tax_inclusive, tax_percent) * quantity_dec;

        Self {
            service_id: record.id.clone(),
            name: record.name.clone(),
            quantity,
            unit_price,
            line_displayed_total: round_money(unit_price * quantity_dec),
            line_base_total: round_money(unrounded_base),
            tax_percent,
            tax_amount: round_money(tax_on(unrounded_base, tax_percent)),
            is_tax_inclusive: record.is_tax_inclusive,
        }
    }
}

/// Every priced line plus cart-level sums.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartLines {
    /// Priced lines, in cart order.
    pub lines: Vec<LineBreakdown>,

    /// Sum of displayed line totals, before any discount.
    pub sum_of_displayed_prices: Decimal,

    /// Sum of tax-exclusive line totals.
    pub subtotal_base: Decimal,

    /// Entries that were left out.
    pub warnings: SmallVec<[PricingWarning; 2]>,
}

impl CartLines {
    /// Sum of line taxes.
    pub fn total_tax(&self) -> Decimal {
        self.lines.iter().map(|line| line.tax_amount).sum()
    }

    /// Whether no line could be priced.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Price every cart entry that still resolves to a catalog record.
///
/// Entries whose service is missing, or whose quantity is zero, are dropped
/// and reported as warnings.
pub fn compute_lines(entries: &[CartEntry], catalog: &impl CatalogLookup) -> CartLines {
    let mut cart_lines = CartLines::default();

    for entry in entries {
        if entry.quantity == 0 {
            warn!(service_id = %entry.service_id, "cart entry with zero quantity skipped");

            cart_lines.warnings.push(PricingWarning::ZeroQuantity {
                service_id: entry.service_id.clone(),
            });

            continue;
        }

        let Some(record) = catalog.get_service(&entry.service_id) else {
            warn!(service_id = %entry.service_id, "stale cart entry skipped");

            cart_lines.warnings.push(PricingWarning::StaleCartEntry {
                service_id: entry.service_id.clone(),
            });

            continue;
        };

        let line = LineBreakdown::compute(record, entry.quantity);

        cart_lines.sum_of_displayed_prices += line.line_displayed_total;
        cart_lines.subtotal_base += line.line_base_total;
        cart_lines.lines.push(line);
    }

    cart_lines
}
