//! Catalog
//!
//! Price records for bookable services and the lookup seam the pricing engine
//! reads them through.

use std::fmt;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Service identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Create a new service identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Quantity band with its own unit price.
///
/// Both bounds are inclusive; a missing `to_quantity` leaves the band open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Smallest quantity in the band.
    pub from_quantity: u32,

    /// Largest quantity in the band.
    #[serde(default)]
    pub to_quantity: Option<u32>,

    /// Displayed unit price inside the band.
    pub price: Decimal,
}

impl PriceTier {
    /// Create a new band.
    pub fn new(from_quantity: u32, to_quantity: Option<u32>, price: Decimal) -> Self {
        Self {
            from_quantity,
            to_quantity,
            price,
        }
    }

    /// Whether `quantity` falls inside this band.
    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.from_quantity && self.to_quantity.is_none_or(|to| quantity <= to)
    }
}

/// Invalid quantity bands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TierError {
    /// A band ends before it starts.
    #[error("tier {index} starts at {from} but ends at {to}")]
    Inverted {
        /// Band position
        index: usize,
        /// Band start
        from: u32,
        /// Band end
        to: u32,
    },

    /// A band starts inside or before the band preceding it.
    #[error("tier {index} overlaps or is out of order with the tier before it")]
    Overlapping {
        /// Band position
        index: usize,
    },

    /// A band follows an open-ended band.
    #[error("tier {index} follows an open-ended tier")]
    AfterOpenEnded {
        /// Band position
        index: usize,
    },
}

/// Check that bands are well-formed, ascending and non-overlapping.
///
/// # Errors
///
/// Returns the first [`TierError`] found, scanning from the lowest band.
pub fn validate_tiers(tiers: &[PriceTier]) -> Result<(), TierError> {
    for (index, tier) in tiers.iter().enumerate() {
        if let Some(to) = tier.to_quantity
            && to < tier.from_quantity
        {
            return Err(TierError::Inverted {
                index,
                from: tier.from_quantity,
                to,
            });
        }
    }

    for (index, pair) in tiers.windows(2).enumerate() {
        let [previous, next] = pair else {
            continue;
        };

        match previous.to_quantity {
            None => return Err(TierError::AfterOpenEnded { index: index + 1 }),
            Some(to) if next.from_quantity <= to => {
                return Err(TierError::Overlapping { index: index + 1 });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Price record for one bookable service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePriceRecord {
    /// Service identifier
    pub id: ServiceId,

    /// Customer-facing name
    pub name: String,

    /// Displayed unit price, possibly tax-inclusive.
    pub displayed_price: Decimal,

    /// Optional sale price; only used when strictly below `displayed_price`.
    #[serde(default)]
    pub discounted_price: Option<Decimal>,

    /// Whether displayed prices already include tax.
    #[serde(default)]
    pub is_tax_inclusive: bool,

    /// Tax rate in percent points.
    #[serde(default)]
    pub tax_percent: Decimal,

    /// Switch for quantity-tiered pricing.
    #[serde(default)]
    pub has_price_variants: bool,

    /// Quantity bands, ascending.
    #[serde(default)]
    pub price_variants: Vec<PriceTier>,
}

impl ServicePriceRecord {
    /// Create a tax-free record with a single displayed price.
    pub fn new(id: impl Into<ServiceId>, name: impl Into<String>, displayed_price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            displayed_price,
            discounted_price: None,
            is_tax_inclusive: false,
            tax_percent: Decimal::ZERO,
            has_price_variants: false,
            price_variants: Vec::new(),
        }
    }

    /// Set the sale price.
    #[must_use]
    pub fn with_discounted_price(mut self, discounted_price: Decimal) -> Self {
        self.discounted_price = Some(discounted_price);
        self
    }

    /// Set the tax rate and whether displayed prices include it.
    #[must_use]
    pub fn with_tax(mut self, tax_percent: Decimal, is_tax_inclusive: bool) -> Self {
        self.tax_percent = tax_percent;
        self.is_tax_inclusive = is_tax_inclusive;
        self
    }

    /// Enable quantity-tiered pricing with the given bands.
    ///
    /// # Errors
    ///
    /// Returns a [`TierError`] if the bands are malformed.
    pub fn with_price_variants(mut self, tiers: Vec<PriceTier>) -> Result<Self, TierError> {
        validate_tiers(&tiers)?;

        self.has_price_variants = true;
        self.price_variants = tiers;

        Ok(self)
    }

    /// The band matching `quantity`, when tiered pricing is enabled.
    pub fn matching_tier(&self, quantity: u32) -> Option<&PriceTier> {
        if !self.has_price_variants {
            return None;
        }

        self.price_variants
            .iter()
            .find(|tier| tier.contains(quantity))
    }

    /// Effective displayed unit price for `quantity`.
    ///
    /// A matching band wins outright; otherwise the sale price applies when it
    /// is strictly lower than the displayed price.
    pub fn unit_price(&self, quantity: u32) -> Decimal {
        if let Some(tier) = self.matching_tier(quantity) {
            return tier.price;
        }

        match self.discounted_price {
            Some(discounted) if discounted < self.displayed_price => discounted,
            _ => self.displayed_price,
        }
    }
}

/// Read access to service price records.
pub trait CatalogLookup {
    /// Fetch the record for `id`, if the service still exists.
    fn get_service(&self, id: &ServiceId) -> Option<&ServicePriceRecord>;
}

/// In-memory catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    services: FxHashMap<ServiceId, ServicePriceRecord>,
}

impl CatalogSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record, returning the record it replaced.
    pub fn insert(&mut self, record: ServicePriceRecord) -> Option<ServicePriceRecord> {
        self.services.insert(record.id.clone(), record)
    }

    /// Number of services in the snapshot.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl CatalogLookup for CatalogSnapshot {
    fn get_service(&self, id: &ServiceId) -> Option<&ServicePriceRecord> {
        self.services.get(id)
    }
}

impl FromIterator<ServicePriceRecord> for CatalogSnapshot {
    fn from_iter<I: IntoIterator<Item = ServicePriceRecord>>(iter: I) -> Self {
        let mut snapshot = Self::new();

        for record in iter {
            snapshot.insert(record);
        }

        snapshot
    }
}
