//! Catalog Fixtures

use serde::Deserialize;

use crate::{
    catalog::{CatalogSnapshot, ServicePriceRecord, validate_tiers},
    fixtures::FixtureError,
};

/// Wrapper for catalog records in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Service price records
    pub services: Vec<ServicePriceRecord>,
}

impl CatalogFixture {
    /// Convert to a catalog snapshot
    ///
    /// # Errors
    ///
    /// - [`FixtureError::InvalidTiers`]: a service's price bands overlap or are inverted.
    /// - [`FixtureError::DuplicateService`]: two records share a service id.
    pub fn try_into_snapshot(self) -> Result<CatalogSnapshot, FixtureError> {
        let mut snapshot = CatalogSnapshot::new();

        for record in self.services {
            validate_tiers(&record.price_variants).map_err(|source| FixtureError::InvalidTiers {
                service_id: record.id.to_string(),
                source,
            })?;

            let service_id = record.id.to_string();

            if snapshot.insert(record).is_some() {
                return Err(FixtureError::DuplicateService(service_id));
            }
        }

        Ok(snapshot)
    }
}
