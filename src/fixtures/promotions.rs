//! Promotion Fixtures

use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    promotions::{PromoCode, normalize_code, repository::InMemoryPromoRepository},
};

/// Wrapper for promo codes in YAML
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Promo code documents
    pub promo_codes: Vec<PromoCode>,

    /// Past redemptions per customer
    #[serde(default)]
    pub usage: Vec<UsageFixture>,
}

/// Redemption history entry from YAML
#[derive(Debug, Deserialize)]
pub struct UsageFixture {
    /// Customer
    pub user_id: String,

    /// Redeemed code
    pub code: String,

    /// Number of redemptions
    pub count: u32,
}

impl PromotionsFixture {
    /// Convert to a promo repository
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::DuplicatePromoCode`] if two documents share a code
    /// once normalised.
    pub fn try_into_repository(self) -> Result<InMemoryPromoRepository, FixtureError> {
        let mut repository = InMemoryPromoRepository::new();

        for promo in self.promo_codes {
            let code = normalize_code(&promo.code);

            if repository.insert(promo).is_some() {
                return Err(FixtureError::DuplicatePromoCode(code));
            }
        }

        for usage in self.usage {
            repository.record_usage(&usage.user_id, &usage.code, usage.count);
        }

        Ok(repository)
    }
}
