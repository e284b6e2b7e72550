//! Fixtures

use std::{fs, path::PathBuf};

use jiff::civil::DateTime;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    cart::CartEntry,
    catalog::{CatalogLookup, CatalogSnapshot, TierError},
    checkout::CheckoutDraft,
    config::{ConfigError, PricingConfig},
    fixtures::{carts::CartFixture, catalog::CatalogFixture, promotions::PromotionsFixture},
    promotions::repository::InMemoryPromoRepository,
};

pub mod carts;
pub mod catalog;
pub mod promotions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid pricing configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Malformed quantity bands
    #[error("Invalid price tiers for service {service_id}: {source}")]
    InvalidTiers {
        /// Service carrying the bands
        service_id: String,

        /// What is wrong with them
        source: TierError,
    },

    /// Two catalog records share an id
    #[error("Duplicate service: {0}")]
    DuplicateService(String),

    /// Two promo documents share a code
    #[error("Duplicate promo code: {0}")]
    DuplicatePromoCode(String),

    /// Cart references a service the catalog does not know
    #[error("Service not found: {0}")]
    ServiceNotFound(String),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    catalog: CatalogSnapshot,
    promo_codes: InMemoryPromoRepository,
    config: PricingConfig,
    cart: CartFixture,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: CatalogSnapshot::new(),
            promo_codes: InMemoryPromoRepository::new(),
            config: PricingConfig::default(),
            cart: CartFixture::default(),
        }
    }

    fn read<T: DeserializeOwned>(&self, category: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Load the service catalog from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if price bands
    /// are malformed, or if two records share an id.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CatalogFixture = self.read("catalog", name)?;

        self.catalog = fixture.try_into_snapshot()?;

        Ok(self)
    }

    /// Load promo codes and redemption history from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if two promo
    /// documents share a code.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: PromotionsFixture = self.read("promotions", name)?;

        self.promo_codes = fixture.try_into_repository()?;

        Ok(self)
    }

    /// Load pricing configuration from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// currency is unknown.
    pub fn load_config(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("config").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.config = PricingConfig::from_yaml(&contents)?;

        Ok(self)
    }

    /// Load a cart from a YAML fixture file
    ///
    /// Every entry must reference a service in the already loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an entry
    /// references an unknown service.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let cart: CartFixture = self.read("carts", name)?;

        if let Some(unknown) = cart
            .entries
            .iter()
            .find(|entry| self.catalog.get_service(&entry.service_id).is_none())
        {
            return Err(FixtureError::ServiceNotFound(unknown.service_id.to_string()));
        }

        self.cart = cart;

        Ok(self)
    }

    /// Load a complete fixture set (catalog, promotions, config and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture
            .load_catalog(name)?
            .load_promotions(name)?
            .load_config(name)?
            .load_cart(name)?;

        Ok(fixture)
    }

    /// Service catalog
    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    /// Promo repository
    pub fn promo_codes(&self) -> &InMemoryPromoRepository {
        &self.promo_codes
    }

    /// Pricing configuration
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Cart entries
    pub fn cart_entries(&self) -> &[CartEntry] {
        &self.cart.entries
    }

    /// Customer the cart belongs to
    pub fn user_id(&self) -> Option<&str> {
        self.cart.user_id.as_deref()
    }

    /// Promo code entered with the cart
    pub fn promo_code(&self) -> Option<&str> {
        self.cart.promo_code.as_deref()
    }

    /// Start a checkout for the fixture cart.
    ///
    /// The cart's promo code is not applied; callers decide how to handle
    /// a rejection.
    pub fn checkout(
        &self,
        now: DateTime,
    ) -> CheckoutDraft<'_, CatalogSnapshot, InMemoryPromoRepository, PricingConfig> {
        let mut draft =
            CheckoutDraft::new(&self.catalog, &self.promo_codes, self.config.clone(), now);

        if let Some(user_id) = self.user_id() {
            draft = draft.for_user(user_id);
        }

        for entry in &self.cart.entries {
            draft.add_service(entry.service_id.clone(), entry.quantity);
        }

        draft
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
