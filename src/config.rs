//! Pricing Configuration
//!
//! Operator-controlled settings that shape every computation: the currency,
//! platform fees and the minimum booking policy.

use rusty_money::iso::{self, Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{fees::PlatformFeeConfig, surcharge::MinimumBookingPolicy};

/// Currency used when configuration does not name one.
pub const DEFAULT_CURRENCY: &str = "INR";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Currency code is not an ISO 4217 code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// YAML parsing error
    #[error("Failed to parse pricing config: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Read access to the pricing settings in force.
pub trait ConfigProvider {
    /// Platform fee configurations, in the order they are shown.
    fn platform_fees(&self) -> &[PlatformFeeConfig];

    /// Minimum booking policy.
    fn minimum_booking_policy(&self) -> &MinimumBookingPolicy;

    /// Currency the payable amount is handed over in.
    fn payment_currency(&self) -> &'static Currency;
}

/// Pricing settings, usually loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// ISO 4217 currency code
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Platform fees
    #[serde(default)]
    pub platform_fees: Vec<PlatformFeeConfig>,

    /// Minimum booking policy
    #[serde(default)]
    pub minimum_booking: MinimumBookingPolicy,
}

impl PricingConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Yaml`]: the document is not valid configuration.
    /// - [`ConfigError::UnknownCurrency`]: the currency code is not recognised.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_norway::from_str(contents)?;

        config.currency()?;

        Ok(config)
    }

    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the code is not recognised.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        let code = self.currency.trim().to_uppercase();

        iso::find(&code).ok_or(ConfigError::UnknownCurrency(code))
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            platform_fees: Vec::new(),
            minimum_booking: MinimumBookingPolicy::disabled(),
        }
    }
}

impl ConfigProvider for PricingConfig {
    fn platform_fees(&self) -> &[PlatformFeeConfig] {
        &self.platform_fees
    }

    fn minimum_booking_policy(&self) -> &MinimumBookingPolicy {
        &self.minimum_booking
    }

    fn payment_currency(&self) -> &'static Currency {
        self.currency().unwrap_or_else(|err| {
            warn!(%err, fallback = DEFAULT_CURRENCY, "unknown currency in pricing config");

            iso::INR
        })
    }
}
