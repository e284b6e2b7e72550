//! Booking Pricing
//!
//! Checkout pricing and tax engine for a home-services marketplace. Given a
//! cart of booked services, an optional promo code and operator configuration,
//! it produces a [`PricingBreakdown`](breakdown::PricingBreakdown) with line
//! taxes, the promo discount, a minimum booking surcharge, platform fees and
//! the payable grand total.
//!
//! Pricing is pure and synchronous: catalog, promo and configuration lookups
//! go through the [`CatalogLookup`](catalog::CatalogLookup),
//! [`PromoRepository`](promotions::repository::PromoRepository) and
//! [`ConfigProvider`](config::ConfigProvider) traits, resolved by the caller
//! before pricing runs.

pub mod breakdown;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod cli;
pub mod config;
pub mod fees;
pub mod fixtures;
pub mod logging;
pub mod money;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod receipt;
pub mod surcharge;
pub mod tax;
pub mod warnings;
