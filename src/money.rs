//! Money
//!
//! Decimal arithmetic shared by every pricing stage. Amounts are [`Decimal`]
//! values in major units and percentages are percent points (`18` is 18%).
//!
//! Rounding is fixed at two decimal places, half away from zero. A component
//! is rounded once, when it is produced; aggregates are sums of rounded
//! components.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Decimal places kept on every monetary component of a breakdown.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Errors raised when handing amounts to money collaborators.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The amount does not fit into signed 64-bit minor units.
    #[error("amount {0} cannot be represented in minor units")]
    MinorUnitsOverflow(Decimal),
}

/// How a configured value turns into an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// The value is a percentage of a base amount.
    Percentage,

    /// The value is an absolute amount.
    Fixed,
}

impl AdjustmentType {
    /// Unrounded amount produced by `value` against `base`.
    pub fn amount_on(self, value: Decimal, base: Decimal) -> Decimal {
        match self {
            AdjustmentType::Percentage => percent_of(base, value),
            AdjustmentType::Fixed => value,
        }
    }
}

/// Round a monetary amount to [`MONEY_DECIMAL_PLACES`], half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `percent_points`% of `amount`, unrounded.
pub fn percent_of(amount: Decimal, percent_points: Decimal) -> Decimal {
    Percentage::from(percent_points / Decimal::ONE_HUNDRED) * amount
}

/// Clamp a configured percentage to zero when it is negative.
///
/// Negative rates are a configuration anomaly: pricing carries on as if no
/// rate was configured and the anomaly is logged.
pub fn sanitize_percent(value: Decimal, field: &'static str, owner: &str) -> Decimal {
    if value.is_sign_negative() && !value.is_zero() {
        warn!(field, owner, %value, "negative percentage treated as zero");

        return Decimal::ZERO;
    }

    value
}

/// Clamp a configured amount to zero when it is negative.
pub fn sanitize_amount(value: Decimal, field: &'static str, owner: &str) -> Decimal {
    if value.is_sign_negative() && !value.is_zero() {
        warn!(field, owner, %value, "negative amount treated as zero");

        return Decimal::ZERO;
    }

    value
}

/// Convert a major-unit amount to integer minor units with `exponent` decimal places.
///
/// # Errors
///
/// Returns [`PricingError::MinorUnitsOverflow`] when the result does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal, exponent: u32) -> Result<i64, PricingError> {
    let mut scaled =
        amount.round_dp_with_strategy(exponent, RoundingStrategy::MidpointAwayFromZero);

    scaled.rescale(exponent);

    i64::try_from(scaled.mantissa()).map_err(|_err| PricingError::MinorUnitsOverflow(amount))
}

/// Wrap a major-unit amount as [`Money`] in `currency`.
///
/// # Errors
///
/// Returns [`PricingError::MinorUnitsOverflow`] when the amount does not fit in an `i64`.
pub fn to_money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let minor = to_minor_units(amount, currency.exponent)?;

    Ok(Money::from_minor(minor, currency))
}
