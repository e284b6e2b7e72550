//! Platform Fees
//!
//! Independently configured fees, each priced against the same pre-discount
//! subtotal and each carrying its own tax rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    money::{AdjustmentType, round_money, sanitize_amount, sanitize_percent},
    tax::tax_on,
};

/// How a platform fee's value is applied.
pub type FeeType = AdjustmentType;

fn default_active() -> bool {
    true
}

/// Platform fee configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFeeConfig {
    /// Fee name shown to the customer
    pub name: String,

    /// Percentage of the subtotal, or a fixed amount
    #[serde(rename = "type")]
    pub fee_type: FeeType,

    /// Percent points or amount, depending on `fee_type`.
    pub value: Decimal,

    /// Tax rate charged on the fee, in percent points
    #[serde(default)]
    pub fee_tax_rate_percent: Decimal,

    /// Inactive fees are skipped.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl PlatformFeeConfig {
    /// An active, untaxed fee.
    pub fn new(name: impl Into<String>, fee_type: FeeType, value: Decimal) -> Self {
        Self {
            name: name.into(),
            fee_type,
            value,
            fee_tax_rate_percent: Decimal::ZERO,
            is_active: true,
        }
    }

    /// Set the tax rate charged on the fee.
    #[must_use]
    pub fn with_tax_rate(mut self, fee_tax_rate_percent: Decimal) -> Self {
        self.fee_tax_rate_percent = fee_tax_rate_percent;
        self
    }

    /// Price this fee against a pre-discount subtotal.
    pub fn apply(&self, sum_of_displayed_prices: Decimal) -> AppliedFee {
        let value = sanitize_amount(self.value, "value", &self.name);
        let tax_rate =
            sanitize_percent(self.fee_tax_rate_percent, "fee_tax_rate_percent", &self.name);
        let unrounded_fee = self.fee_type.amount_on(value, sum_of_displayed_prices);

        AppliedFee {
            name: self.name.clone(),
            fee_type: self.fee_type,
            value_applied: value,
            calculated_fee_amount: round_money(unrounded_fee),
            tax_rate_percent_on_fee: tax_rate,
            tax_amount_on_fee: round_money(tax_on(unrounded_fee, tax_rate)),
        }
    }
}

/// Platform fee priced for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFee {
    /// Fee name
    pub name: String,

    /// Percentage or fixed
    #[serde(rename = "type")]
    pub fee_type: FeeType,

    /// Configured value after sanitising
    pub value_applied: Decimal,

    /// Fee before tax
    pub calculated_fee_amount: Decimal,

    /// Tax rate on the fee
    pub tax_rate_percent_on_fee: Decimal,

    /// Tax on the fee
    pub tax_amount_on_fee: Decimal,
}

/// Every applied fee plus their sums.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformFeeTotals {
    /// Applied fees, in configuration order
    pub fees: Vec<AppliedFee>,

    /// Sum of fee amounts before tax
    pub total_fee_base: Decimal,

    /// Sum of fee taxes
    pub total_fee_tax: Decimal,
}

/// Price every active fee against the same pre-discount subtotal.
///
/// Fees do not compound: a fee never sees another fee's amount.
pub fn aggregate_platform_fees(
    configs: &[PlatformFeeConfig],
    sum_of_displayed_prices: Decimal,
) -> PlatformFeeTotals {
    configs
        .iter()
        .filter(|config| config.is_active)
        .map(|config| config.apply(sum_of_displayed_prices))
        .fold(PlatformFeeTotals::default(), |mut totals, fee| {
            totals.total_fee_base += fee.calculated_fee_amount;
            totals.total_fee_tax += fee.tax_amount_on_fee;
            totals.fees.push(fee);
            totals
        })
}
