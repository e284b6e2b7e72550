//! Receipt
//!
//! Human-readable rendering of a [`PricingBreakdown`]: a table of priced
//! lines followed by a summary block whose rows add up to the grand total.

use std::io;

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows, Segment},
        style::BorderColor,
    },
};
use thiserror::Error;

use crate::{
    breakdown::PricingBreakdown,
    money::{PricingError, to_money},
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An amount could not be formatted in the currency.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

impl PricingBreakdown {
    /// Write the breakdown as a receipt.
    ///
    /// # Errors
    ///
    /// - [`RenderError::IO`]: `out` could not be written to.
    /// - [`RenderError::Pricing`]: an amount is out of range for `currency`.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        currency: &'static Currency,
    ) -> Result<(), RenderError> {
        let mut builder = Builder::default();

        builder.push_record(["Service", "Qty", "Unit Price", "Base", "Tax %", "Tax"]);

        for line in &self.line_items {
            builder.push_record([
                line.name.clone(),
                line.quantity.to_string(),
                money(line.unit_price, currency)?,
                money(line.line_base_total, currency)?,
                format!("{}%", line.tax_percent.normalize()),
                money(line.tax_amount, currency)?,
            ]);
        }

        write_receipt_table(&mut out, builder)?;
        write_receipt_summary(&mut out, self, currency)?;

        Ok(())
    }
}

fn money(amount: Decimal, currency: &'static Currency) -> Result<String, RenderError> {
    Ok(to_money(amount, currency)?.to_string())
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), RenderError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Segment::all(), BorderColor::filled(Color::FG_BRIGHT_BLACK));
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..6), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| RenderError::IO)
}

/// Summary rows, top to bottom, ending with the grand total.
fn summary_rows(
    breakdown: &PricingBreakdown,
    currency: &'static Currency,
) -> Result<Vec<[String; 2]>, RenderError> {
    let mut rows = vec![[
        "Subtotal:".to_string(),
        money(breakdown.subtotal_base, currency)?,
    ]];

    if let Some(promo) = &breakdown.applied_promo_code {
        rows.push([
            format!("Discount ({}):", promo.code),
            format!("-{}", money(breakdown.discount_amount, currency)?),
        ]);
    }

    if let Some(charge) = &breakdown.visiting_charge {
        rows.push(["Visiting Charge:".to_string(), money(charge.base, currency)?]);
    }

    for fee in &breakdown.platform_fees {
        rows.push([
            format!("{}:", fee.name),
            money(fee.calculated_fee_amount, currency)?,
        ]);
    }

    rows.push([
        format!("{}:", breakdown.effective_tax_label),
        money(breakdown.total_tax, currency)?,
    ]);

    rows.push(["Total:".to_string(), money(breakdown.grand_total, currency)?]);

    Ok(rows)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    breakdown: &PricingBreakdown,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    let mut summary = summary_rows(breakdown, currency)?
        .into_iter()
        .collect::<Builder>()
        .build();

    summary.with(Style::blank());
    summary.modify(Segment::all(), Alignment::right());
    summary.modify(Rows::last(), Color::BOLD);

    writeln!(out, "{summary}\n").map_err(|_err| RenderError::IO)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::{
        breakdown::TaxLabel,
        cart::CartEntry,
        catalog::{CatalogSnapshot, ServicePriceRecord},
        fees::{FeeType, PlatformFeeConfig},
        pricing::compute_pricing,
        promotions::{AppliedPromoCodeInfo, DiscountType, PromoCode},
        surcharge::MinimumBookingPolicy,
    };

    use super::*;

    fn render(breakdown: &PricingBreakdown) -> TestResult<String> {
        let mut out = Vec::new();

        breakdown.write_to(&mut out, INR)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn renders_lines_and_summary() -> TestResult {
        let catalog: CatalogSnapshot = [
            ServicePriceRecord::new("sofa", "Sofa Cleaning", dec!(118)).with_tax(dec!(18), true),
        ]
        .into_iter()
        .collect();

        let promo = AppliedPromoCodeInfo::from_promo(
            &PromoCode::new("p", "FLAT20", DiscountType::Fixed, dec!(20)),
            dec!(118),
        );

        let priced = compute_pricing(
            &[CartEntry::new("sofa", 1)],
            &catalog,
            Some(&promo),
            &[PlatformFeeConfig::new("Convenience Fee", FeeType::Fixed, dec!(29))],
            &MinimumBookingPolicy::new(dec!(299), dec!(49)),
        );

        let output = render(&priced.breakdown)?;

        assert!(output.contains("Sofa Cleaning"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("Discount (FLAT20):"));
        assert!(output.contains("Visiting Charge:"));
        assert!(output.contains("Convenience Fee:"));
        assert!(output.contains("Tax (18%):"));
        assert!(output.contains("Total:"));

        Ok(())
    }

    #[test]
    fn empty_breakdown_renders_zero_total() -> TestResult {
        let output = render(&PricingBreakdown::empty())?;

        assert!(output.contains("Service"));
        assert!(output.contains("Tax (0%):"));
        assert!(!output.contains("Discount"));
        assert!(!output.contains("Visiting Charge"));

        Ok(())
    }

    #[test]
    fn summary_rows_end_with_the_total() -> TestResult {
        let breakdown = PricingBreakdown {
            subtotal_base: dec!(100),
            total_tax: dec!(18),
            grand_total: dec!(118),
            effective_tax_label: TaxLabel::Single(dec!(18)),
            ..PricingBreakdown::empty()
        };

        let rows = summary_rows(&breakdown, INR)?;
        let labels: Vec<&str> = rows.iter().map(|[label, _]| label.as_str()).collect();

        assert_eq!(labels, ["Subtotal:", "Tax (18%):", "Total:"]);
        assert_eq!(
            rows.last().map(|[_, value]| value.as_str()),
            Some(to_money(dec!(118), INR)?.to_string().as_str())
        );

        Ok(())
    }
}
