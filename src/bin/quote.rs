//! Quote
//!
//! Prices a fixture cart and prints a receipt or the order pricing snapshot.
//!
//! Use `-f` to load a fixture set by name
//! Use `--promo` to try a different promo code
//! Use `--format json` to print the snapshot handed to the payment step

use std::io;

use anyhow::Result;
use clap::Parser;
use jiff::Zoned;
use tracing::{info, warn};

use booking_pricing::{
    cli::{OutputFormat, QuoteArgs},
    config::ConfigProvider,
    fixtures::Fixture,
    logging::init_subscriber,
};

/// Quote
#[expect(clippy::print_stdout, reason = "CLI output")]
pub fn main() -> Result<()> {
    let args = QuoteArgs::parse();

    init_subscriber(&args.logging.log_level, args.logging.log_format)?;

    let fixture = Fixture::from_set_in(&args.fixtures_dir, &args.fixture)?;
    let now = args.now.unwrap_or_else(|| Zoned::now().datetime());

    info!(fixture = %args.fixture, %now, "pricing fixture cart");

    let mut draft = fixture.checkout(now);

    if let Some(user) = &args.user {
        draft = draft.for_user(user.as_str());
    }

    if let Some(code) = args.promo.as_deref().or(fixture.promo_code())
        && let Err(reason) = draft.apply_promo_code(code)
    {
        warn!(code, %reason, "promo code not applied");
    }

    for warning in draft.warnings() {
        warn!(%warning, "pricing warning");
    }

    draft.set_payment_method(args.payment_method);

    match args.format {
        OutputFormat::Table => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();

            draft
                .breakdown()
                .write_to(&mut handle, draft.config().payment_currency())?;

            let offers: Vec<&str> = draft
                .available_promo_codes()
                .iter()
                .map(|promo| promo.code.as_str())
                .collect();

            if !offers.is_empty() {
                println!("Available offers: {}", offers.join(", "));
            }
        }
        OutputFormat::Json => {
            let order = draft.place_order()?;

            println!("{}", serde_json::to_string_pretty(&order)?);
        }
    }

    Ok(())
}
