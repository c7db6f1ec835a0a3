//! Evaluate Example
//!
//! Prices a fixture cart for a fixture user and prints the receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-u` to choose the user
//! Use `-a` (repeatable) to add products to the cart before pricing

use std::{io, time::Instant};

use anyhow::Result;
use rulecart::cli::EvaluateArgs;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(io::stderr),
        )
        .with(filter)
        .try_init()?;

    Ok(())
}

/// Evaluate Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = EvaluateArgs::load()?;

    init_logging(&args.log_level)?;

    let fixture = args.load_fixture()?;
    let mut engine = fixture.engine(&args.user)?;

    for product_id in &args.add {
        engine.add_to_cart(product_id)?;
    }

    let start = Instant::now();

    engine.calculate()?;

    let elapsed = start.elapsed().as_secs_f32();

    let user = engine.user();
    let priced = engine.priced_cart();

    info!(
        user_id = %user.id,
        promotions = engine.promotions().len(),
        applied = priced.applied_promotions().len(),
        "evaluated fixture set {}",
        args.fixture
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    priced.write_to(&mut handle)?;

    println!(
        "Priced for {} ({}) in {elapsed}s",
        user.name, user.membership_tier
    );

    Ok(())
}
