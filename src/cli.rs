//! Command line configuration for the evaluation demo

use std::path::PathBuf;

use clap::Parser;

use crate::fixtures::{Fixture, FixtureError};

/// Price a fixture cart for a fixture user
#[derive(Debug, Parser)]
#[command(name = "evaluate", about = "Price a cart against a promotion set", long_about = None)]
pub struct EvaluateArgs {
    /// Fixture set to load products, users, cart and promotions from
    #[arg(short, long, env = "RULECART_FIXTURE", default_value = "demo")]
    pub fixture: String,

    /// Directory holding the fixture sets
    #[arg(short = 'd', long, env = "RULECART_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// User to price the cart for
    #[arg(short, long, env = "RULECART_USER", default_value = "user_123")]
    pub user: String,

    /// Extra products to add to the cart, one unit per occurrence
    #[arg(short, long = "add")]
    pub add: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl EvaluateArgs {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Load the configured fixture set
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_fixture(&self) -> Result<Fixture<'static>, FixtureError> {
        let mut fixture = Fixture::with_base_path(&self.fixtures_dir);

        fixture.load_set(&self.fixture)?;

        Ok(fixture)
    }
}
