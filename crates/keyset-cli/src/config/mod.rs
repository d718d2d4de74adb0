//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── pagination: PaginationConfig  # method name, tiebreaker, legacy cursors
//! ├── query: QueryArgs              # rows file, order, filters, projection
//! └── command: Command              # simple | connection
//! ```
//!
//! Pagination options can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.

mod query;

use std::process;

use anyhow::Context;
use clap::Parser;
use keyset_pagination::PaginationConfig;
pub use query::QueryArgs;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::TRACING_TARGET_CONFIG;
use crate::command::Command;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "keyset")]
#[command(about = "Paginate a JSON array of records with keyset cursors")]
#[command(version)]
pub struct Cli {
    /// Paginator configuration.
    #[clap(flatten)]
    pub pagination: PaginationConfig,

    /// Source rows and query shape.
    #[clap(flatten)]
    pub query: QueryArgs,

    /// Response shape and page arguments.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs are written to stderr; stdout only carries the page.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.pagination
            .validate()
            .context("invalid pagination configuration")?;
        Ok(())
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            config = %self.pagination,
            rows = %self.query.rows.display(),
            order = ?self.query.order,
            filters = self.query.filters.len(),
            "Pagination configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
