//! RocketShoes CLI - Drive the shopping cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Add one unit of product 1
//! rs-cart add 1
//!
//! # Set product 1 to three units
//! rs-cart update 1 3
//!
//! # Remove product 1
//! rs-cart remove 1
//!
//! # Show the cart
//! rs-cart show
//!
//! # Forget the stored cart
//! rs-cart clear
//!
//! # Create the PostgreSQL storage table
//! rs-cart migrate
//! ```
//!
//! Configuration comes from the environment (see
//! `rocketshoes_storefront::config`). Every invocation loads the cart from
//! storage, applies one command, and exits, so the stored cart carries
//! state from one run to the next.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rocketshoes_core::ProductId;
use rocketshoes_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one unit of a product to the cart
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Show the cart contents and totals
    Show,
    /// Delete the stored cart
    Clear,
    /// Run `PostgreSQL` storage migrations
    Migrate,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing with `EnvFilter` and Sentry integration.
///
/// Logs go to stderr so that stdout only carries command output.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_storefront=info,rocketshoes_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    match run(cli, &config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<ExitCode, commands::CommandError> {
    match cli.command {
        Commands::Add { product_id } => commands::cart::add(config, product_id).await,
        Commands::Remove { product_id } => commands::cart::remove(config, product_id).await,
        Commands::Update { product_id, amount } => {
            commands::cart::update(config, product_id, amount).await
        }
        Commands::Show => commands::cart::show(config).await,
        Commands::Clear => commands::cart::clear(config).await,
        Commands::Migrate => commands::migrate::storage(config).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_accepts_negative_amount() {
        let cli = Cli::try_parse_from(["rs-cart", "update", "1", "-2"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Update { amount: -2, .. })
        ));
    }

    #[test]
    fn test_product_id_must_be_numeric() {
        assert!(Cli::try_parse_from(["rs-cart", "add", "sneaker"]).is_err());
    }
}
