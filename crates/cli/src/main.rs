//! Circuit Bazaar CLI - Catalog inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # List the second page of active products matching "usb"
//! bazaar-cli list products --page 2 --search usb --status active
//!
//! # Show which SKU a set of options resolves to
//! bazaar-cli resolve phone-x --option red --option 128gb
//! ```
//!
//! # Commands
//!
//! - `list` - Print one page of any catalog resource
//! - `resolve` - Resolve variation options to a SKU and show availability
//!
//! The backend is configured through `BACKEND_URL` and, for admin-only
//! resources, `BACKEND_API_TOKEN`. A `.env` file is honored.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use circuit_bazaar_core::RecordStatus;
use circuit_bazaar_gateway::{ApiClient, TracingNotifier};
use clap::{Parser, Subcommand};

mod commands;
mod config;

use commands::list::ListOptions;

#[derive(Parser)]
#[command(name = "bazaar-cli")]
#[command(author, version, about = "Circuit Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of a catalog resource
    List {
        /// Resource name (products, brands, product-skus, ...)
        resource: String,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Records per page
        #[arg(long, default_value_t = 20)]
        limit: u32,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        /// Filter by status (`active`, `inactive`)
        #[arg(long)]
        status: Option<RecordStatus>,
    },
    /// Resolve a set of variation options to a SKU
    Resolve {
        /// Product id
        product_id: String,

        /// Option id to select; repeat for each variation
        #[arg(short, long = "option")]
        options: Vec<String>,
    },
}

#[tokio::main]
#[allow(clippy::print_stdout)]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => print!("{output}"),
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String, Box<dyn std::error::Error>> {
    let config = config::from_env()?;
    let client = ApiClient::new(&config, Arc::new(TracingNotifier))?;

    let output = match cli.command {
        Commands::List {
            resource,
            page,
            limit,
            search,
            status,
        } => {
            let options = ListOptions {
                page,
                limit,
                search,
                status,
            };
            commands::list::run(&client, &resource, &options).await?
        }
        Commands::Resolve {
            product_id,
            options,
        } => commands::resolve::run(&client, &product_id, &options).await?,
    };
    Ok(output)
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
    fn test_parse_resolve_options() {
        let cli = Cli::parse_from(["bazaar-cli", "resolve", "phone", "-o", "red", "--option", "64"]);
        match cli.command {
            Commands::Resolve { product_id, options } => {
                assert_eq!(product_id, "phone");
                assert_eq!(options, ["red", "64"]);
            }
            Commands::List { .. } => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_parse_list_status() {
        let cli = Cli::parse_from(["bazaar-cli", "list", "brands", "--status", "inactive"]);
        match cli.command {
            Commands::List { resource, status, page, .. } => {
                assert_eq!(resource, "brands");
                assert_eq!(status, Some(RecordStatus::Inactive));
                assert_eq!(page, 1);
            }
            Commands::Resolve { .. } => panic!("expected list"),
        }
    }
}
