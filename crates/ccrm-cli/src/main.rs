mod orders;

use ccrm_client::{CrmClient, TracingLogger};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::orders::OrderCommands;

#[derive(Debug, Parser)]
#[command(name = "ccrm")]
#[command(about = "ContinuityCRM command line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look up and search orders
    Order {
        #[command(subcommand)]
        command: OrderCommands,
    },
    /// List the provinces known for a country
    Provinces {
        /// Country code (e.g., US)
        country: String,
    },
    /// Quote tax for a product shipped to a country
    Tax {
        product_id: i64,
        /// Shipping country code (e.g., CA)
        country: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let config = ccrm_core::load_client_config()?;
    tracing::debug!(?config, "loaded client config");
    let client = CrmClient::with_logger(&config, TracingLogger)
        .map_err(|e| anyhow::anyhow!("failed to build ContinuityCRM client: {e}"))?;

    match cli.command {
        Commands::Order { command } => orders::run(&client, command).await,
        Commands::Provinces { country } => {
            let provinces = client.get_provinces(&country).await?;
            print_json(&provinces)
        }
        Commands::Tax {
            product_id,
            country,
        } => {
            let quote = client.get_tax_for_product(product_id, &country).await?;
            print_json(&quote)
        }
    }
}

/// Pretty-prints any serializable value to stdout.
fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
