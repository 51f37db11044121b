//! `revolut` command-line tool.
//!
//! Reads credentials from a JSON config file (see [`revolut::config`]) and
//! prints API responses as pretty JSON on stdout.
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `CONFIG` selects the config file when `--config` is absent
//! - `RUST_LOG` controls log verbosity on stderr
//! - `OTEL_*` variables enable span export (with the `telemetry` feature)

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

use revolut::business::exchange::RateRequest;
use revolut::business::payment::{TransactionFilter, TransactionType};
use revolut::config::{Config, DEFAULT_CONFIG_PATH};
use revolut::telemetry::Telemetry;

#[derive(Parser, Debug)]
#[command(name = "revolut")]
#[command(about = "Query the Revolut Business and Merchant APIs")]
struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List business accounts
    Accounts,
    /// Show one business account
    Account { id: String },
    /// Show bank details of a business account
    BankDetails { id: String },
    /// List counterparties
    Counterparties,
    /// List transactions, newest first
    Transactions {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        counterparty: Option<String>,
        #[arg(long)]
        count: Option<u32>,
        #[arg(long = "type")]
        kind: Option<TransactionType>,
    },
    /// Quote an exchange rate
    Rate {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "1")]
        amount: Decimal,
    },
    /// List payment drafts
    PaymentDrafts,
    /// Show a merchant order
    Orders { id: String },
    /// List merchant webhooks
    MerchantWebhooks,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _telemetry = Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .register()?;

    let args = CliArgs::parse();
    let config = Config::load_from_path(&args.config)?;
    tracing::debug!(path = %args.config.display(), environment = %config.environment(), "Loaded config");

    match args.command {
        Command::Orders { id } => {
            let client = merchant_client(&config)?;
            print(&client.orders().get(&id).await?)
        }
        Command::MerchantWebhooks => {
            let client = merchant_client(&config)?;
            print(&client.webhooks().list().await?)
        }
        command => {
            let client = business_client(&config).await?;
            run_business(&client, command).await
        }
    }
}

async fn run_business(
    client: &revolut::business::Client,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Accounts => print(&client.accounts().await.list().await?),
        Command::Account { id } => print(&client.accounts().await.get(&id).await?),
        Command::BankDetails { id } => print(&client.accounts().await.bank_details(&id).await?),
        Command::Counterparties => print(&client.counterparties().await.list().await?),
        Command::Transactions {
            from,
            to,
            counterparty,
            count,
            kind,
        } => {
            let filter = TransactionFilter {
                from,
                to,
                counterparty,
                count,
                kind,
            };
            print(&client.payments().await.list(&filter).await?)
        }
        Command::Rate { from, to, amount } => {
            let request = RateRequest { from, to, amount };
            print(&client.exchange().await.rate(&request).await?)
        }
        Command::PaymentDrafts => print(&client.payment_drafts().await.list().await?),
        Command::Orders { .. } | Command::MerchantWebhooks => Ok(()),
    }
}

async fn business_client(
    config: &Config,
) -> Result<revolut::business::Client, Box<dyn std::error::Error>> {
    let business = config.business()?;
    let identity = business.identity()?;
    let client = revolut::business::Client::new(
        identity,
        business.refresh_token.inner().as_str(),
        config.environment(),
    )
    .await?;
    Ok(client)
}

fn merchant_client(config: &Config) -> Result<revolut::merchant::Client, Box<dyn std::error::Error>> {
    let merchant = config.merchant()?;
    let client =
        revolut::merchant::Client::new(merchant.api_key.inner().as_str(), config.environment())?;
    Ok(client)
}

fn print<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
