//! Goggles: the Conjurer desktop companion.
//!
//! `goggles watch` runs the screenshot daemon; the remaining subcommands are
//! one-shot wallet and configuration operations.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod daemon;
mod pid;
mod wallet;

use config::GogglesConfig;
use wallet::Wallet;

#[derive(Parser)]
#[command(name = "goggles", about = "Screenshot renamer and Conjurer wallet")]
struct Cli {
    /// NEAR JSON-RPC endpoint.
    #[arg(
        long,
        global = true,
        env = "GOGGLES_RPC_URL",
        default_value = "https://test.rpc.fastnear.com"
    )]
    rpc_url: String,

    /// Credit ledger contract account.
    #[arg(long, global = true, env = "GOGGLES_CONTRACT_ID")]
    contract: Option<String>,

    /// Path to the signing key file (JSON).
    #[arg(
        long,
        global = true,
        env = "GOGGLES_KEYS_PATH",
        default_value = "./account_keys/wallet.json"
    )]
    keys: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch a directory and rename new screenshots.
    Watch {
        /// Directory to watch. Defaults to the platform desktop dir.
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Gateway base URL.
        #[arg(long)]
        gateway: Option<String>,
    },
    /// Store the wallet address sent with generation requests.
    SetAddress { account: String },
    /// Show the credit balance for an account.
    Credits {
        /// Account to query. Defaults to the stored address.
        #[arg(long)]
        account: Option<String>,
    },
    /// Buy credits with an attached NEAR deposit.
    Buy {
        /// Deposit in NEAR, e.g. "0.01".
        #[arg(long)]
        amount: String,
    },
    /// Owner only: withdraw the accumulated pool.
    Withdraw,
    /// Owner only: set the per-credit price.
    SetPrice {
        /// New price in NEAR per credit.
        #[arg(long)]
        price: String,
    },
    /// Show the stored configuration and gateway health.
    Status,
}

impl Cli {
    fn wallet(&self) -> Result<Wallet> {
        let Some(contract) = self.contract.as_deref() else {
            bail!("No contract configured. Set --contract or GOGGLES_CONTRACT_ID");
        };
        Wallet::new(&self.rpc_url, contract, &self.keys)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "goggles=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Watch { dir, gateway } => {
            let mut config = GogglesConfig::load()?;
            if let Some(dir) = dir {
                config.watch_dir = Some(dir.clone());
            }
            if let Some(gateway) = gateway {
                config.gateway_url = Some(gateway.clone());
            }
            daemon::run(config).await
        }
        Command::SetAddress { account } => {
            let account: near_primitives::types::AccountId = account
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid account id: {e}"))?;
            let mut config = GogglesConfig::load()?;
            config.update_address(account.to_string())?;
            println!("Address set to {account}");
            Ok(())
        }
        Command::Credits { account } => {
            let config = GogglesConfig::load()?;
            let account = match account.clone() {
                Some(a) => a,
                None if !config.address.is_empty() => config.address.clone(),
                None => bail!("No account given and no stored address. Run set-address first"),
            };
            let credits = cli.wallet()?.credits(&account).await?;
            println!("{account}: {credits} credits");
            Ok(())
        }
        Command::Buy { amount } => {
            let wallet = cli.wallet()?;
            let granted = wallet.buy(amount).await?;
            println!("Purchased {granted} credits for {amount} NEAR");
            Ok(())
        }
        Command::Withdraw => {
            let wallet = cli.wallet()?;
            let pool = wallet.contract_balance().await?;
            let tx = wallet.withdraw().await?;
            println!("Withdrew {} NEAR (tx {tx})", wallet::format_near(pool));
            Ok(())
        }
        Command::SetPrice { price } => {
            let tx = cli.wallet()?.set_price(price).await?;
            println!("Price set to {price} NEAR per credit (tx {tx})");
            Ok(())
        }
        Command::Status => {
            let config = GogglesConfig::load()?;
            if config.address.is_empty() {
                println!("Address:   (not set)");
            } else {
                println!("Address:   {}", config.address);
            }
            println!("Watch dir: {}", config.effective_watch_dir().display());
            println!("Gateway:   {}", config.effective_gateway_url());

            let client = api::GatewayClient::new(config.effective_gateway_url());
            match client.health().await {
                Ok(health) => println!(
                    "Health:    {} ({}, {})",
                    health.status, health.message, health.timestamp
                ),
                Err(e) => println!("Health:    unreachable ({e})"),
            }

            if let Some(contract) = cli.contract.as_deref() {
                let wallet = cli.wallet()?;
                let price = wallet.credit_price().await?;
                println!(
                    "Contract:  {contract} ({} NEAR per credit)",
                    wallet::format_near(price)
                );
            }
            Ok(())
        }
    }
}
