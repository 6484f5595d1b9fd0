//! Merchant Wallet CLI
//!
//! Creates merchant wallets, manages cached keys and withdraws from the pool.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use merchant_wallet::services::{HttpMerchantApi, HttpWalletProvider, StaticToken};
use merchant_wallet::wallet::PinDigest;
use merchant_wallet::{
    clear_stored_encryption_key, open_key_store, stored_encryption_key, Config, ConsoleNotifier,
    KeyValueStore, MemoryKeyStore, MerchantLinkOutcome, Network, PoolWithdrawal, SqliteKeyStore,
    WalletCreationParams, WalletOnboarding, WithdrawRequest,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "merchant-wallet")]
#[command(about = "Custodial wallet onboarding for merchants")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a wallet and link it to the merchant record
    Create {
        /// Secure the wallet with this PIN (4-32 characters)
        #[arg(long, conflicts_with = "key")]
        pin: Option<String>,

        /// Secure the wallet with this hex key (4-64 characters)
        #[arg(long)]
        key: Option<String>,

        /// External user id (defaults to EXTERNAL_USER_ID)
        #[arg(short, long)]
        user: Option<String>,

        /// Network override (testnet or mainnet)
        #[arg(short, long)]
        network: Option<Network>,

        /// Do not cache the secret locally
        #[arg(long)]
        no_store: bool,

        /// Do not update the merchant record
        #[arg(long)]
        no_link: bool,

        /// Send the legacy 32-bit PIN hash to the merchant backend
        #[arg(long)]
        legacy_digest: bool,
    },

    /// Inspect or forget the locally cached key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Withdraw USDC from the pool to the vault
    Withdraw {
        /// Amount in USDC
        #[arg(short, long)]
        amount: Decimal,

        /// Security PIN of the wallet
        #[arg(long)]
        pin: String,

        /// Balance currently available in the pool
        #[arg(long)]
        available: Decimal,

        /// External user id (defaults to EXTERNAL_USER_ID)
        #[arg(short, long)]
        user: Option<String>,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Print the cached key
    Get {
        #[arg(short, long)]
        merchant: Option<String>,
        #[arg(short, long)]
        network: Option<Network>,
    },
    /// Remove the cached key
    Clear {
        #[arg(short, long)]
        merchant: Option<String>,
        #[arg(short, long)]
        network: Option<Network>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    // Load configuration
    let config = Config::from_env()?;

    match cli.command {
        Commands::Create {
            pin,
            key,
            user,
            network,
            no_store,
            no_link,
            legacy_digest,
        } => {
            let params = WalletCreationParams {
                pin,
                encrypt_key: key,
                external_user_id: user_id(&config, user)?,
                network: network.unwrap_or(config.network),
                encryption_salt: config.pin_salt.clone(),
            };
            create_wallet(&config, params, !no_store, !no_link, legacy_digest).await?
        }
        Commands::Key { action } => manage_key(&config, action).await?,
        Commands::Withdraw {
            amount,
            pin,
            available,
            user,
        } => {
            let user = user_id(&config, user)?;
            withdraw(&config, &user, amount, &pin, available).await?
        }
    }

    Ok(())
}

fn user_id(config: &Config, user: Option<String>) -> Result<String> {
    user.or_else(|| config.external_user_id.clone())
        .context("External user id required (--user or EXTERNAL_USER_ID)")
}

async fn create_wallet(
    config: &Config,
    params: WalletCreationParams,
    store_key: bool,
    link: bool,
    legacy_digest: bool,
) -> Result<()> {
    println!("\n{}", "=".repeat(70));
    println!("  CREATE {} WALLET", params.network.label().to_uppercase());
    println!("  User: {} | Merchant: {}", params.external_user_id, config.merchant_id);
    println!("{}\n", "=".repeat(70));

    let ctx = config.merchant_context()?;

    // The key cache is best-effort: a broken database becomes a warning on the result
    let store: Arc<dyn KeyValueStore> = if store_key {
        open_key_store(&config.key_store_url).await
    } else {
        Arc::new(MemoryKeyStore::new())
    };

    let onboarding = WalletOnboarding::new(
        Arc::new(HttpWalletProvider::new(&config.wallet_api_url, &config.wallet_api_key)?),
        Arc::new(HttpMerchantApi::new(&config.merchant_api_url)?),
        store,
        Arc::new(ConsoleNotifier),
    );

    let mut creation = config.creation_config();
    creation.enable_local_storage = store_key;
    creation.update_merchant_record = link;
    if legacy_digest {
        creation.pin_digest = PinDigest::Legacy32;
    }

    let result = onboarding
        .create_wallet_with_merchant_update(
            &ctx,
            &params,
            config.bearer_token.as_deref(),
            &creation,
        )
        .await;

    if !result.success {
        anyhow::bail!(result.error.unwrap_or_else(|| "Wallet creation failed".to_string()));
    }

    println!();
    println!(
        "  Address:       {}",
        result.public_key.as_deref().unwrap_or("(not returned)").bold()
    );
    println!(
        "  Merchant link: {}",
        match &result.merchant_link {
            MerchantLinkOutcome::Linked => "linked".green().to_string(),
            MerchantLinkOutcome::Failed(e) => format!("failed ({})", e).red().to_string(),
            MerchantLinkOutcome::Skipped(r) => format!("skipped ({})", r).yellow().to_string(),
            MerchantLinkOutcome::Disabled => "disabled".to_string(),
            MerchantLinkOutcome::NotAttempted => "not attempted".to_string(),
        }
    );
    if params.pin.is_none() && params.encrypt_key.is_none() {
        // Generated keys are not recoverable from anywhere else
        if let Some(key) = &result.encrypt_key {
            println!("  Generated key: {} (store it safely)", key.yellow());
        }
    }
    info!("Wallet creation finished with {} warning(s)", result.warnings.len());

    Ok(())
}

async fn manage_key(config: &Config, action: KeyAction) -> Result<()> {
    let store = SqliteKeyStore::new(&config.key_store_url).await?;

    let (merchant, network, clear) = match action {
        KeyAction::Get { merchant, network } => (merchant, network, false),
        KeyAction::Clear { merchant, network } => (merchant, network, true),
    };
    let merchant = merchant.unwrap_or_else(|| config.merchant_id.clone());
    let network = network.unwrap_or(config.network);

    if clear {
        if clear_stored_encryption_key(&store, &merchant, network).await {
            println!("Cleared cached key for {} on {}", merchant, network);
        } else {
            anyhow::bail!("Failed to clear cached key for {} on {}", merchant, network);
        }
    } else {
        match stored_encryption_key(&store, &merchant, network).await {
            Some(key) => println!("{}", key),
            None => println!("No cached key for {} on {}", merchant, network),
        }
    }

    Ok(())
}

async fn withdraw(
    config: &Config,
    user: &str,
    amount: Decimal,
    pin: &str,
    available: Decimal,
) -> Result<()> {
    println!("\n{}", "=".repeat(70));
    println!("  WITHDRAW {} USDC FROM POOL | Available: {}", amount, available);
    println!("{}\n", "=".repeat(70));

    let withdrawal = PoolWithdrawal::new(
        Arc::new(HttpWalletProvider::new(&config.wallet_api_url, &config.wallet_api_key)?),
        Arc::new(StaticToken::new(config.bearer_token.clone())),
        Arc::new(ConsoleNotifier),
        config.pool_config()?,
    );

    let request = WithdrawRequest {
        amount,
        pin: pin.to_string(),
    };
    let receipt = withdrawal.withdraw(user, available, &request).await?;

    println!(
        "  Transaction: {}",
        receipt.receipt.tx_hash().unwrap_or("(no hash returned)")
    );
    Ok(())
}
