//! Configuration management for merchant wallet onboarding

use anyhow::Result;
use std::env;

use crate::types::{MerchantContext, MerchantRecord, Network, WalletCreationConfig};
use crate::withdraw::PoolConfig;

/// Configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Wallet service base URL
    pub wallet_api_url: String,

    /// Wallet service API key
    pub wallet_api_key: String,

    /// User bearer token for the wallet service (optional)
    pub bearer_token: Option<String>,

    /// Merchant backend base URL
    pub merchant_api_url: String,

    /// Merchant whose record gets the wallet
    pub merchant_id: String,

    /// Merchant backend credentials (optional, linking is skipped without a JWT)
    pub merchant_jwt: Option<String>,
    pub merchant_api_key: Option<String>,

    /// Default external user id for created wallets
    pub external_user_id: Option<String>,

    /// Network wallets are created on
    pub network: Network,

    /// SQLite URL of the local key store
    pub key_store_url: String,

    /// Pool and vault contracts for withdrawals (optional)
    pub pool_address: Option<String>,
    pub vault_address: Option<String>,

    /// Retry settings for remote calls
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub exponential_backoff: bool,

    /// Salt for the PIN digest stored on the merchant record
    pub pin_salt: Option<String>,
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let wallet_api_url = env::var("WALLET_API_URL")
            .unwrap_or_else(|_| "https://api.chipipay.com/v1".to_string());

        let wallet_api_key = env::var("WALLET_API_KEY").unwrap_or_default();

        let merchant_api_url = env::var("MERCHANT_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let merchant_id = env::var("MERCHANT_ID").unwrap_or_default();

        let network = match optional("WALLET_NETWORK") {
            Some(v) => v.parse().map_err(anyhow::Error::msg)?,
            None => Network::default(),
        };

        let key_store_url = env::var("KEY_STORE_PATH")
            .map(|p| {
                if p.starts_with("sqlite:") {
                    p
                } else {
                    format!("sqlite://{}", p)
                }
            })
            .unwrap_or_else(|_| "sqlite://wallet-keys.db".to_string());

        let max_retries = env::var("WALLET_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let retry_delay_ms = env::var("WALLET_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);

        let exponential_backoff = env::var("WALLET_EXPONENTIAL_BACKOFF")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        Ok(Self {
            wallet_api_url,
            wallet_api_key,
            bearer_token: optional("WALLET_BEARER_TOKEN"),
            merchant_api_url,
            merchant_id,
            merchant_jwt: optional("MERCHANT_JWT"),
            merchant_api_key: optional("MERCHANT_API_KEY"),
            external_user_id: optional("EXTERNAL_USER_ID"),
            network,
            key_store_url,
            pool_address: optional("POOL_ADDRESS"),
            vault_address: optional("VAULT_ADDRESS"),
            max_retries,
            retry_delay_ms,
            exponential_backoff,
            pin_salt: optional("PIN_SALT"),
        })
    }

    /// Merchant record and credentials for onboarding
    pub fn merchant_context(&self) -> Result<MerchantContext> {
        if self.merchant_id.is_empty() {
            anyhow::bail!("MERCHANT_ID required");
        }
        let ctx = MerchantContext::new(MerchantRecord {
            id: self.merchant_id.clone(),
            name: None,
            business_email: None,
        });
        Ok(match &self.merchant_jwt {
            Some(jwt) => ctx.with_api_keys(self.merchant_api_key.clone().unwrap_or_default(), jwt),
            None => ctx,
        })
    }

    /// Creation defaults with this environment's retry settings
    pub fn creation_config(&self) -> WalletCreationConfig {
        WalletCreationConfig {
            max_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
            exponential_backoff: self.exponential_backoff,
            ..Default::default()
        }
    }

    /// Pool and vault contracts, both required for withdrawals
    pub fn pool_config(&self) -> Result<PoolConfig> {
        match (&self.pool_address, &self.vault_address) {
            (Some(pool), Some(vault)) => Ok(PoolConfig {
                pool_address: pool.clone(),
                vault_address: vault.clone(),
            }),
            _ => anyhow::bail!("POOL_ADDRESS and VAULT_ADDRESS required for withdrawals"),
        }
    }
}
