//! Merchant backend client
//!
//! Links a freshly created wallet address to the merchant record.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::remote_error::RemoteError;
use crate::types::Network;

pub const UPDATE_WALLET_PATH: &str = "/api/merchants/update-wallet";

const UPDATE_FAILED_MESSAGE: &str = "Failed to update merchant record";

/// Everything the backend needs to link a wallet to a merchant
#[derive(Clone)]
pub struct MerchantWalletUpdate {
    pub merchant_id: String,
    pub wallet_address: String,
    /// Digest of the PIN (or the key itself), never the raw PIN
    pub encrypted_pin: String,
    pub jwt: String,
    pub api_key: String,
    pub environment: Network,
}

impl fmt::Debug for MerchantWalletUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantWalletUpdate")
            .field("merchant_id", &self.merchant_id)
            .field("wallet_address", &self.wallet_address)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateWalletBody<'a> {
    merchant_id: &'a str,
    chipi_wallet_address: &'a str,
    encrypted_pin: &'a str,
}

#[derive(Debug, Deserialize)]
struct UpdateWalletResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
pub trait MerchantApi: Send + Sync {
    async fn update_wallet(&self, update: &MerchantWalletUpdate) -> Result<(), RemoteError>;
}

/// reqwest-backed merchant backend client
#[derive(Clone)]
pub struct HttpMerchantApi {
    client: Client,
    base_url: String,
}

impl HttpMerchantApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MerchantApi for HttpMerchantApi {
    async fn update_wallet(&self, update: &MerchantWalletUpdate) -> Result<(), RemoteError> {
        if update.wallet_address.is_empty() {
            return Err(RemoteError::Rejected("No wallet address".to_string()));
        }

        debug!(
            "[MerchantApi] Linking {} to merchant {} ({})",
            update.wallet_address, update.merchant_id, update.environment
        );

        let body = UpdateWalletBody {
            merchant_id: &update.merchant_id,
            chipi_wallet_address: &update.wallet_address,
            encrypted_pin: &update.encrypted_pin,
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, UPDATE_WALLET_PATH))
            .bearer_auth(&update.jwt)
            .header("x-api-key", &update.api_key)
            .header("x-environment", update.environment.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError::from_network_error(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::from_network_error(&e))?;

        if !status.is_success() {
            let err =
                RemoteError::from_response(status.as_u16(), &text, UPDATE_FAILED_MESSAGE);
            warn!("[MerchantApi] Failed to update merchant wallet: {}", err);
            return Err(err);
        }

        let parsed: UpdateWalletResponse = serde_json::from_str(&text)
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
        if parsed.success == Some(false) {
            let msg = parsed
                .error
                .unwrap_or_else(|| UPDATE_FAILED_MESSAGE.to_string());
            warn!("[MerchantApi] Backend rejected wallet update: {}", msg);
            return Err(RemoteError::Rejected(msg));
        }

        info!("[MerchantApi] Merchant {} wallet updated", update.merchant_id);
        Ok(())
    }
}
