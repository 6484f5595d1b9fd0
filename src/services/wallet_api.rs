//! Wallet-as-a-service client
//!
//! The wallet service owns key custody: it creates wallets from a user
//! secret, looks them up by external user id, and executes contract calls
//! signed with the stored key. Everything here is opaque remote work, so
//! the orchestrator only sees the `WalletProvider` trait.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::remote_error::RemoteError;
use crate::types::WalletResponse;

/// Body of a wallet-creation call
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest {
    /// PIN or key the service encrypts the wallet with
    pub encrypt_key: String,
    pub external_user_id: String,
}

impl fmt::Debug for CreateWalletRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateWalletRequest")
            .field("encrypt_key", &"<redacted>")
            .field("external_user_id", &self.external_user_id)
            .finish()
    }
}

/// A single contract invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCall {
    pub contract_address: String,
    pub entrypoint: String,
    pub calldata: Vec<String>,
}

/// Body of an arbitrary contract-call transaction
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallContractRequest {
    pub encrypt_key: String,
    /// Wallet as returned by `get_wallet`
    pub wallet: Value,
    pub contract_address: String,
    pub calls: Vec<ContractCall>,
}

impl fmt::Debug for CallContractRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContractRequest")
            .field("encrypt_key", &"<redacted>")
            .field("contract_address", &self.contract_address)
            .field("calls", &self.calls)
            .finish()
    }
}

/// Raw response of a contract-call transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionReceipt(pub Value);

impl TransactionReceipt {
    pub fn tx_hash(&self) -> Option<&str> {
        ["/txHash", "/transactionHash", "/hash"]
            .iter()
            .find_map(|p| self.0.pointer(p).and_then(Value::as_str))
    }
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn create_wallet(
        &self,
        request: &CreateWalletRequest,
        bearer_token: &str,
    ) -> Result<WalletResponse, RemoteError>;

    async fn get_wallet(
        &self,
        external_user_id: &str,
        bearer_token: &str,
    ) -> Result<Value, RemoteError>;

    async fn call_any_contract(
        &self,
        request: &CallContractRequest,
        bearer_token: &str,
    ) -> Result<TransactionReceipt, RemoteError>;
}

/// reqwest-backed wallet service client
#[derive(Clone)]
pub struct HttpWalletProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpWalletProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json(response: reqwest::Response, fallback: &str) -> Result<Value, RemoteError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::from_network_error(&e))?;

        if !status.is_success() {
            return Err(RemoteError::from_response(status.as_u16(), &text, fallback));
        }

        serde_json::from_str(&text).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl WalletProvider for HttpWalletProvider {
    async fn create_wallet(
        &self,
        request: &CreateWalletRequest,
        bearer_token: &str,
    ) -> Result<WalletResponse, RemoteError> {
        debug!("[WalletApi] Creating wallet for user {}", request.external_user_id);
        let response = self
            .client
            .post(self.url("/chipi-wallets"))
            .bearer_auth(bearer_token)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| RemoteError::from_network_error(&e))?;

        Self::read_json(response, "Wallet creation failed")
            .await
            .map(WalletResponse)
    }

    async fn get_wallet(
        &self,
        external_user_id: &str,
        bearer_token: &str,
    ) -> Result<Value, RemoteError> {
        let url = self.url(&format!(
            "/chipi-wallets/by-user?externalUserId={}",
            urlencoding::encode(external_user_id)
        ));
        let response = self
            .client
            .get(url)
            .bearer_auth(bearer_token)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| RemoteError::from_network_error(&e))?;

        Self::read_json(response, "Wallet not found").await
    }

    async fn call_any_contract(
        &self,
        request: &CallContractRequest,
        bearer_token: &str,
    ) -> Result<TransactionReceipt, RemoteError> {
        debug!(
            "[WalletApi] Calling {} ({} calls)",
            request.contract_address,
            request.calls.len()
        );
        let response = self
            .client
            .post(self.url("/transactions/call-contract"))
            .bearer_auth(bearer_token)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| RemoteError::from_network_error(&e))?;

        Self::read_json(response, "Contract call failed")
            .await
            .map(TransactionReceipt)
    }
}
