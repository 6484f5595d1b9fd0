//! Core types for merchant wallet onboarding

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::wallet::PinDigest;

/// Network the wallet is created on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    #[default]
    Mainnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }

    /// Title-cased name used in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            Network::Testnet => "Testnet",
            Network::Mainnet => "Mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(format!("Unknown network: {}", other)),
        }
    }
}

/// Merchant record supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub business_email: Option<String>,
}

/// Backend credentials issued to a merchant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantApiKeys {
    /// API key sent as `x-api-key`
    pub public_key: String,
    /// Bearer token for the merchant backend
    pub jwt: String,
}

/// Merchant record plus the credentials needed to update it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantContext {
    pub merchant: MerchantRecord,
    #[serde(default)]
    pub api_keys: Option<MerchantApiKeys>,
}

impl MerchantContext {
    pub fn new(merchant: MerchantRecord) -> Self {
        Self {
            merchant,
            api_keys: None,
        }
    }

    pub fn with_api_keys(mut self, api_key: impl Into<String>, jwt: impl Into<String>) -> Self {
        self.api_keys = Some(MerchantApiKeys {
            public_key: api_key.into(),
            jwt: jwt.into(),
        });
        self
    }

    /// Merchant JWT, if one was issued and is non-empty
    pub fn jwt(&self) -> Option<&str> {
        self.api_keys
            .as_ref()
            .map(|k| k.jwt.as_str())
            .filter(|jwt| !jwt.is_empty())
    }

    pub fn api_key(&self) -> &str {
        self.api_keys
            .as_ref()
            .map(|k| k.public_key.as_str())
            .unwrap_or("")
    }
}

/// Where the wallet secret comes from
#[derive(Debug, Clone, Default)]
pub struct WalletCreationParams {
    /// PIN entered by the user
    pub pin: Option<String>,
    /// Pre-derived hex encryption key (used when no PIN is given)
    pub encrypt_key: Option<String>,
    pub external_user_id: String,
    pub network: Network,
    /// Salt for the PIN digest sent to the merchant backend
    pub encryption_salt: Option<String>,
}

impl WalletCreationParams {
    pub fn new(external_user_id: impl Into<String>, network: Network) -> Self {
        Self {
            external_user_id: external_user_id.into(),
            network,
            ..Default::default()
        }
    }

    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    pub fn with_encrypt_key(mut self, key: impl Into<String>) -> Self {
        self.encrypt_key = Some(key.into());
        self
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.encryption_salt = Some(salt.into());
        self
    }
}

/// Side-effect toggles for a wallet creation run
#[derive(Debug, Clone)]
pub struct WalletCreationConfig {
    pub auto_generate_key: bool,
    pub enable_local_storage: bool,
    pub show_success_notifications: bool,
    pub show_error_notifications: bool,
    pub update_merchant_record: bool,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub exponential_backoff: bool,
    /// Value of `x-environment` on the merchant update; `None` follows the wallet network
    pub merchant_environment: Option<Network>,
    pub pin_digest: PinDigest,
}

impl Default for WalletCreationConfig {
    fn default() -> Self {
        Self {
            auto_generate_key: true,
            enable_local_storage: true,
            show_success_notifications: true,
            show_error_notifications: true,
            update_merchant_record: true,
            max_retries: 3,
            retry_delay_ms: 1000,
            exponential_backoff: true,
            merchant_environment: None,
            pin_digest: PinDigest::default(),
        }
    }
}

/// Raw response of the wallet-creation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletResponse(pub serde_json::Value);

impl WalletResponse {
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for WalletResponse {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Non-fatal problems hit after the wallet was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum Warning {
    AddressMissing,
    LocalStoreFailed,
    MerchantLinkSkipped(String),
    MerchantLinkFailed(String),
}

impl Warning {
    pub fn user_message(&self) -> String {
        match self {
            Warning::AddressMissing => "Wallet created but address extraction failed".to_string(),
            Warning::LocalStoreFailed => {
                "Wallet created but failed to store key locally".to_string()
            }
            Warning::MerchantLinkSkipped(reason) => {
                format!("Wallet created but merchant record not updated ({})", reason)
            }
            Warning::MerchantLinkFailed(_) => {
                "Wallet created but failed to update merchant record".to_string()
            }
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

/// What happened to the merchant-record update
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum MerchantLinkOutcome {
    /// The run ended before reaching the linking step
    #[default]
    NotAttempted,
    Disabled,
    Skipped(String),
    Linked,
    Failed(String),
}

impl MerchantLinkOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, MerchantLinkOutcome::Failed(_))
    }
}

/// Terminal outcome of every wallet creation path
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletCreationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_response: Option<WalletResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Secret actually used for the wallet (PIN, explicit or generated key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypt_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub merchant_link: MerchantLinkOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl WalletCreationResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Wallet exists but at least one follow-up step degraded
    pub fn is_partial(&self) -> bool {
        self.success && !self.warnings.is_empty()
    }
}
