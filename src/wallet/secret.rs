//! Picks the wallet secret for a creation run: PIN, explicit key, or a fresh generated key

use std::fmt;

use super::generator::generate_encrypt_key;
use super::pin::{derive_pin_secret, validate_encrypt_key, validate_pin};
use crate::error::WalletError;
use crate::types::{WalletCreationConfig, WalletCreationParams};

pub const INVALID_PIN: &str = "Invalid PIN format (must be 4-32 characters)";
pub const INVALID_KEY: &str = "Invalid encryption key format";
pub const SECRET_REQUIRED: &str = "PIN or encryption key is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Pin,
    ExplicitKey,
    Generated,
}

/// Secret sent to the wallet service plus the value stored on the merchant record
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    pub source: SecretSource,
    /// Raw PIN or key handed to wallet creation
    pub wallet_secret: String,
    /// Digest of the PIN, or the key itself
    pub merchant_secret: String,
}

impl fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("source", &self.source)
            .field("wallet_secret", &"<redacted>")
            .field("merchant_secret", &"<redacted>")
            .finish()
    }
}

/// Resolve the secret with precedence PIN > explicit key > auto-generate.
///
/// Empty strings count as absent. Nothing here touches the network.
pub fn resolve_secret(
    params: &WalletCreationParams,
    config: &WalletCreationConfig,
) -> Result<ResolvedSecret, WalletError> {
    if let Some(pin) = params.pin.as_deref().filter(|p| !p.is_empty()) {
        if !validate_pin(pin) {
            return Err(WalletError::Validation(INVALID_PIN.to_string()));
        }
        return Ok(ResolvedSecret {
            source: SecretSource::Pin,
            wallet_secret: pin.to_string(),
            merchant_secret: derive_pin_secret(
                pin,
                params.encryption_salt.as_deref(),
                config.pin_digest,
            ),
        });
    }

    if let Some(key) = params.encrypt_key.as_deref().filter(|k| !k.is_empty()) {
        if !validate_encrypt_key(key) {
            return Err(WalletError::Validation(INVALID_KEY.to_string()));
        }
        return Ok(ResolvedSecret {
            source: SecretSource::ExplicitKey,
            wallet_secret: key.to_string(),
            merchant_secret: key.to_string(),
        });
    }

    if config.auto_generate_key {
        let key = generate_encrypt_key();
        return Ok(ResolvedSecret {
            source: SecretSource::Generated,
            wallet_secret: key.clone(),
            merchant_secret: key,
        });
    }

    Err(WalletError::Validation(SECRET_REQUIRED.to_string()))
}
