//! Wallet onboarding for merchants
//!
//! Creates a custodial wallet with the wallet service, caches the secret
//! locally and links the new address to the merchant record.
//!
//! Only two things can fail a run: a missing auth token (or unusable
//! secret) before any remote call, and wallet creation still failing after
//! retries. Everything after the wallet exists degrades to a warning, and
//! the returned `WalletCreationResult` carries whatever was obtained.
//!
//! Runs are not idempotent. Calling again after a partial success creates
//! a brand-new wallet.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::WalletError;
use crate::notify::{NoopStatus, Notifier, StatusSink};
use crate::services::{
    with_retry, CreateWalletRequest, MerchantApi, MerchantWalletUpdate, RetryPolicy,
    WalletProvider,
};
use crate::types::{
    MerchantContext, MerchantLinkOutcome, Network, WalletCreationConfig, WalletCreationParams,
    WalletCreationResult, Warning,
};
use crate::wallet::{extract_address, resolve_secret, storage_key, KeyValueStore, ResolvedSecret};

const NO_TOKEN_NOTICE: &str = "Failed to create wallet: No authentication token";
const LINKED_NOTICE: &str = "Wallet linked to merchant account";

/// Gates notices on the run's configuration
struct Notices<'a> {
    notifier: &'a dyn Notifier,
    config: &'a WalletCreationConfig,
}

impl Notices<'_> {
    fn success(&self, message: &str) {
        if self.config.show_success_notifications {
            self.notifier.success(message);
        }
    }

    fn warning(&self, message: &str) {
        if self.config.show_error_notifications {
            self.notifier.warning(message);
        }
    }

    fn error(&self, message: &str) {
        if self.config.show_error_notifications {
            self.notifier.error(message);
        }
    }
}

/// Drives wallet creation end to end
#[derive(Clone)]
pub struct WalletOnboarding {
    provider: Arc<dyn WalletProvider>,
    merchant_api: Arc<dyn MerchantApi>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    status: Arc<dyn StatusSink>,
}

impl WalletOnboarding {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        merchant_api: Arc<dyn MerchantApi>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            provider,
            merchant_api,
            store,
            notifier,
            status: Arc::new(NoopStatus),
        }
    }

    pub fn with_status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    /// Create a wallet and link it to the merchant record.
    ///
    /// `auth_token` is the user's bearer token for the wallet service.
    pub async fn create_wallet_with_merchant_update(
        &self,
        ctx: &MerchantContext,
        params: &WalletCreationParams,
        auth_token: Option<&str>,
        config: &WalletCreationConfig,
    ) -> WalletCreationResult {
        let notices = Notices {
            notifier: self.notifier.as_ref(),
            config,
        };
        let network = params.network;

        let Some(token) = auth_token.filter(|t| !t.is_empty()) else {
            let err = WalletError::Auth(format!(
                "No authentication token available for {} wallet creation",
                network
            ));
            warn!("[Onboarding] {}", err);
            return self.fail(err, NO_TOKEN_NOTICE, &notices);
        };

        let secret = match resolve_secret(params, config) {
            Ok(secret) => secret,
            Err(err) => {
                warn!("[Onboarding] Rejected wallet request: {}", err);
                let notice = err.to_string();
                return self.fail(err, &notice, &notices);
            }
        };
        debug!("[Onboarding] Using {:?} secret", secret.source);

        self.status.set_loading(true);
        self.status.set_error(None);
        let result = self
            .run(ctx, params, token, config, &secret, &notices)
            .await;
        self.status.set_loading(false);
        result
    }

    async fn run(
        &self,
        ctx: &MerchantContext,
        params: &WalletCreationParams,
        token: &str,
        config: &WalletCreationConfig,
        secret: &ResolvedSecret,
        notices: &Notices<'_>,
    ) -> WalletCreationResult {
        let network = params.network;
        let policy = RetryPolicy::from(config);

        let request = CreateWalletRequest {
            encrypt_key: secret.wallet_secret.clone(),
            external_user_id: params.external_user_id.clone(),
        };

        let wallet_response = match with_retry(&policy, "create_wallet", || {
            self.provider.create_wallet(&request, token)
        })
        .await
        {
            Ok(response) => response,
            Err(err) => {
                error!("[Onboarding] Wallet creation failed: {}", err);
                let err = WalletError::Remote(err.to_string());
                let notice = format!("Wallet creation failed: {}", err);
                return self.fail(err, &notice, notices);
            }
        };

        info!(
            "[Onboarding] {} wallet created for user {}",
            network.label(),
            params.external_user_id
        );

        let mut result = WalletCreationResult {
            success: true,
            encrypt_key: Some(secret.wallet_secret.clone()),
            ..Default::default()
        };

        let public_key = extract_address(&wallet_response);
        result.wallet_response = Some(wallet_response);
        match &public_key {
            Some(address) => debug!("[Onboarding] Wallet address {}", address),
            None => {
                warn!("[Onboarding] Wallet response did not contain an address");
                degrade(&mut result, Warning::AddressMissing, notices);
            }
        }

        if config.enable_local_storage {
            let key = storage_key(&ctx.merchant.id, network);
            if !self.store.set(&key, &secret.wallet_secret).await {
                degrade(&mut result, Warning::LocalStoreFailed, notices);
            }
        }

        result.merchant_link = self
            .link_merchant(ctx, public_key.as_deref(), secret, network, config, &policy)
            .await;
        match result.merchant_link.clone() {
            MerchantLinkOutcome::Linked => notices.success(LINKED_NOTICE),
            MerchantLinkOutcome::Failed(msg) => {
                degrade(&mut result, Warning::MerchantLinkFailed(msg), notices)
            }
            MerchantLinkOutcome::Skipped(reason) => {
                degrade(&mut result, Warning::MerchantLinkSkipped(reason), notices)
            }
            MerchantLinkOutcome::Disabled | MerchantLinkOutcome::NotAttempted => {}
        }

        let summary = if result.merchant_link.is_failed() {
            format!("{} wallet created (with warnings)", network.label())
        } else {
            format!("{} wallet created successfully!", network.label())
        };
        notices.success(&summary);

        result.public_key = public_key;
        result
    }

    async fn link_merchant(
        &self,
        ctx: &MerchantContext,
        public_key: Option<&str>,
        secret: &ResolvedSecret,
        network: Network,
        config: &WalletCreationConfig,
        policy: &RetryPolicy,
    ) -> MerchantLinkOutcome {
        if !config.update_merchant_record {
            return MerchantLinkOutcome::Disabled;
        }
        let Some(address) = public_key else {
            warn!("[Onboarding] Skipping merchant record update: no wallet address");
            return MerchantLinkOutcome::Skipped("no wallet address".to_string());
        };
        let Some(jwt) = ctx.jwt() else {
            warn!("[Onboarding] Skipping merchant record update: no JWT token available");
            return MerchantLinkOutcome::Skipped("no JWT token".to_string());
        };

        let update = MerchantWalletUpdate {
            merchant_id: ctx.merchant.id.clone(),
            wallet_address: address.to_string(),
            encrypted_pin: secret.merchant_secret.clone(),
            jwt: jwt.to_string(),
            api_key: ctx.api_key().to_string(),
            environment: config.merchant_environment.unwrap_or(network),
        };

        match with_retry(policy, "update_merchant_wallet", || {
            self.merchant_api.update_wallet(&update)
        })
        .await
        {
            Ok(()) => {
                info!("[Onboarding] Wallet linked to merchant {}", ctx.merchant.id);
                MerchantLinkOutcome::Linked
            }
            Err(err) => {
                error!("[Onboarding] Failed to update merchant record: {}", err);
                MerchantLinkOutcome::Failed(err.to_string())
            }
        }
    }

    fn fail(&self, err: WalletError, notice: &str, notices: &Notices<'_>) -> WalletCreationResult {
        let message = err.to_string();
        self.status.set_error(Some(&message));
        notices.error(notice);
        WalletCreationResult::failure(message)
    }

    /// Wallet with an auto-generated key
    pub async fn create_invisible_wallet(
        &self,
        ctx: &MerchantContext,
        auth_token: Option<&str>,
        external_user_id: &str,
        network: Network,
    ) -> WalletCreationResult {
        let params = WalletCreationParams::new(external_user_id, network);
        self.create_wallet_with_merchant_update(
            ctx,
            &params,
            auth_token,
            &WalletCreationConfig::default(),
        )
        .await
    }

    /// Wallet secured by a user PIN; only a digest of the PIN reaches the backend
    pub async fn create_wallet_with_pin(
        &self,
        ctx: &MerchantContext,
        auth_token: Option<&str>,
        external_user_id: &str,
        pin: &str,
        network: Network,
        encryption_salt: Option<&str>,
    ) -> WalletCreationResult {
        let mut params = WalletCreationParams::new(external_user_id, network).with_pin(pin);
        if let Some(salt) = encryption_salt {
            params = params.with_salt(salt);
        }
        self.create_wallet_with_merchant_update(ctx, &params, auth_token, &explicit_secret_config())
            .await
    }

    /// Wallet secured by a caller-supplied hex key
    pub async fn create_wallet_with_custom_key(
        &self,
        ctx: &MerchantContext,
        auth_token: Option<&str>,
        external_user_id: &str,
        encrypt_key: &str,
        network: Network,
    ) -> WalletCreationResult {
        let params =
            WalletCreationParams::new(external_user_id, network).with_encrypt_key(encrypt_key);
        self.create_wallet_with_merchant_update(ctx, &params, auth_token, &explicit_secret_config())
            .await
    }
}

fn explicit_secret_config() -> WalletCreationConfig {
    WalletCreationConfig {
        auto_generate_key: false,
        ..Default::default()
    }
}

fn degrade(result: &mut WalletCreationResult, warning: Warning, notices: &Notices<'_>) {
    notices.warning(&warning.user_message());
    result.warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NoticeLevel, RecordingNotifier, RecordingStatus};
    use crate::services::RemoteError;
    use crate::test_support::{merchant_context, MockMerchantApi, MockWalletProvider};
    use crate::wallet::{derive_pin_secret, open_key_store, MemoryKeyStore, PinDigest};
    use serde_json::json;

    struct Harness {
        provider: Arc<MockWalletProvider>,
        merchant: Arc<MockMerchantApi>,
        store: Arc<MemoryKeyStore>,
        notifier: Arc<RecordingNotifier>,
        status: Arc<RecordingStatus>,
        onboarding: WalletOnboarding,
    }

    fn harness(provider: MockWalletProvider, merchant: MockMerchantApi) -> Harness {
        let provider = Arc::new(provider);
        let merchant = Arc::new(merchant);
        let store = Arc::new(MemoryKeyStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let status = Arc::new(RecordingStatus::new());
        let onboarding = WalletOnboarding::new(
            provider.clone(),
            merchant.clone(),
            store.clone(),
            notifier.clone(),
        )
        .with_status(status.clone());
        Harness {
            provider,
            merchant,
            store,
            notifier,
            status,
            onboarding,
        }
    }

    fn pin_params(pin: &str) -> WalletCreationParams {
        WalletCreationParams::new("user-1", Network::Mainnet).with_pin(pin)
    }

    #[tokio::test(start_paused = true)]
    async fn test_pin_flow_links_merchant() {
        let h = harness(
            MockWalletProvider::returning(json!({"publicKey": "0xDEF"})),
            MockMerchantApi::succeeding(),
        );

        let result = h
            .onboarding
            .create_wallet_with_merchant_update(
                &merchant_context(),
                &pin_params("1234"),
                Some("user-token"),
                &WalletCreationConfig::default(),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.public_key.as_deref(), Some("0xDEF"));
        assert_eq!(result.encrypt_key.as_deref(), Some("1234"));
        assert!(result.error.is_none());
        assert!(result.warnings.is_empty());
        assert_eq!(result.merchant_link, MerchantLinkOutcome::Linked);

        assert_eq!(
            h.notifier.messages(NoticeLevel::Success),
            vec![
                "Wallet linked to merchant account".to_string(),
                "Mainnet wallet created successfully!".to_string(),
            ]
        );
        assert!(h.notifier.messages(NoticeLevel::Warning).is_empty());
        assert!(h.notifier.messages(NoticeLevel::Error).is_empty());

        let (secret, user, token) = h.provider.last_request().unwrap();
        assert_eq!(secret, "1234");
        assert_eq!(user, "user-1");
        assert_eq!(token, "user-token");

        // Backend gets the digest, never the raw PIN
        let update = h.merchant.last_update().unwrap();
        assert_eq!(update.encrypted_pin, derive_pin_secret("1234", None, PinDigest::Sha256));
        assert_ne!(update.encrypted_pin, "1234");
        assert_eq!(update.wallet_address, "0xDEF");
        assert_eq!(update.environment, Network::Mainnet);
        assert_eq!(update.jwt, "merchant-jwt");

        assert_eq!(
            h.store.get("encryptKey_m-1_mainnet").await.as_deref(),
            Some("1234")
        );
        assert_eq!(h.status.snapshot().loading_transitions, vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_merchant_link_failure_keeps_success() {
        let h = harness(
            MockWalletProvider::returning(json!({"publicKey": "0xDEF"})),
            MockMerchantApi::failing(RemoteError::Rejected("db down".to_string())),
        );

        let result = h
            .onboarding
            .create_wallet_with_merchant_update(
                &merchant_context(),
                &pin_params("1234"),
                Some("user-token"),
                &WalletCreationConfig::default(),
            )
            .await;

        assert!(result.success);
        assert!(result.is_partial());
        assert_eq!(result.public_key.as_deref(), Some("0xDEF"));
        assert_eq!(
            result.merchant_link,
            MerchantLinkOutcome::Failed("db down".to_string())
        );
        // Linking went through the retry helper
        assert_eq!(h.merchant.calls(), 4);

        assert_eq!(
            h.notifier.messages(NoticeLevel::Warning),
            vec!["Wallet created but failed to update merchant record".to_string()]
        );
        assert_eq!(
            h.notifier.messages(NoticeLevel::Success),
            vec!["Mainnet wallet created (with warnings)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_token_makes_no_remote_calls() {
        let h = harness(
            MockWalletProvider::returning(json!({"publicKey": "0xDEF"})),
            MockMerchantApi::succeeding(),
        );

        for token in [None, Some("")] {
            let result = h
                .onboarding
                .create_wallet_with_merchant_update(
                    &merchant_context(),
                    &pin_params("1234"),
                    token,
                    &WalletCreationConfig::default(),
                )
                .await;

            assert!(!result.success);
            assert_eq!(
                result.error.as_deref(),
                Some("No authentication token available for mainnet wallet creation")
            );
        }

        assert_eq!(h.provider.calls(), 0);
        assert_eq!(h.merchant.calls(), 0);
        assert!(h.store.is_empty().await);
        assert_eq!(
            h.notifier.messages(NoticeLevel::Error),
            vec![NO_TOKEN_NOTICE.to_string(), NO_TOKEN_NOTICE.to_string()]
        );
        assert!(h.status.snapshot().loading_transitions.is_empty());
    }

    #[tokio::test]
    async fn test_bad_pin_length_never_calls_provider() {
        let h = harness(
            MockWalletProvider::returning(json!({"publicKey": "0xDEF"})),
            MockMerchantApi::succeeding(),
        );

        let too_long = "7".repeat(33);
        for pin in ["1", "123", too_long.as_str()] {
            let result = h
                .onboarding
                .create_wallet_with_merchant_update(
                    &merchant_context(),
                    &pin_params(pin),
                    Some("user-token"),
                    &WalletCreationConfig::default(),
                )
                .await;
            assert!(!result.success);
            assert_eq!(
                result.error.as_deref(),
                Some("Invalid PIN format (must be 4-32 characters)")
            );
        }

        assert_eq!(h.provider.calls(), 0);
        assert_eq!(
            h.status.snapshot().error.as_deref(),
            Some("Invalid PIN format (must be 4-32 characters)")
        );
    }

    #[tokio::test]
    async fn test_non_hex_key_never_calls_provider() {
        let h = harness(
            MockWalletProvider::returning(json!({"publicKey": "0xDEF"})),
            MockMerchantApi::succeeding(),
        );
        let params =
            WalletCreationParams::new("user-1", Network::Testnet).with_encrypt_key("abcd-ef01");

        let result = h
            .onboarding
            .create_wallet_with_merchant_update(
                &merchant_context(),
                &params,
                Some("user-token"),
                &WalletCreationConfig::default(),
            )
            .await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid encryption key format"));
        assert_eq!(h.provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_address_persists_but_skips_linking() {
        let h = harness(
            MockWalletProvider::returning(json!({})),
            MockMerchantApi::succeeding(),
        );

        let result = h
            .onboarding
            .create_wallet_with_merchant_update(
                &merchant_context(),
                &pin_params("1234"),
                Some("user-token"),
                &WalletCreationConfig::default(),
            )
            .await;

        assert!(result.success);
        assert!(result.public_key.is_none());
        assert_eq!(result.wallet_response.unwrap().0, json!({}));
        assert_eq!(h.merchant.calls(), 0);
        assert_eq!(
            result.merchant_link,
            MerchantLinkOutcome::Skipped("no wallet address".to_string())
        );
        assert_eq!(result.warnings[0], Warning::AddressMissing);
        assert_eq!(
            h.notifier.messages(NoticeLevel::Warning)[0],
            "Wallet created but address extraction failed"
        );
        assert_eq!(
            h.store.get("encryptKey_m-1_mainnet").await.as_deref(),
            Some("1234")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wallet_creation_exhaustion_is_fatal() {
        let h = harness(
            MockWalletProvider::failing(RemoteError::Rejected("boom".to_string())),
            MockMerchantApi::succeeding(),
        );

        let result = h
            .onboarding
            .create_wallet_with_merchant_update(
                &merchant_context(),
                &pin_params("1234"),
                Some("user-token"),
                &WalletCreationConfig::default(),
            )
            .await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert!(result.wallet_response.is_none());
        assert_eq!(result.merchant_link, MerchantLinkOutcome::NotAttempted);
        assert_eq!(h.provider.calls(), 4);
        assert_eq!(h.merchant.calls(), 0);
        assert!(h.store.is_empty().await);
        assert_eq!(
            h.notifier.messages(NoticeLevel::Error),
            vec!["Wallet creation failed: boom".to_string()]
        );

        let status = h.status.snapshot();
        assert_eq!(status.loading_transitions, vec![true, false]);
        assert_eq!(status.error.as_deref(), Some("boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wallet_creation_recovers_within_retries() {
        let h = harness(
            MockWalletProvider::flaky(2, json!({"accountAddress": "0x77"})),
            MockMerchantApi::succeeding(),
        );

        let result = h
            .onboarding
            .create_wallet_with_merchant_update(
                &merchant_context(),
                &pin_params("1234"),
                Some("user-token"),
                &WalletCreationConfig::default(),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.public_key.as_deref(), Some("0x77"));
        assert_eq!(h.provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_unopenable_key_store_is_warning() {
        let provider = Arc::new(MockWalletProvider::returning(json!({"publicKey": "0xDEF"})));
        let notifier = Arc::new(RecordingNotifier::new());
        let onboarding = WalletOnboarding::new(
            provider,
            Arc::new(MockMerchantApi::succeeding()),
            open_key_store("sqlite:///nonexistent-wallet-dir/keys.db").await,
            notifier.clone(),
        );

        let result = onboarding
            .create_wallet_with_merchant_update(
                &merchant_context(),
                &pin_params("1234"),
                Some("user-token"),
                &WalletCreationConfig::default(),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.warnings, vec![Warning::LocalStoreFailed]);
        assert_eq!(result.merchant_link, MerchantLinkOutcome::Linked);
        assert_eq!(
            notifier.messages(NoticeLevel::Warning),
            vec!["Wallet created but failed to store key locally".to_string()]
        );
        assert_eq!(
            notifier.messages(NoticeLevel::Success).last().map(String::as_str),
            Some("Mainnet wallet created successfully!")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_jwt_skips_linking_with_warning() {
        let h = harness(
            MockWalletProvider::returning(json!({"publicKey": "0xDEF"})),
            MockMerchantApi::succeeding(),
        );
        let mut ctx = merchant_context();
        ctx.api_keys = None;

        let result = h
            .onboarding
            .create_wallet_with_merchant_update(
                &ctx,
                &pin_params("1234"),
                Some("user-token"),
                &WalletCreationConfig::default(),
            )
            .await;

        assert!(result.success);
        assert_eq!(h.merchant.calls(), 0);
        assert_eq!(
            h.notifier.messages(NoticeLevel::Warning),
            vec!["Wallet created but merchant record not updated (no JWT token)".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_side_effects_and_silenced_notices() {
        let h = harness(
            MockWalletProvider::returning(json!({"publicKey": "0xDEF"})),
            MockMerchantApi::succeeding(),
        );
        let config = WalletCreationConfig {
            enable_local_storage: false,
            update_merchant_record: false,
            show_success_notifications: false,
            show_error_notifications: false,
            ..Default::default()
        };

        let result = h
            .onboarding
            .create_wallet_with_merchant_update(
                &merchant_context(),
                &pin_params("1234"),
                Some("user-token"),
                &config,
            )
            .await;

        assert!(result.success);
        assert_eq!(result.merchant_link, MerchantLinkOutcome::Disabled);
        assert!(h.store.is_empty().await);
        assert_eq!(h.merchant.calls(), 0);
        assert!(h.notifier.notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_merchant_environment_override() {
        let h = harness(
            MockWalletProvider::returning(json!({"publicKey": "0xDEF"})),
            MockMerchantApi::succeeding(),
        );
        let config = WalletCreationConfig {
            merchant_environment: Some(Network::Testnet),
            ..Default::default()
        };

        h.onboarding
            .create_wallet_with_merchant_update(
                &merchant_context(),
                &pin_params("1234"),
                Some("user-token"),
                &config,
            )
            .await;

        assert_eq!(h.merchant.last_update().unwrap().environment, Network::Testnet);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invisible_wallet_generates_and_caches_key() {
        let h = harness(
            MockWalletProvider::returning(json!({"wallet": {"publicKey": "0x9"}})),
            MockMerchantApi::succeeding(),
        );

        let result = h
            .onboarding
            .create_invisible_wallet(&merchant_context(), Some("t"), "user-9", Network::Testnet)
            .await;

        let key = result.encrypt_key.clone().unwrap();
        assert_eq!(key.len(), 32);
        assert_eq!(h.provider.last_request().unwrap().0, key);
        // Generated keys are sent as-is to the backend
        assert_eq!(h.merchant.last_update().unwrap().encrypted_pin, key);
        assert_eq!(
            h.store.get("encryptKey_m-1_testnet").await.as_deref(),
            Some(key.as_str())
        );
        assert_eq!(
            h.notifier.messages(NoticeLevel::Success).last().map(String::as_str),
            Some("Testnet wallet created successfully!")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_key_and_salted_pin_presets() {
        let h = harness(
            MockWalletProvider::returning(json!({"address": "0xABC"})),
            MockMerchantApi::succeeding(),
        );
        let ctx = merchant_context();

        let result = h
            .onboarding
            .create_wallet_with_custom_key(&ctx, Some("t"), "u", "C0FFEE", Network::Mainnet)
            .await;
        assert!(result.success);
        assert_eq!(result.public_key.as_deref(), Some("0xABC"));
        assert_eq!(h.merchant.last_update().unwrap().encrypted_pin, "C0FFEE");

        let result = h
            .onboarding
            .create_wallet_with_pin(&ctx, Some("t"), "u", "5555", Network::Mainnet, Some("pepper"))
            .await;
        assert!(result.success);
        assert_eq!(
            h.merchant.last_update().unwrap().encrypted_pin,
            derive_pin_secret("5555", Some("pepper"), PinDigest::Sha256)
        );

        // Presets never fall back to a generated key
        let result = h
            .onboarding
            .create_wallet_with_pin(&ctx, Some("t"), "u", "", Network::Mainnet, None)
            .await;
        assert_eq!(result.error.as_deref(), Some("PIN or encryption key is required"));
    }
}
