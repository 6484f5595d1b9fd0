//! Merchant Wallet Library
//!
//! Onboards merchants onto a custodial wallet service:
//!
//! 1. **Wallet creation**: resolve a secret (PIN, explicit key or a
//!    generated one), create the wallet with retry, cache the secret
//!    locally and link the new address to the merchant record. Failures
//!    after the wallet exists are reported as warnings, not errors.
//!
//! 2. **Withdrawals**: move USDC from the merchant pool to the vault with
//!    one contract call executed by the wallet service.

pub mod config;
pub mod error;
pub mod notify;
pub mod onboarding;
pub mod services;
pub mod types;
pub mod wallet;
pub mod withdraw;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::WalletError;
pub use notify::{ConsoleNotifier, Notice, NoticeLevel, Notifier, RecordingNotifier, StatusSink};
pub use onboarding::WalletOnboarding;
pub use types::{
    MerchantContext, MerchantLinkOutcome, MerchantRecord, Network, WalletCreationConfig,
    WalletCreationParams, WalletCreationResult, WalletResponse, Warning,
};
pub use wallet::{
    clear_stored_encryption_key, open_key_store, stored_encryption_key, KeyValueStore,
    MemoryKeyStore, SqliteKeyStore, UnavailableKeyStore,
};
pub use withdraw::{PoolConfig, PoolWithdrawal, WithdrawError, WithdrawReceipt, WithdrawRequest};
