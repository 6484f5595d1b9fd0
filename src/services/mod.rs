//! Remote services used during onboarding and withdrawals

pub mod merchant_api;
pub mod remote_error;
pub mod retry;
pub mod token;
pub mod wallet_api;

pub use merchant_api::{HttpMerchantApi, MerchantApi, MerchantWalletUpdate};
pub use remote_error::RemoteError;
pub use retry::{with_retry, RetryPolicy};
pub use token::{StaticToken, TokenSource};
pub use wallet_api::{
    CallContractRequest, ContractCall, CreateWalletRequest, HttpWalletProvider,
    TransactionReceipt, WalletProvider,
};
