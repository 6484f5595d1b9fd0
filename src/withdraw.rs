//! Pool-to-vault withdrawals
//!
//! Moves USDC from the merchant's pool contract to the vault with a single
//! `transfer` call executed by the wallet service. Contract calls are not
//! retried: a failed transfer is reported once and left to the user.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::notify::{NoopStatus, Notifier, StatusSink};
use crate::services::{
    CallContractRequest, ContractCall, RemoteError, TokenSource, TransactionReceipt,
    WalletProvider,
};

/// USDC uses 6 decimals on chain
pub const USDC_DECIMALS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WithdrawError {
    #[error("Please enter a valid amount within your balance.")]
    InvalidAmount,

    #[error("Please enter your security PIN to proceed.")]
    PinRequired,

    #[error("No bearer token found")]
    NoBearerToken,

    #[error("{0}")]
    Remote(#[from] RemoteError),
}

impl WithdrawError {
    /// Short heading shown above the message
    pub fn title(&self) -> &'static str {
        match self {
            WithdrawError::InvalidAmount => "Invalid amount",
            WithdrawError::PinRequired => "PIN required",
            WithdrawError::NoBearerToken | WithdrawError::Remote(_) => "Withdrawal failed",
        }
    }
}

/// Contracts involved in a withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub pool_address: String,
    pub vault_address: String,
}

#[derive(Debug, Clone)]
pub struct WithdrawRequest {
    /// Amount in USDC
    pub amount: Decimal,
    pub pin: String,
}

#[derive(Debug, Clone)]
pub struct WithdrawReceipt {
    pub amount: Decimal,
    /// Amount in USDC base units
    pub raw_amount: u128,
    pub receipt: TransactionReceipt,
}

/// Convert USDC to base units; `None` if the amount is negative or too precise
pub fn to_raw_amount(amount: Decimal) -> Option<u128> {
    let raw = amount.checked_mul(Decimal::from(10u64.pow(USDC_DECIMALS)))?;
    if !raw.fract().is_zero() {
        return None;
    }
    raw.to_u128()
}

pub struct PoolWithdrawal {
    provider: Arc<dyn WalletProvider>,
    tokens: Arc<dyn TokenSource>,
    notifier: Arc<dyn Notifier>,
    status: Arc<dyn StatusSink>,
    pool: PoolConfig,
}

impl PoolWithdrawal {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        tokens: Arc<dyn TokenSource>,
        notifier: Arc<dyn Notifier>,
        pool: PoolConfig,
    ) -> Self {
        Self {
            provider,
            tokens,
            notifier,
            status: Arc::new(NoopStatus),
            pool,
        }
    }

    pub fn with_status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    /// Withdraw `request.amount` from the pool to the vault.
    ///
    /// Amount and PIN are checked before any remote call.
    pub async fn withdraw(
        &self,
        external_user_id: &str,
        available_balance: Decimal,
        request: &WithdrawRequest,
    ) -> Result<WithdrawReceipt, WithdrawError> {
        let raw_amount = match to_raw_amount(request.amount) {
            Some(raw)
                if request.amount > Decimal::ZERO && request.amount <= available_balance =>
            {
                raw
            }
            _ => return Err(self.report(WithdrawError::InvalidAmount)),
        };
        if request.pin.is_empty() {
            return Err(self.report(WithdrawError::PinRequired));
        }

        self.status.set_loading(true);
        let outcome = self.execute(external_user_id, raw_amount, &request.pin).await;
        self.status.set_loading(false);

        match outcome {
            Ok(receipt) => {
                let amount = request.amount.normalize();
                info!(
                    "[Withdraw] {} USDC moved to vault (tx {})",
                    amount,
                    receipt.tx_hash().unwrap_or("unknown")
                );
                self.notifier.success(&format!(
                    "Withdrawal to vault successful: {} USDC withdrawn to vault.",
                    amount
                ));
                Ok(WithdrawReceipt {
                    amount: request.amount,
                    raw_amount,
                    receipt,
                })
            }
            Err(err) => {
                error!("[Withdraw] Withdrawal to vault failed: {}", err);
                Err(self.report(err))
            }
        }
    }

    async fn execute(
        &self,
        external_user_id: &str,
        raw_amount: u128,
        pin: &str,
    ) -> Result<TransactionReceipt, WithdrawError> {
        let token = self
            .tokens
            .bearer_token()
            .await
            .filter(|t| !t.is_empty())
            .ok_or(WithdrawError::NoBearerToken)?;

        let wallet = self.provider.get_wallet(external_user_id, &token).await?;

        let request = CallContractRequest {
            encrypt_key: pin.to_string(),
            wallet,
            contract_address: self.pool.pool_address.clone(),
            calls: vec![ContractCall {
                contract_address: self.pool.pool_address.clone(),
                entrypoint: "transfer".to_string(),
                calldata: vec![self.pool.vault_address.clone(), raw_amount.to_string()],
            }],
        };

        Ok(self.provider.call_any_contract(&request, &token).await?)
    }

    fn report(&self, err: WithdrawError) -> WithdrawError {
        self.status.set_error(Some(&err.to_string()));
        self.notifier.error(&format!("{}: {}", err.title(), err));
        err
    }
}
