//! Fatal error taxonomy for wallet onboarding

use thiserror::Error;

/// Errors that end a wallet operation before it completes.
///
/// Remote failures keep the remote message verbatim so callers see
/// exactly what the wallet service or backend reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// Bad PIN/key format or no usable secret
    #[error("{0}")]
    Validation(String),

    /// No bearer token for the wallet service
    #[error("{0}")]
    Auth(String),

    /// Remote call still failing after retries
    #[error("{0}")]
    Remote(String),
}
