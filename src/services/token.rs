//! Bearer token acquisition for the wallet service

use async_trait::async_trait;

/// Black-box source of the user's bearer token
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// `None` when the user is not signed in
    async fn bearer_token(&self) -> Option<String>;
}

/// Token fixed at startup, e.g. from the environment
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.is_empty()))
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_token_is_none() {
        assert!(StaticToken::new(Some(String::new())).bearer_token().await.is_none());
        assert_eq!(
            StaticToken::new(Some("t".to_string())).bearer_token().await.as_deref(),
            Some("t")
        );
    }
}
