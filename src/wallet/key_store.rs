//! Client-side store for wallet secrets
//!
//! Secrets are cached per merchant and network so the user can sign later
//! without re-entering them. Every operation is best-effort: failures are
//! logged and reported as `false`/`None`, never raised to the caller.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::types::Network;

/// Injected key-value capability
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns false if the value could not be written
    async fn set(&self, key: &str, value: &str) -> bool;
    async fn get(&self, key: &str) -> Option<String>;
    /// Returns false if the store could not be reached
    async fn remove(&self, key: &str) -> bool;
}

/// Key under which a merchant's secret is cached for a network
pub fn storage_key(merchant_id: &str, network: Network) -> String {
    format!("encryptKey_{}_{}", merchant_id, network)
}

/// Look up the secret cached for a merchant on a network
pub async fn stored_encryption_key(
    store: &dyn KeyValueStore,
    merchant_id: &str,
    network: Network,
) -> Option<String> {
    store.get(&storage_key(merchant_id, network)).await
}

/// Forget the secret cached for a merchant on a network
pub async fn clear_stored_encryption_key(
    store: &dyn KeyValueStore,
    merchant_id: &str,
    network: Network,
) -> bool {
    store.remove(&storage_key(merchant_id, network)).await
}

/// Process-local store, lost on exit
#[derive(Clone, Default)]
pub struct MemoryKeyStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyStore {
    async fn set(&self, key: &str, value: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        debug!("[KeyStore] Stored {}", key);
        true
    }

    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(key).cloned()
    }

    async fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            info!("[KeyStore] Removed {}", key);
        }
        true
    }
}

/// Stands in for a key database that could not be opened; every write fails
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableKeyStore;

#[async_trait]
impl KeyValueStore for UnavailableKeyStore {
    async fn set(&self, key: &str, _value: &str) -> bool {
        debug!("[KeyStore] Not storing {}: key store unavailable", key);
        false
    }

    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn remove(&self, _key: &str) -> bool {
        false
    }
}

/// Open the SQLite store at `url`, or `UnavailableKeyStore` if it cannot be opened.
///
/// A broken database only costs the local cache, never the wallet creation.
pub async fn open_key_store(url: &str) -> Arc<dyn KeyValueStore> {
    match SqliteKeyStore::new(url).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("[KeyStore] Local key cache unavailable: {:#}", e);
            Arc::new(UnavailableKeyStore)
        }
    }
}

/// SQLite-backed store that survives restarts
pub struct SqliteKeyStore {
    pool: SqlitePool,
}

impl SqliteKeyStore {
    /// Open (creating if missing) the key database at `url`,
    /// e.g. `sqlite://wallet-keys.db` or `sqlite::memory:`
    pub async fn new(url: &str) -> Result<Self> {
        let in_memory = url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        if !in_memory {
            options = options.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
        }

        // Each in-memory connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await
            .context("Failed to open key store")?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS encryption_keys (
                storage_key TEXT PRIMARY KEY,
                secret TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create encryption_keys table")?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyStore {
    async fn set(&self, key: &str, value: &str) -> bool {
        let result = sqlx::query(
            r#"
            INSERT INTO encryption_keys (storage_key, secret, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(storage_key) DO UPDATE SET
                secret = excluded.secret,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!("[KeyStore] Stored {}", key);
                true
            }
            Err(e) => {
                warn!("[KeyStore] Failed to store {}: {}", key, e);
                false
            }
        }
    }

    async fn get(&self, key: &str) -> Option<String> {
        sqlx::query_scalar::<_, String>("SELECT secret FROM encryption_keys WHERE storage_key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                warn!("[KeyStore] Failed to read {}: {}", key, e);
                None
            })
    }

    async fn remove(&self, key: &str) -> bool {
        match sqlx::query("DELETE FROM encryption_keys WHERE storage_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
        {
            Ok(done) => {
                if done.rows_affected() > 0 {
                    info!("[KeyStore] Removed {}", key);
                }
                true
            }
            Err(e) => {
                warn!("[KeyStore] Failed to remove {}: {}", key, e);
                false
            }
        }
    }
}
