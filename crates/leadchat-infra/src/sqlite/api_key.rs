//! Owner API keys.
//!
//! Only the SHA-256 hex digest of a key is stored. The plaintext is shown
//! once, when the key is generated.

use chrono::Utc;
use leadchat_types::error::RepositoryError;
use sha2::{Digest, Sha256};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// Prefix of every generated key.
pub const API_KEY_PREFIX: &str = "lchat_";

/// Compute SHA-256 hash of an API key (lowercase hex).
pub fn hash_api_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{:x}", digest)
}

/// Storage for hashed owner API keys.
#[derive(Clone)]
pub struct ApiKeyStore {
    pool: DatabasePool,
}

impl ApiKeyStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Generate a key if none exists yet.
    ///
    /// Returns `Some(plaintext)` when a key was created, `None` when one
    /// already existed.
    pub async fn ensure_key(&self) -> Result<Option<String>, RepositoryError> {
        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM api_keys LIMIT 1")
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if existing.is_some() {
            return Ok(None);
        }

        self.create_key("default").await.map(Some)
    }

    /// Generate and store a new named key, returning its plaintext.
    pub async fn create_key(&self, name: &str) -> Result<String, RepositoryError> {
        // Two random v4 UUIDs give 244 bits of key material.
        let plaintext = format!(
            "{API_KEY_PREFIX}{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );

        sqlx::query("INSERT INTO api_keys (id, key_hash, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(Uuid::now_v7().to_string())
            .bind(hash_api_key(&plaintext))
            .bind(name)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(plaintext)
    }

    /// Check a presented key, touching `last_used_at` on success.
    pub async fn verify(&self, key: &str) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT id FROM api_keys WHERE key_hash = ?")
            .bind(hash_api_key(key))
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(false);
        };

        let id: String = row.get("id");
        // Best effort; a failed touch never rejects a valid key.
        let _ = sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(&id)
            .execute(&self.pool.writer)
            .await;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;

    #[test]
    fn test_hash_known_value() {
        assert_eq!(
            hash_api_key(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_ensure_key_only_once() {
        let store = ApiKeyStore::new(test_pool().await);

        let key = store.ensure_key().await.unwrap().unwrap();
        assert!(key.starts_with(API_KEY_PREFIX));
        assert_eq!(key.len(), API_KEY_PREFIX.len() + 64);

        assert!(store.ensure_key().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify() {
        let store = ApiKeyStore::new(test_pool().await);
        let key = store.create_key("ci").await.unwrap();

        assert!(store.verify(&key).await.unwrap());
        assert!(!store.verify("lchat_wrong").await.unwrap());
    }
}
