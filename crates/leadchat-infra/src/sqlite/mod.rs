//! SQLite persistence for forms, leads and owner keys.

pub mod api_key;
pub mod form;
pub mod lead;
pub mod pool;

use chrono::{DateTime, Utc};
use leadchat_types::error::RepositoryError;

use self::pool::DatabasePool;

/// Form and lead repositories over a [`DatabasePool`].
#[derive(Clone)]
pub struct SqliteStore {
    pool: DatabasePool,
}

impl SqliteStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

/// Timestamps are stored as RFC 3339 text.
pub(crate) fn parse_datetime(text: &str) -> Result<DateTime<Utc>, RepositoryError> {
    match DateTime::parse_from_rfc3339(text) {
        Ok(stamp) => Ok(stamp.with_timezone(&Utc)),
        Err(e) => Err(RepositoryError::Query(format!("bad timestamp {text:?}: {e}"))),
    }
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

#[cfg(test)]
pub(crate) async fn test_pool() -> DatabasePool {
    // Kept on disk for the rest of the test process.
    let dir = tempfile::tempdir().unwrap().keep();
    DatabasePool::new(&pool::database_url(&dir)).await.unwrap()
}
