//! Redis-backed blob store for production deployments.
//!
//! Each blob is one string key under a configurable prefix. `set_many` runs
//! as a `MULTI`/`EXEC` pipeline, so the snapshot tables are replaced together.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::ports::{BlobStore, BlobStoreError};

/// Redis-backed blob store.
#[derive(Clone)]
pub struct RedisBlobStore {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisBlobStore {
    /// Create a new Redis blob store.
    pub fn new(conn: MultiplexedConnection, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    fn key(&self, name: &str) -> String {
        redis_key(&self.key_prefix, name)
    }
}

fn redis_key(prefix: &str, name: &str) -> String {
    format!("{}{}", prefix, name)
}

#[async_trait]
impl BlobStore for RedisBlobStore {
    async fn get(&self, name: &str) -> Result<Option<String>, BlobStoreError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(self.key(name))
            .await
            .map_err(|e: redis::RedisError| BlobStoreError::Backend(e.to_string()))
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), BlobStoreError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(self.key(name), value)
            .await
            .map_err(|e: redis::RedisError| BlobStoreError::Backend(e.to_string()))
    }

    async fn set_many(&self, blobs: &[(String, String)]) -> Result<(), BlobStoreError> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (name, value) in blobs {
            pipe.set(self.key(name), value).ignore();
        }

        let mut conn = self.conn.clone();
        pipe.query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e: redis::RedisError| BlobStoreError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_prefixed() {
        assert_eq!(redis_key("patron-sync:", "reward-users"), "patron-sync:reward-users");
    }

    #[test]
    fn test_empty_prefix_uses_bare_name() {
        assert_eq!(redis_key("", "pledges"), "pledges");
    }
}
