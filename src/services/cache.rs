//! Caching layer used by the appointment use cases.
//!
//! Provides:
//! - The [`CacheProvider`] port the services depend on
//! - A Redis implementation with connection pooling via ConnectionManager
//!   and a default TTL on every entry
//! - JSON helpers for typed values
//! - Cache key builders

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

#[async_trait]
pub trait CacheProvider: Send + Sync {
    async fn save(&self, key: &str, value: String) -> Result<()>;

    async fn recover(&self, key: &str) -> Result<Option<String>>;

    async fn invalidate(&self, key: &str) -> Result<()>;

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Serialize `value` as JSON and store it under `key`.
pub async fn save_json<T: Serialize + Sync>(
    cache: &dyn CacheProvider,
    key: &str,
    value: &T,
) -> Result<()> {
    let data = serde_json::to_string(value).context("Failed to serialize value for cache")?;
    cache.save(key, data).await
}

/// Read a JSON value; any failure is logged and treated as a miss.
pub async fn recover_json<T: DeserializeOwned>(cache: &dyn CacheProvider, key: &str) -> Option<T> {
    match cache.recover(key).await {
        Ok(Some(data)) => match serde_json::from_str(&data) {
            Ok(value) => {
                debug!(key = key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key = key, error = %e, "Failed to deserialize cached value");
                None
            }
        },
        Ok(None) => {
            debug!(key = key, "Cache miss");
            None
        }
        Err(e) => {
            error!(key = key, error = %e, "Cache read error");
            None
        }
    }
}

/// Redis cache client with connection pooling.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: Duration,
}

impl RedisCache {
    pub async fn new(redis_url: &str, default_ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!("Redis cache connected");

        Ok(Self {
            conn,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        })
    }
}

#[async_trait]
impl CacheProvider for RedisCache {
    #[instrument(skip(self, value))]
    async fn save(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.conn.clone();

        conn.set_ex::<_, _, ()>(key, value, self.default_ttl.as_secs())
            .await
            .context("Failed to set cache value")?;

        debug!(key = key, ttl_secs = self.default_ttl.as_secs(), "Cached value");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn recover(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();

        conn.get::<_, Option<String>>(key)
            .await
            .context("Failed to get cache value")
    }

    #[instrument(skip(self))]
    async fn invalidate(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        let deleted: i32 = conn.del(key).await.context("Failed to delete cache key")?;

        debug!(key = key, deleted = deleted > 0, "Cache delete");
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis health check failed")?;
        Ok(())
    }
}

/// Cache key builders for consistent key formats.
pub mod keys {
    use chrono::{Datelike, NaiveDate};
    use uuid::Uuid;

    /// A provider's appointments on one local calendar day
    pub fn provider_appointments(provider_id: Uuid, day: NaiveDate) -> String {
        format!(
            "provider-appointments:{}:{}-{}-{}",
            provider_id,
            day.year(),
            day.month(),
            day.day()
        )
    }
}
