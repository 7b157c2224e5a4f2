/// Cache backend abstraction
///
/// The feed index, content store and comment ring are built on three
/// primitives: a sorted set, plain string keys, and a bounded list. The
/// backend is injected so the caching layer is never tied to a live Redis:
/// production uses [`RedisBackend`], tests and local runs use
/// [`super::memory::MemoryBackend`].
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

use crate::error::Result;

/// Sorted-set, string and list primitives required by the caching layer.
///
/// All operations are idempotent sets/deletes; correctness of concurrent
/// callers relies on that rather than on any locking here.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Add or update `member` with `score` in the sorted set at `key`.
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()>;

    /// Number of members in the sorted set at `key`.
    async fn zcard(&self, key: &str) -> Result<u64>;

    /// Remove `members` from the sorted set at `key`.
    async fn zrem(&self, key: &str, members: &[String]) -> Result<()>;

    /// Members with score <= `max`, highest score first, at most `limit`.
    async fn zrevrangebyscore(&self, key: &str, max: f64, limit: usize) -> Result<Vec<String>>;

    /// Members by ascending rank (lowest score first), `start..=stop`.
    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;

    /// Set a string key, optionally with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Read a string key; `None` is a miss, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Delete a key of any type.
    async fn del(&self, key: &str) -> Result<()>;

    /// Prepend a value to the list at `key`.
    async fn lpush(&self, key: &str, value: &str) -> Result<()>;

    /// Trim the list at `key` to the elements `start..=stop`.
    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()>;

    /// List elements `start..=stop`, head first.
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;
}

/// Redis-backed implementation over a shared `ConnectionManager`.
///
/// The manager is cloned per call; it multiplexes over one connection and
/// reconnects internally.
#[derive(Clone)]
pub struct RedisBackend {
    redis: ConnectionManager,
}

impl RedisBackend {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// Connect to Redis from a URL and wrap the connection manager.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self::new(manager))
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        let mut conn = self.redis.clone();
        conn.zadd::<_, _, _, ()>(key, member, score).await?;
        Ok(())
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        let mut conn = self.redis.clone();
        Ok(conn.zcard::<_, u64>(key).await?)
    }

    async fn zrem(&self, key: &str, members: &[String]) -> Result<()> {
        if members.is_empty() {
            return Ok(());
        }
        let mut conn = self.redis.clone();
        conn.zrem::<_, _, ()>(key, members).await?;
        Ok(())
    }

    async fn zrevrangebyscore(&self, key: &str, max: f64, limit: usize) -> Result<Vec<String>> {
        let mut conn = self.redis.clone();
        Ok(conn
            .zrevrangebyscore_limit::<_, _, _, Vec<String>>(key, max, "-inf", 0, limit as isize)
            .await?)
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut conn = self.redis.clone();
        Ok(conn.zrange::<_, Vec<String>>(key, start, stop).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.redis.clone();
        match ttl {
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?;
            }
            None => {
                conn.set::<_, _, ()>(key, value).await?;
            }
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.redis.clone();
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.redis.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.redis.clone();
        conn.lpush::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        let mut conn = self.redis.clone();
        conn.ltrim::<_, ()>(key, start, stop).await?;
        Ok(())
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut conn = self.redis.clone();
        Ok(conn.lrange::<_, Vec<String>>(key, start, stop).await?)
    }
}
