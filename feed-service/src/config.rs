/// Configuration management for the feed service
///
/// Loads configuration from environment variables with development defaults.
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Cache (Redis) configuration
    pub cache: CacheConfig,
    /// Media URL rewrite configuration
    pub media: MediaConfig,
    /// Write-path retry configuration
    pub retry: RetryConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Cache (Redis) configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis URL
    pub url: String,
    /// Capacity bound of the feed index; oldest entries are evicted past it
    pub max_feed_size: u64,
    /// Number of comments retained per post
    pub comment_ring_size: usize,
    /// Optional TTL for cached post bodies
    pub post_ttl: Option<Duration>,
}

/// Raw-upload to processed-media URL rewrite
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Container/prefix images are uploaded to
    pub raw_container: String,
    /// Container/prefix the image pipeline publishes to
    pub processed_container: String,
}

/// Retry policy for the write path
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (first try included)
    pub max_attempts: u32,
    /// Base backoff; attempt n sleeps base * 2^n
    pub base_backoff: Duration,
    /// Add random jitter to backoff (±30%)
    pub jitter: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            max_feed_size: 1_000,
            comment_ring_size: 6,
            post_ttl: None,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            raw_container: "posts-original".to_string(),
            processed_container: "posts-processed".to_string(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_secs(1),
            jitter: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        Ok(Config {
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/feed".to_string()),
                max_connections: parse_env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            cache: CacheConfig {
                url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                max_feed_size: parse_env_or("FEED_CACHE_MAX_SIZE", 1_000)?,
                comment_ring_size: parse_env_or("FEED_CACHE_COMMENT_RING_SIZE", 6)?,
                post_ttl: match std::env::var("FEED_CACHE_POST_TTL_SECS") {
                    Ok(v) => Some(Duration::from_secs(
                        v.parse()
                            .map_err(|e| format!("invalid FEED_CACHE_POST_TTL_SECS: {}", e))?,
                    )),
                    Err(_) => None,
                },
            },
            media: MediaConfig {
                raw_container: std::env::var("MEDIA_RAW_CONTAINER")
                    .unwrap_or_else(|_| "posts-original".to_string()),
                processed_container: std::env::var("MEDIA_PROCESSED_CONTAINER")
                    .unwrap_or_else(|_| "posts-processed".to_string()),
            },
            retry: RetryConfig {
                max_attempts: parse_env_or("WRITE_RETRY_MAX_ATTEMPTS", 3)?,
                base_backoff: Duration::from_millis(parse_env_or(
                    "WRITE_RETRY_BASE_BACKOFF_MS",
                    1_000,
                )?),
                jitter: false,
            },
        })
    }
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
