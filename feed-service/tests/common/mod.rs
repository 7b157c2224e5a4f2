#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use feed_service::cache::{CacheBackend, FeedCache, MemoryBackend};
use feed_service::config::{CacheConfig, MediaConfig, RetryConfig};
use feed_service::db::DurableStore;
use feed_service::error::{AppError, Result};
use feed_service::models::{Comment, Post, PostWithComments};

/// In-memory durable store with transient-failure injection.
#[derive(Default)]
pub struct MemoryStore {
    posts: Mutex<Vec<Post>>,
    comments: Mutex<Vec<Comment>>,
    failing_inserts: AtomicU32,
    fallback_queries: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` insert calls fail with a transient database error.
    pub fn fail_next_inserts(&self, n: u32) {
        self.failing_inserts.store(n, Ordering::SeqCst);
    }

    /// How many times the fallback page query ran.
    pub fn fallback_queries(&self) -> u32 {
        self.fallback_queries.load(Ordering::SeqCst)
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.lock().unwrap().len()
    }

    pub fn seed_post(&self, post: Post) {
        self.posts.lock().unwrap().push(post);
    }

    pub fn seed_comment(&self, comment: Comment) {
        self.comments.lock().unwrap().push(comment);
    }

    fn take_injected_failure(&self) -> Option<AppError> {
        let remaining = self.failing_inserts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_inserts.store(remaining - 1, Ordering::SeqCst);
            Some(AppError::Database("injected transient failure".into()))
        } else {
            None
        }
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn insert_post(&self, post: &Post) -> Result<()> {
        if let Some(err) = self.take_injected_failure() {
            return Err(err);
        }
        let mut posts = self.posts.lock().unwrap();
        if !posts.iter().any(|p| p.id == post.id) {
            posts.push(post.clone());
        }
        Ok(())
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        if let Some(err) = self.take_injected_failure() {
            return Err(err);
        }
        let mut comments = self.comments.lock().unwrap();
        if !comments.iter().any(|c| c.id == comment.id) {
            comments.push(comment.clone());
        }
        Ok(())
    }

    async fn posts_before(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PostWithComments>> {
        self.fallback_queries.fetch_add(1, Ordering::SeqCst);

        let mut page: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.created_at < before)
            .cloned()
            .collect();
        page.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        page.truncate(limit as usize);

        let comments = self.comments.lock().unwrap();
        Ok(page
            .into_iter()
            .map(|post| {
                let mut recent: Vec<Comment> = comments
                    .iter()
                    .filter(|c| c.post_id == post.id)
                    .cloned()
                    .collect();
                recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                recent.truncate(2);
                PostWithComments {
                    post,
                    recent_comments: recent,
                }
            })
            .collect())
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != post_id);
        let deleted = posts.len() < before;
        if deleted {
            self.comments.lock().unwrap().retain(|c| c.post_id != post_id);
        }
        Ok(deleted)
    }
}

/// Cache backend wrapper that fails the next `n` string writes, for
/// exercising the write path's retry over cache errors.
pub struct FlakyBackend {
    inner: MemoryBackend,
    failing_sets: AtomicU32,
}

impl FlakyBackend {
    pub fn new(failing_sets: u32) -> Self {
        Self {
            inner: MemoryBackend::new(),
            failing_sets: AtomicU32::new(failing_sets),
        }
    }
}

#[async_trait]
impl CacheBackend for FlakyBackend {
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        self.inner.zadd(key, member, score).await
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        self.inner.zcard(key).await
    }

    async fn zrem(&self, key: &str, members: &[String]) -> Result<()> {
        self.inner.zrem(key, members).await
    }

    async fn zrevrangebyscore(&self, key: &str, max: f64, limit: usize) -> Result<Vec<String>> {
        self.inner.zrevrangebyscore(key, max, limit).await
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        self.inner.zrange(key, start, stop).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let remaining = self.failing_sets.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_sets.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::Cache("injected transient failure".into()));
        }
        self.inner.set(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.inner.del(key).await
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<()> {
        self.inner.lpush(key, value).await
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        self.inner.ltrim(key, start, stop).await
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        self.inner.lrange(key, start, stop).await
    }
}

pub fn cache_config(max_feed_size: u64) -> CacheConfig {
    CacheConfig {
        url: String::new(),
        max_feed_size,
        comment_ring_size: 6,
        post_ttl: None,
    }
}

pub fn memory_cache(max_feed_size: u64) -> FeedCache {
    FeedCache::new(Arc::new(MemoryBackend::new()), &cache_config(max_feed_size))
}

pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        base_backoff: Duration::from_millis(1),
        jitter: false,
    }
}

pub fn media_config() -> MediaConfig {
    MediaConfig {
        raw_container: "posts-original".to_string(),
        processed_container: "posts-processed".to_string(),
    }
}

pub fn post_at_millis(ts_ms: i64) -> Post {
    Post {
        id: Uuid::new_v4(),
        caption: format!("post at {}", ts_ms),
        image_url: format!("https://cdn.example/posts-original/{}.png", ts_ms),
        creator_id: Uuid::new_v4(),
        created_at: DateTime::from_timestamp_millis(ts_ms).unwrap(),
    }
}

pub fn comment_on(post_id: Uuid, content: &str) -> Comment {
    Comment {
        id: Uuid::new_v4(),
        content: content.to_string(),
        creator_id: Uuid::new_v4(),
        post_id,
        created_at: Utc::now(),
    }
}
