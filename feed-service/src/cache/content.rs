/// Content store and comment ring
///
/// `ContentStore` keeps serialized post bodies under `post:v1:{id}`.
/// `CommentRing` keeps the latest K comments of a post under
/// `post:v1:{id}:comments`, newest first, trimmed on every push.
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::backend::CacheBackend;
use crate::error::Result;
use crate::models::{Comment, Post};

fn post_key(post_id: Uuid) -> String {
    format!("post:v1:{}", post_id)
}

fn comments_key(post_id: Uuid) -> String {
    format!("post:v1:{}:comments", post_id)
}

#[derive(Clone)]
pub struct ContentStore {
    backend: Arc<dyn CacheBackend>,
    ttl: Option<Duration>,
}

impl ContentStore {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Option<Duration>) -> Self {
        Self { backend, ttl }
    }

    pub async fn set_post(&self, post: &Post) -> Result<()> {
        let body = serde_json::to_string(post)?;
        self.backend.set(&post_key(post.id), &body, self.ttl).await
    }

    /// Cached post body; `None` is a miss.
    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        match self.backend.get(&post_key(post_id)).await? {
            Some(body) => {
                debug!(%post_id, "post cache hit");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => {
                debug!(%post_id, "post cache miss");
                Ok(None)
            }
        }
    }

    pub async fn remove_post(&self, post_id: Uuid) -> Result<()> {
        self.backend.del(&post_key(post_id)).await
    }
}

#[derive(Clone)]
pub struct CommentRing {
    backend: Arc<dyn CacheBackend>,
    capacity: usize,
}

impl CommentRing {
    pub fn new(backend: Arc<dyn CacheBackend>, capacity: usize) -> Self {
        Self { backend, capacity }
    }

    /// Prepend a comment and trim the ring back to capacity.
    pub async fn push(&self, comment: &Comment) -> Result<()> {
        let key = comments_key(comment.post_id);
        let body = serde_json::to_string(comment)?;
        self.backend.lpush(&key, &body).await?;
        self.backend
            .ltrim(&key, 0, self.capacity as isize - 1)
            .await
    }

    /// Up to `n` most recent comments, newest first.
    pub async fn recent(&self, post_id: Uuid, n: usize) -> Result<Vec<Comment>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let raw = self
            .backend
            .lrange(&comments_key(post_id), 0, n as isize - 1)
            .await?;
        let mut comments = Vec::with_capacity(raw.len());
        for body in raw {
            comments.push(serde_json::from_str(&body)?);
        }
        Ok(comments)
    }

    pub async fn remove(&self, post_id: Uuid) -> Result<()> {
        self.backend.del(&comments_key(post_id)).await
    }
}
