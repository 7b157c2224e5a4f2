/// Post write path
///
/// Creation runs the durable insert and the cache population as one
/// bounded-retry unit: cache write errors are part of the write contract
/// here, unlike on the read path. There is no rollback across the two
/// stores; after an exhausted retry the read path's database fallback is
/// what keeps the feed correct.
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::FeedCache;
use crate::config::RetryConfig;
use crate::db::DurableStore;
use crate::error::Result;
use crate::models::{CreatePostRequest, Post};
use crate::retry::with_retry;

pub struct PostService {
    store: Arc<dyn DurableStore>,
    cache: FeedCache,
    retry: RetryConfig,
}

impl PostService {
    pub fn new(store: Arc<dyn DurableStore>, cache: FeedCache, retry: RetryConfig) -> Self {
        Self {
            store,
            cache,
            retry,
        }
    }

    /// Create a post: durable insert, feed index add and body cache as one
    /// retry unit. Both writes are idempotent on the post id, so a retry
    /// after a partial failure simply converges.
    pub async fn create_post(&self, request: CreatePostRequest) -> Result<Post> {
        let post = Post {
            id: Uuid::new_v4(),
            caption: request.caption,
            image_url: request.image_url,
            creator_id: request.creator_id,
            created_at: Utc::now(),
        };

        let store = &self.store;
        let cache = &self.cache;
        let post_ref = &post;
        with_retry(&self.retry, "create_post", move || async move {
            store.insert_post(post_ref).await?;
            cache.add_post(post_ref).await
        })
        .await?;

        info!(post_id = %post.id, creator_id = %post.creator_id, "post created");
        Ok(post)
    }

    /// Delete a post durably and cascade into the cache (index entry, body,
    /// comment ring). Returns whether the post existed.
    pub async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let deleted = self.store.delete_post(post_id).await?;
        if !deleted {
            warn!(%post_id, "delete requested for unknown post");
            return Ok(false);
        }

        self.cache.remove_post(post_id).await?;
        info!(%post_id, "post deleted");
        Ok(true)
    }
}
