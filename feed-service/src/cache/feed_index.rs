/// Feed index
///
/// Sorted-set membership structure mapping post id to its recency score
/// (creation time as epoch milliseconds). Backs the bounded range queries
/// of the pagination path and the oldest-first reads of eviction.
use std::sync::Arc;
use uuid::Uuid;

use super::backend::CacheBackend;
use crate::error::Result;

const FEED_INDEX_KEY: &str = "feed:v1:posts";

#[derive(Clone)]
pub struct FeedIndex {
    backend: Arc<dyn CacheBackend>,
}

impl FeedIndex {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Insert or rescore a post.
    pub async fn add(&self, post_id: Uuid, score_ms: i64) -> Result<()> {
        self.backend
            .zadd(FEED_INDEX_KEY, &post_id.to_string(), score_ms as f64)
            .await
    }

    /// Post ids with score <= `max_ms`, newest first, at most `limit`.
    /// Tie order among equal scores is backend-defined.
    pub async fn range_by_score_desc(&self, max_ms: i64, limit: usize) -> Result<Vec<Uuid>> {
        let members = self
            .backend
            .zrevrangebyscore(FEED_INDEX_KEY, max_ms as f64, limit)
            .await?;
        Ok(members
            .iter()
            .filter_map(|m| Uuid::parse_str(m).ok())
            .collect())
    }

    /// Post ids by ascending rank (oldest first), `start..=stop`.
    pub async fn range_by_rank(&self, start: isize, stop: isize) -> Result<Vec<Uuid>> {
        let members = self.backend.zrange(FEED_INDEX_KEY, start, stop).await?;
        Ok(members
            .iter()
            .filter_map(|m| Uuid::parse_str(m).ok())
            .collect())
    }

    /// Remove posts from the index.
    pub async fn remove(&self, post_ids: &[Uuid]) -> Result<()> {
        let members: Vec<String> = post_ids.iter().map(|id| id.to_string()).collect();
        self.backend.zrem(FEED_INDEX_KEY, &members).await
    }

    /// Current number of indexed posts.
    pub async fn len(&self) -> Result<u64> {
        self.backend.zcard(FEED_INDEX_KEY).await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
