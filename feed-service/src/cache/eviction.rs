/// Eviction controller
///
/// Enforces the feed index capacity bound after every insertion. This is a
/// fixed-capacity recency policy: the entries with the oldest creation
/// times go first, regardless of how often they are read.
use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use super::content::{CommentRing, ContentStore};
use super::feed_index::FeedIndex;
use crate::error::Result;

#[derive(Clone)]
pub struct EvictionController {
    index: FeedIndex,
    posts: ContentStore,
    comments: CommentRing,
    max_size: u64,
}

impl EvictionController {
    pub fn new(
        index: FeedIndex,
        posts: ContentStore,
        comments: CommentRing,
        max_size: u64,
    ) -> Self {
        Self {
            index,
            posts,
            comments,
            max_size,
        }
    }

    /// Evict the oldest entries until the index is back within capacity.
    ///
    /// Cascading deletes of post bodies and comment rings run concurrently;
    /// they are independent and order-free. A failed delete propagates so
    /// the caller's retry unit sees it; the index entries are already gone,
    /// so until then the leftovers are unreachable rather than stale.
    pub async fn enforce_capacity(&self) -> Result<()> {
        let size = self.index.len().await?;
        if size <= self.max_size {
            return Ok(());
        }

        let excess = (size - self.max_size) as isize;
        let oldest = self.index.range_by_rank(0, excess - 1).await?;
        if oldest.is_empty() {
            return Ok(());
        }

        self.index.remove(&oldest).await?;

        let deletions = oldest.iter().map(|post_id| self.delete_entries(*post_id));
        let mut first_failure = None;
        for result in join_all(deletions).await {
            if let Err(e) = result {
                warn!("eviction cascade delete failed: {}", e);
                first_failure.get_or_insert(e);
            }
        }
        if let Some(e) = first_failure {
            return Err(e);
        }

        debug!(evicted = oldest.len(), "feed index trimmed to capacity");
        Ok(())
    }

    async fn delete_entries(&self, post_id: Uuid) -> Result<()> {
        self.posts.remove_post(post_id).await?;
        self.comments.remove(post_id).await
    }
}
