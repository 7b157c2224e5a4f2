/// Feed caching layer
///
/// Serves the read path of the feed: a bounded recency index of post ids, a
/// keyed store of serialized post bodies, and a bounded ring of each post's
/// latest comments. Capacity is enforced by the eviction controller after
/// every index insertion.
///
/// Key layout (all values JSON, contract versioned in the key):
/// - `feed:v1:posts`            sorted set, post id scored by created-at millis
/// - `post:v1:{id}`             post body
/// - `post:v1:{id}:comments`    latest comments, newest first
pub mod backend;
pub mod content;
pub mod eviction;
pub mod feed_index;
pub mod memory;

pub use backend::{CacheBackend, RedisBackend};
pub use content::{CommentRing, ContentStore};
pub use eviction::EvictionController;
pub use feed_index::FeedIndex;
pub use memory::MemoryBackend;

use std::sync::Arc;
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::{Comment, Post};

/// Facade over the cache components, wired from one injected backend and
/// one configuration block.
#[derive(Clone)]
pub struct FeedCache {
    index: FeedIndex,
    posts: ContentStore,
    comments: CommentRing,
    eviction: EvictionController,
}

impl FeedCache {
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        let index = FeedIndex::new(backend.clone());
        let posts = ContentStore::new(backend.clone(), config.post_ttl);
        let comments = CommentRing::new(backend, config.comment_ring_size);
        let eviction = EvictionController::new(
            index.clone(),
            posts.clone(),
            comments.clone(),
            config.max_feed_size,
        );
        Self {
            index,
            posts,
            comments,
            eviction,
        }
    }

    /// Connect to Redis and build the cache over it.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let backend = RedisBackend::connect(&config.url).await?;
        Ok(Self::new(Arc::new(backend), config))
    }

    /// Index a post and cache its body, then enforce the capacity bound.
    pub async fn add_post(&self, post: &Post) -> Result<()> {
        self.index
            .add(post.id, post.created_at.timestamp_millis())
            .await?;
        self.posts.set_post(post).await?;
        self.eviction.enforce_capacity().await
    }

    /// Page of post ids with score <= `max_ms`, newest first.
    pub async fn page_of_ids(&self, max_ms: i64, limit: usize) -> Result<Vec<Uuid>> {
        self.index.range_by_score_desc(max_ms, limit).await
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        self.posts.get_post(post_id).await
    }

    pub async fn push_comment(&self, comment: &Comment) -> Result<()> {
        self.comments.push(comment).await
    }

    pub async fn recent_comments(&self, post_id: Uuid, n: usize) -> Result<Vec<Comment>> {
        self.comments.recent(post_id, n).await
    }

    /// Drop a post from the index, its body, and its comment ring.
    pub async fn remove_post(&self, post_id: Uuid) -> Result<()> {
        self.index.remove(&[post_id]).await?;
        self.posts.remove_post(post_id).await?;
        self.comments.remove(post_id).await
    }

    /// Current number of indexed posts.
    pub async fn len(&self) -> Result<u64> {
        self.index.len().await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        self.index.is_empty().await
    }
}
