/// Pagination orchestrator
///
/// Composes cursor decoding, the feed index, parallel hydration from the
/// content store and comment ring, and the database fallback into one
/// page-fetch operation. Cache failures on this path never fail a request:
/// they degrade to a miss and the durable store serves the page.
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::FeedCache;
use crate::config::MediaConfig;
use crate::cursor;
use crate::db::DurableStore;
use crate::error::Result;
use crate::models::{FeedPage, PostDto};

/// Comments hydrated per post in a feed page.
const RECENT_COMMENTS_PER_POST: usize = 2;

pub struct FeedService {
    cache: FeedCache,
    store: Arc<dyn DurableStore>,
    media: MediaConfig,
}

impl FeedService {
    pub fn new(cache: FeedCache, store: Arc<dyn DurableStore>, media: MediaConfig) -> Self {
        Self {
            cache,
            store,
            media,
        }
    }

    /// Fetch one reverse-chronological page of the feed.
    ///
    /// An absent cursor starts from now; the returned `next_cursor`
    /// continues where this page ended. An empty page with the request
    /// cursor echoed back signals end-of-feed.
    pub async fn get_page(&self, limit: usize, cursor: Option<&str>) -> Result<FeedPage> {
        let boundary = cursor::decode(cursor)?;

        // An explicit cursor is the previous page's last creation time;
        // shave one millisecond off the inclusive bound so that item is not
        // served twice. The default boundary (now) stays inclusive so a
        // just-created post is visible immediately.
        let explicit = matches!(cursor, Some(c) if !c.is_empty());
        let max_ms = if explicit {
            boundary.timestamp_millis() - 1
        } else {
            boundary.timestamp_millis()
        };

        let ids = match self.cache.page_of_ids(max_ms, limit).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("feed index read failed, falling back to database: {}", e);
                Vec::new()
            }
        };

        let mut posts: Vec<PostDto> = if ids.is_empty() {
            debug!("feed cache miss, serving page from database");
            self.store
                .posts_before(boundary, limit as i64)
                .await?
                .into_iter()
                .map(|row| PostDto::from_post(row.post, row.recent_comments))
                .collect()
        } else {
            join_all(ids.iter().map(|id| self.hydrate(*id)))
                .await
                .into_iter()
                .flatten()
                .collect()
        };

        for post in &mut posts {
            post.image_url = post
                .image_url
                .replace(&self.media.raw_container, &self.media.processed_container);
        }

        let next_cursor = match posts.last() {
            Some(last) => cursor::encode(last.created_at),
            None => cursor::encode(boundary),
        };

        Ok(FeedPage { posts, next_cursor })
    }

    /// Assemble one item from the content store and comment ring.
    ///
    /// A missing or unreadable body makes the item unavailable and it is
    /// skipped; an unreadable comment ring degrades to no comments.
    async fn hydrate(&self, post_id: Uuid) -> Option<PostDto> {
        let (post, comments) = tokio::join!(
            self.cache.get_post(post_id),
            self.cache.recent_comments(post_id, RECENT_COMMENTS_PER_POST),
        );

        let post = match post {
            Ok(Some(post)) => post,
            Ok(None) => {
                debug!(%post_id, "indexed post has no cached body, skipping");
                return None;
            }
            Err(e) => {
                warn!(%post_id, "post hydration failed, skipping: {}", e);
                return None;
            }
        };

        let comments = match comments {
            Ok(comments) => comments,
            Err(e) => {
                warn!(%post_id, "comment hydration failed, serving post without comments: {}", e);
                Vec::new()
            }
        };

        Some(PostDto::from_post(post, comments))
    }
}
