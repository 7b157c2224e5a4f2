/// Comment write path
///
/// Success here means "queued", not "persisted": the comment goes onto the
/// asynchronous channel and into the poster's comment ring in one retry
/// unit, and a consumer persists it durably later. No referential check is
/// made against the post — the durable store enforces integrity when the
/// consumer inserts.
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::cache::FeedCache;
use crate::config::RetryConfig;
use crate::error::Result;
use crate::models::{Comment, CreateCommentRequest};
use crate::queue::{QueueMessage, QueueSender};
use crate::retry::with_retry;

pub struct CommentService {
    queue: Arc<dyn QueueSender>,
    cache: FeedCache,
    retry: RetryConfig,
}

impl CommentService {
    pub fn new(queue: Arc<dyn QueueSender>, cache: FeedCache, retry: RetryConfig) -> Self {
        Self {
            queue,
            cache,
            retry,
        }
    }

    /// Queue a comment for persistence and push it into the post's comment
    /// ring. A retry after a partial failure may enqueue the message twice;
    /// the channel is at-least-once anyway and the consumer inserts
    /// idempotently.
    pub async fn create_comment(&self, request: CreateCommentRequest) -> Result<Comment> {
        let comment = Comment {
            id: Uuid::new_v4(),
            content: request.content,
            creator_id: request.creator_id,
            post_id: request.post_id,
            created_at: Utc::now(),
        };

        let payload = QueueMessage::comment(comment.clone()).encode()?;

        let queue = &self.queue;
        let cache = &self.cache;
        let payload_ref = &payload;
        let comment_ref = &comment;
        with_retry(&self.retry, "create_comment", move || async move {
            queue.send(payload_ref.clone()).await?;
            cache.push_comment(comment_ref).await
        })
        .await?;

        info!(
            comment_id = %comment.id,
            post_id = %comment.post_id,
            "comment queued"
        );
        Ok(comment)
    }
}
