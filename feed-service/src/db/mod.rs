/// Durable storage layer
///
/// The feed cache treats the relational store as a collaborator: posts and
/// comments are owned here, the cache only holds disposable projections.
/// `DurableStore` is the seam the services and the comment consumer write
/// through; `PgStore` is the Postgres implementation, tests substitute an
/// in-memory mock.
pub mod comment_repo;
pub mod post_repo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Comment, Post, PostWithComments};

/// Number of comments attached to each post on the database fallback path,
/// matching what the cache-hit path hydrates from the comment ring.
const FALLBACK_RECENT_COMMENTS: i64 = 2;

#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Persist a post. Must be idempotent on `post.id`.
    async fn insert_post(&self, post: &Post) -> Result<()>;

    /// Persist a comment. Must be idempotent on `comment.id`.
    async fn insert_comment(&self, comment: &Comment) -> Result<()>;

    /// Posts created strictly before `before`, newest first, each with its
    /// most recent comments. Serves the cache-miss fallback.
    async fn posts_before(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PostWithComments>>;

    /// Delete a post and its comments. Returns whether a row existed.
    async fn delete_post(&self, post_id: Uuid) -> Result<bool>;
}

/// Postgres-backed durable store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DurableStore for PgStore {
    async fn insert_post(&self, post: &Post) -> Result<()> {
        post_repo::insert_post(&self.pool, post).await?;
        Ok(())
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        comment_repo::insert_comment(&self.pool, comment).await?;
        Ok(())
    }

    async fn posts_before(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PostWithComments>> {
        let posts = post_repo::posts_before(&self.pool, before, limit).await?;

        let hydrated = posts.into_iter().map(|post| async move {
            let recent_comments =
                comment_repo::recent_comments(&self.pool, post.id, FALLBACK_RECENT_COMMENTS)
                    .await?;
            Ok::<_, crate::error::AppError>(PostWithComments {
                post,
                recent_comments,
            })
        });

        try_join_all(hydrated).await
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        Ok(post_repo::delete_post(&self.pool, post_id).await?)
    }
}
