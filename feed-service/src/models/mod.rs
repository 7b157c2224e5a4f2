/// Data models for the feed service
///
/// `Post` and `Comment` are owned by the durable store; their cached copies
/// are disposable projections. The DTO types are what `get_page` assembles
/// for callers.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A post as stored durably and as cached under `post:v1:{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub caption: String,
    pub image_url: String,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub creator_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub caption: String,
    pub image_url: String,
    pub creator_id: Uuid,
}

/// Request payload for creating a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub creator_id: Uuid,
    pub post_id: Uuid,
}

/// Post author reference in feed responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorDto {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A comment as returned inside a feed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: Uuid,
    pub content: String,
    pub creator: CreatorDto,
    pub created_at: DateTime<Utc>,
}

/// A post as returned inside a feed page, with its most recent comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDto {
    pub id: Uuid,
    pub caption: String,
    pub image_url: String,
    pub creator: CreatorDto,
    pub recent_comments: Vec<CommentDto>,
    pub created_at: DateTime<Utc>,
}

/// One page of the feed.
///
/// `next_cursor` always carries a value; at end-of-feed it repeats the
/// request cursor and `posts` is empty.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub posts: Vec<PostDto>,
    pub next_cursor: String,
}

/// A post joined with the recent comments used by the database fallback path.
#[derive(Debug, Clone)]
pub struct PostWithComments {
    pub post: Post,
    pub recent_comments: Vec<Comment>,
}

impl CommentDto {
    pub fn from_comment(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            creator: CreatorDto {
                id: comment.creator_id,
                name: None,
            },
            created_at: comment.created_at,
        }
    }
}

impl PostDto {
    pub fn from_post(post: Post, recent_comments: Vec<Comment>) -> Self {
        Self {
            id: post.id,
            caption: post.caption,
            image_url: post.image_url,
            creator: CreatorDto {
                id: post.creator_id,
                name: None,
            },
            recent_comments: recent_comments
                .into_iter()
                .map(CommentDto::from_comment)
                .collect(),
            created_at: post.created_at,
        }
    }
}
