use crate::models::Comment;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a comment. Idempotent on id: the channel delivers at least once,
/// so a redelivered message must not produce a second row.
pub async fn insert_comment(pool: &PgPool, comment: &Comment) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO comments (id, content, creator_id, post_id, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(comment.id)
    .bind(&comment.content)
    .bind(comment.creator_id)
    .bind(comment.post_id)
    .bind(comment.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// The `limit` most recent comments of a post, newest first.
pub async fn recent_comments(
    pool: &PgPool,
    post_id: Uuid,
    limit: i64,
) -> Result<Vec<Comment>, sqlx::Error> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, content, creator_id, post_id, created_at
        FROM comments
        WHERE post_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(post_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(comments)
}
