use crate::models::Post;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a post. Idempotent on id so a retried write cannot duplicate rows.
pub async fn insert_post(pool: &PgPool, post: &Post) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO posts (id, caption, image_url, creator_id, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(post.id)
    .bind(&post.caption)
    .bind(&post.image_url)
    .bind(post.creator_id)
    .bind(post.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Posts created strictly before `before`, newest first.
pub async fn posts_before(
    pool: &PgPool,
    before: chrono::DateTime<chrono::Utc>,
    limit: i64,
) -> Result<Vec<Post>, sqlx::Error> {
    let posts = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, caption, image_url, creator_id, created_at
        FROM posts
        WHERE created_at < $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(before)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

/// Delete a post; comments cascade via the foreign key.
pub async fn delete_post(pool: &PgPool, post_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
