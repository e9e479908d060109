use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{AuthorSummary, Comment, CommentView},
    utils::{
        pagination::{PageRequest, Paginated},
        permissions::ensure,
    },
};

fn comment_view_from_row(row: &PgRow) -> Result<CommentView> {
    let author_id: Uuid = row.try_get("author_id")?;

    Ok(CommentView {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        author: AuthorSummary {
            id: author_id,
            username: row.try_get("username")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            profile_image_url: row.try_get("profile_image_url")?,
        },
    })
}

async fn ensure_post_exists(db: &PgPool, post_id: Uuid) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
        .bind(post_id)
        .fetch_one(db)
        .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound("Post not found".to_string()))
    }
}

/// Comments on a post, oldest first.
pub async fn list_comments(
    db: &PgPool,
    post_id: Uuid,
    page: PageRequest,
) -> Result<Paginated<CommentView>> {
    ensure_post_exists(db, post_id).await?;

    let rows = sqlx::query(
        r#"
        SELECT c.id, c.post_id, c.author_id, c.content, c.created_at, c.updated_at,
               u.username, u.first_name, u.last_name, u.profile_image_url
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = $1
        ORDER BY c.created_at ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(post_id)
    .bind(page.take)
    .bind(page.skip)
    .fetch_all(db)
    .await?;

    let comments = rows
        .iter()
        .map(comment_view_from_row)
        .collect::<Result<Vec<_>>>()?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(db)
        .await?;

    Ok(Paginated::new(comments, total, page))
}

pub async fn create_comment(
    db: &PgPool,
    post_id: Uuid,
    author_id: Uuid,
    content: &str,
) -> Result<CommentView> {
    ensure_post_exists(db, post_id).await?;

    let row = sqlx::query(
        r#"
        WITH inserted AS (
            INSERT INTO comments (id, post_id, author_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING *
        )
        SELECT i.id, i.post_id, i.author_id, i.content, i.created_at, i.updated_at,
               u.username, u.first_name, u.last_name, u.profile_image_url
        FROM inserted i
        JOIN users u ON u.id = i.author_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(post_id)
    .bind(author_id)
    .bind(content)
    .fetch_one(db)
    .await?;

    let comment = comment_view_from_row(&row)?;
    tracing::info!("Comment {} added to post {}", comment.id, post_id);

    Ok(comment)
}

pub async fn delete_comment(db: &PgPool, comment_id: Uuid, user_id: Uuid) -> Result<()> {
    let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    ensure(
        comment.author_id == user_id,
        "You can only delete your own comments",
    )?;

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(db)
        .await?;

    tracing::info!("Comment {} deleted by {}", comment_id, user_id);

    Ok(())
}
