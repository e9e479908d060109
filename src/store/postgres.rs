use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    database::is_unique_violation,
    error::{AppError, Result},
    models::{PostVote, VoteType},
    store::VoteStore,
};

fn vote_from_row(row: &PgRow) -> Result<PostVote> {
    let vote_type: String = row.try_get("vote_type")?;
    let vote_type = vote_type
        .parse::<VoteType>()
        .map_err(|e| AppError::Internal(format!("Invalid vote_type: {}", e)))?;

    Ok(PostVote {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        post_id: row.try_get("post_id")?,
        vote_type,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl VoteStore for PgPool {
    async fn post_exists(&self, post_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(self)
            .await?;

        Ok(exists)
    }

    async fn find_vote(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<PostVote>> {
        let row = sqlx::query("SELECT * FROM votes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .fetch_optional(self)
            .await?;

        row.as_ref().map(vote_from_row).transpose()
    }

    async fn create_vote(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        vote_type: VoteType,
    ) -> Result<PostVote> {
        let row = sqlx::query(
            r#"
            INSERT INTO votes (id, user_id, post_id, vote_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(post_id)
        .bind(vote_type.as_str())
        .fetch_one(self)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Vote already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        vote_from_row(&row)
    }

    async fn update_vote(&self, vote_id: Uuid, vote_type: VoteType) -> Result<PostVote> {
        let row = sqlx::query(
            "UPDATE votes SET vote_type = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(vote_id)
        .bind(vote_type.as_str())
        .fetch_optional(self)
        .await?
        .ok_or_else(|| AppError::NotFound("Vote not found".to_string()))?;

        vote_from_row(&row)
    }

    async fn delete_vote(&self, vote_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM votes WHERE id = $1")
            .bind(vote_id)
            .execute(self)
            .await?;

        Ok(())
    }
}
