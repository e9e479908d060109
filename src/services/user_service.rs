use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Gender, UpdateProfileRequest, User},
};

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone_number: Option<&'a str>,
    pub email_verification_token: &'a str,
}

pub async fn get_user_by_id(db: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?;

    Ok(user)
}

pub async fn get_user_by_email(db: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(db)
        .await?;

    Ok(user)
}

pub async fn get_user_by_username(db: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(db)
        .await?;

    Ok(user)
}

pub async fn get_user_by_verification_token(db: &PgPool, token: &str) -> Result<Option<User>> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email_verification_token = $1")
            .bind(token)
            .fetch_optional(db)
            .await?;

    Ok(user)
}

pub async fn create_user(db: &PgPool, new_user: NewUser<'_>) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (
            id, email, password_hash, username, first_name, last_name, date_of_birth,
            gender, phone_number, email_verification_token, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.username)
    .bind(new_user.first_name)
    .bind(new_user.last_name)
    .bind(new_user.date_of_birth)
    .bind(new_user.gender)
    .bind(new_user.phone_number)
    .bind(new_user.email_verification_token)
    .fetch_one(db)
    .await?;

    Ok(user)
}

pub async fn mark_email_verified(db: &PgPool, user_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET email_verified = TRUE, email_verification_token = NULL, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(())
}

/// Records the number awaiting OTP confirmation; it stays unverified until
/// [`mark_phone_verified`].
pub async fn set_pending_phone(db: &PgPool, user_id: Uuid, phone_number: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET phone_number = $2, phone_verified = FALSE, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(phone_number)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn mark_phone_verified(db: &PgPool, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE users SET phone_verified = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(db)
        .await?;

    Ok(())
}

pub async fn update_last_login(db: &PgPool, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(db)
        .await?;

    Ok(())
}

pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    payload: &UpdateProfileRequest,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            bio = COALESCE($4, bio),
            profile_image_url = COALESCE($5, profile_image_url),
            twitter_handle = COALESCE($6, twitter_handle),
            ig_handle = COALESCE($7, ig_handle),
            tiktok_handle = COALESCE($8, tiktok_handle),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.bio)
    .bind(&payload.profile_image_url)
    .bind(&payload.twitter_handle)
    .bind(&payload.ig_handle)
    .bind(&payload.tiktok_handle)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!("Profile updated for user {}", user_id);

    Ok(user)
}
