use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::{
    AppState,
    auth::{Claims, hash_password, verify_password},
    error::{AppError, Result},
    models::{AuthResponse, RegisterRequest, SessionUser, User},
    services::user_service::{self, NewUser},
};

const PHONE_OTP_TTL_SECONDS: usize = 600;

fn phone_otp_key(user_id: Uuid) -> String {
    format!("phone-otp:{}", user_id)
}

fn generate_verification_token() -> String {
    let bytes: [u8; 32] = rand::random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn generate_otp() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(100000..1000000))
}

/// Creates an unverified account and logs the verification link.
pub async fn register(state: &AppState, payload: RegisterRequest) -> Result<User> {
    if user_service::get_user_by_email(&state.db, &payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let username = payload
        .username
        .clone()
        .unwrap_or_else(|| format!("user_{}", Utc::now().timestamp_millis()));

    if user_service::get_user_by_username(&state.db, &username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let token = generate_verification_token();

    let user = user_service::create_user(
        &state.db,
        NewUser {
            email: &payload.email,
            password_hash: &password_hash,
            username: &username,
            first_name: &payload.first_name,
            last_name: &payload.last_name,
            date_of_birth: payload.date_of_birth,
            gender: payload.gender,
            phone_number: payload.phone_number.as_deref(),
            email_verification_token: &token,
        },
    )
    .await?;

    send_verification_email(state, &user, &token);
    tracing::info!("User {} registered as {}", user.id, user.username);

    Ok(user)
}

fn send_verification_email(state: &AppState, user: &User, token: &str) {
    let url = format!("{}/verify-email?token={}", state.config.frontend_url, token);
    if state.config.is_development() {
        tracing::info!("Verification URL for {}: {}", user.email, url);
    } else {
        tracing::debug!("Verification email queued for user {}", user.id);
    }
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<AuthResponse> {
    let user = user_service::get_user_by_email(&state.db, email)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::Authentication("Invalid credentials".to_string()));
    }

    if !user.email_verified {
        return Err(AppError::Authentication(
            "Please verify your email before logging in".to_string(),
        ));
    }

    if !user.is_active || user.is_banned {
        return Err(AppError::Authorization("Account is disabled".to_string()));
    }

    let (access_token, claims) = Claims::new(
        user.id,
        user.email.clone(),
        user.role,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    let ttl = (claims.exp - claims.iat).max(0) as usize;
    state
        .redis
        .store_session(&claims.jti, &claims.sub, ttl)
        .await?;

    user_service::update_last_login(&state.db, user.id).await?;
    tracing::info!("User {} logged in", user.id);

    Ok(AuthResponse {
        access_token,
        user: SessionUser::from(&user),
    })
}

pub async fn logout(state: &AppState, jti: &str) -> Result<()> {
    state.redis.delete_session(jti).await
}

pub async fn verify_email(state: &AppState, token: &str) -> Result<()> {
    let user = user_service::get_user_by_verification_token(&state.db, token)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid verification token".to_string()))?;

    user_service::mark_email_verified(&state.db, user.id).await?;
    tracing::info!("Email verified for user {}", user.id);

    Ok(())
}

pub async fn request_phone_otp(state: &AppState, user_id: Uuid, phone_number: &str) -> Result<()> {
    let otp = generate_otp();

    user_service::set_pending_phone(&state.db, user_id, phone_number).await?;
    state
        .redis
        .cache_set(&phone_otp_key(user_id), &otp, PHONE_OTP_TTL_SECONDS)
        .await?;

    if state.config.is_development() {
        tracing::info!("OTP for {}: {}", phone_number, otp);
    }

    Ok(())
}

pub async fn verify_phone_otp(state: &AppState, user_id: Uuid, otp: &str) -> Result<()> {
    let key = phone_otp_key(user_id);

    match state.redis.cache_get(&key).await? {
        Some(stored) if stored == otp => {}
        _ => return Err(AppError::BadRequest("Invalid or expired OTP".to_string())),
    }

    user_service::mark_phone_verified(&state.db, user_id).await?;
    state.redis.cache_delete(&key).await?;
    tracing::info!("Phone verified for user {}", user_id);

    Ok(())
}

pub async fn current_user(state: &AppState, user_id: Uuid) -> Result<User> {
    user_service::get_user_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Authentication("User not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_token_is_64_hex_chars() {
        let token = generate_verification_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_verification_token());
    }

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
