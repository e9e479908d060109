use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{
        AuthResponse, LoginRequest, RegisterRequest, RequestPhoneOtpRequest, User,
        VerifyEmailQuery, VerifyPhoneRequest,
    },
    services::auth_service,
};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    // 5 registrations per hour per email
    let rate_limit_key = format!("register_attempt:{}", payload.email);
    if !state
        .redis
        .check_rate_limit(&rate_limit_key, 5, 3600)
        .await?
    {
        return Err(AppError::RateLimit);
    }

    let user = auth_service::register(&state, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful. Please check your email for verification.",
            "userId": user.id
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;

    // 10 attempts per minute per email
    let rate_limit_key = format!("login_attempt:{}", payload.email);
    if !state
        .redis
        .check_rate_limit(&rate_limit_key, 10, 60)
        .await?
    {
        return Err(AppError::RateLimit);
    }

    let response = auth_service::login(&state, &payload.email, &payload.password).await?;

    Ok(Json(response))
}

pub async fn verify_email(
    State(state): State<AppState>,
    Query(params): Query<VerifyEmailQuery>,
) -> Result<Json<Value>> {
    auth_service::verify_email(&state, &params.token).await?;

    Ok(Json(json!({
        "message": "Email verified successfully"
    })))
}

pub async fn request_phone_otp(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<RequestPhoneOtpRequest>,
) -> Result<Json<Value>> {
    payload.validate()?;

    let rate_limit_key = format!("phone_otp:{}", auth_user.user_id);
    if !state
        .redis
        .check_rate_limit(&rate_limit_key, 5, 3600)
        .await?
    {
        return Err(AppError::RateLimit);
    }

    auth_service::request_phone_otp(&state, auth_user.user_id, &payload.phone_number).await?;

    Ok(Json(json!({
        "message": "OTP sent successfully"
    })))
}

pub async fn verify_phone(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<VerifyPhoneRequest>,
) -> Result<Json<Value>> {
    payload.validate()?;

    auth_service::verify_phone_otp(&state, auth_user.user_id, &payload.otp).await?;

    Ok(Json(json!({
        "message": "Phone verified successfully"
    })))
}

pub async fn me(State(state): State<AppState>, auth_user: AuthUser) -> Result<Json<User>> {
    let user = auth_service::current_user(&state, auth_user.user_id).await?;
    Ok(Json(user))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<(StatusCode, Json<Value>)> {
    auth_service::logout(&state, &auth_user.jti).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Logout successful"
        })),
    ))
}
