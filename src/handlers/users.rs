use axum::{
    extract::{Path, State},
    response::Json,
};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{PublicUser, UpdateProfileRequest, User},
    services::user_service,
};

pub async fn get_profile(State(state): State<AppState>, auth_user: AuthUser) -> Result<Json<User>> {
    let user = user_service::get_user_by_id(&state.db, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    payload.validate()?;

    let user = user_service::update_profile(&state.db, auth_user.user_id, &payload).await?;

    Ok(Json(user))
}

pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicUser>> {
    let user = user_service::get_user_by_username(&state.db, &username)
        .await?
        .filter(|user| user.is_active && !user.is_banned)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(PublicUser::from(user)))
}
