use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::Result,
    models::{CommentView, CreateCommentRequest},
    services::comment_service,
    utils::pagination::PageParams,
};

pub async fn get_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>> {
    let comments = comment_service::list_comments(&state.db, post_id, params.request()).await?;

    Ok(Json(comments.to_json("comments")))
}

pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentView>)> {
    payload.validate()?;

    let comment =
        comment_service::create_comment(&state.db, post_id, auth_user.user_id, &payload.content)
            .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<Value>> {
    comment_service::delete_comment(&state.db, comment_id, auth_user.user_id).await?;

    Ok(Json(json!({
        "message": "Comment deleted successfully"
    })))
}
