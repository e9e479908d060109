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
    error::{AppError, Result},
    models::{
        CreatePostRequest, ListPostsQuery, PostView, UpdatePostRequest, UserVote, VoteRequest,
        VoteResult,
    },
    services::{post_service, vote_service},
    utils::votes::WithVoteCounts,
};

pub async fn create_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<WithVoteCounts<PostView>>)> {
    payload.validate()?;

    // 10 posts per hour
    let rate_limit_key = format!("create_post:{}", auth_user.user_id);
    if !state
        .redis
        .check_rate_limit(&rate_limit_key, 10, 3600)
        .await?
    {
        return Err(AppError::RateLimit);
    }

    let post = post_service::create_post(&state.db, auth_user.user_id, payload).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_posts(
    State(state): State<AppState>,
    Query(params): Query<ListPostsQuery>,
) -> Result<Json<Value>> {
    let posts = post_service::list_posts(&state.db, &params).await?;

    Ok(Json(posts.to_json("posts")))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<WithVoteCounts<PostView>>> {
    let post = post_service::get_post(&state.db, post_id).await?;

    Ok(Json(post))
}

pub async fn update_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<WithVoteCounts<PostView>>> {
    payload.validate()?;

    let post = post_service::update_post(&state.db, post_id, auth_user.user_id, payload).await?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Value>> {
    post_service::delete_post(&state.db, post_id, auth_user.user_id).await?;

    Ok(Json(json!({
        "message": "Post deleted successfully"
    })))
}

pub async fn vote_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResult>> {
    // 100 votes per hour
    let rate_limit_key = format!("vote:{}", auth_user.user_id);
    if !state
        .redis
        .check_rate_limit(&rate_limit_key, 100, 3600)
        .await?
    {
        return Err(AppError::RateLimit);
    }

    let result =
        vote_service::toggle_vote(&state.db, post_id, auth_user.user_id, payload.vote_type)
            .await?;

    Ok(Json(result))
}

pub async fn get_user_vote(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<UserVote>> {
    let vote = vote_service::get_user_vote(&state.db, post_id, auth_user.user_id).await?;

    Ok(Json(vote))
}
