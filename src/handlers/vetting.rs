use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::Result,
    models::{
        CreateVettingRequest, ListVettingQuery, SearchVettingQuery, UpdateVettingStatusRequest,
        VettingRequest, VettingRequestView,
    },
    services::vetting_service,
    utils::pagination::PageRequest,
};

pub async fn create_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateVettingRequest>,
) -> Result<(StatusCode, Json<VettingRequestView>)> {
    payload.validate()?;

    let request = vetting_service::create_request(&state.db, auth_user.user_id, payload).await?;

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(params): Query<ListVettingQuery>,
) -> Result<Json<Value>> {
    let requests = vetting_service::list_requests(&state.db, &params).await?;

    Ok(Json(requests.to_json("requests")))
}

pub async fn search_requests(
    State(state): State<AppState>,
    Query(params): Query<SearchVettingQuery>,
) -> Result<Json<Value>> {
    let page = PageRequest::from_page(params.page, params.limit);
    let requests = vetting_service::search_by_name(&state.db, &params.name, page).await?;

    Ok(Json(requests.to_json("requests")))
}

pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<VettingRequestView>> {
    let request = vetting_service::get_request(&state.db, request_id).await?;

    Ok(Json(request))
}

pub async fn update_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<UpdateVettingStatusRequest>,
) -> Result<Json<VettingRequest>> {
    let request =
        vetting_service::update_status(&state.db, request_id, payload.status, auth_user.user_id)
            .await?;

    Ok(Json(request))
}
