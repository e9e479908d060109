use axum::{
    extract::{Query, State},
    response::Json,
};
use serde_json::Value;

use crate::{
    AppState,
    error::Result,
    models::{PostView, SearchAllResponse, SearchPersonsQuery, SearchQuery, TrendingQuery},
    services::search_service,
    utils::{pagination::PageRequest, votes::WithVoteCounts},
};

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchAllResponse>> {
    let query = params.q.unwrap_or_default();
    let results = search_service::search_all(&state.db, &query).await?;

    Ok(Json(results))
}

pub async fn search_persons(
    State(state): State<AppState>,
    Query(params): Query<SearchPersonsQuery>,
) -> Result<Json<Value>> {
    let page = PageRequest::from_page(params.page, params.limit);
    let persons = search_service::search_persons(&state.db, &params, page).await?;

    Ok(Json(persons.to_json("persons")))
}

pub async fn search_posts(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let page = PageRequest::from_page(params.page, params.limit);
    let query = params.q.unwrap_or_default();
    let posts = search_service::search_posts(&state.db, &query, page).await?;

    Ok(Json(posts.to_json("posts")))
}

pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let page = PageRequest::from_page(params.page, params.limit);
    let query = params.q.unwrap_or_default();
    let users = search_service::search_users(&state.db, &query, page).await?;

    Ok(Json(users.to_json("users")))
}

pub async fn trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingQuery>,
) -> Result<Json<Vec<WithVoteCounts<PostView>>>> {
    let limit = params
        .limit
        .unwrap_or(search_service::DEFAULT_TRENDING_LIMIT)
        .min(100);
    let posts = search_service::trending(&state.db, limit).await?;

    Ok(Json(posts))
}
