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
    models::{
        CreatePersonRequest, PersonDetail, PersonWithPostCount, SearchPersonsQuery, SearchQuery,
        UpdatePersonRequest,
    },
    services::{person_service, search_service},
    utils::pagination::{PageParams, PageRequest},
};

pub async fn create_person(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreatePersonRequest>,
) -> Result<(StatusCode, Json<PersonWithPostCount>)> {
    payload.validate()?;

    let person = person_service::create_person(&state.db, auth_user.user_id, payload).await?;

    Ok((StatusCode::CREATED, Json(person)))
}

pub async fn search_persons(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let query = SearchPersonsQuery {
        q: params.q,
        ..Default::default()
    };
    let page = PageRequest::from_page(params.page, params.limit);

    let persons = search_service::search_persons(&state.db, &query, page).await?;

    Ok(Json(persons.to_json("persons")))
}

pub async fn get_person(
    State(state): State<AppState>,
    Path(person_id): Path<Uuid>,
) -> Result<Json<PersonDetail>> {
    let person = person_service::get_person(&state.db, person_id).await?;

    Ok(Json(person))
}

pub async fn get_person_posts(
    State(state): State<AppState>,
    Path(person_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>> {
    let (person, posts) =
        person_service::get_person_posts(&state.db, person_id, params.request()).await?;

    let mut body = posts.to_json("posts");
    body["person"] = json!(person);

    Ok(Json(body))
}

pub async fn update_person(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(person_id): Path<Uuid>,
    Json(payload): Json<UpdatePersonRequest>,
) -> Result<Json<PersonWithPostCount>> {
    payload.validate()?;

    let person = person_service::update_person(
        &state.db,
        person_id,
        auth_user.user_id,
        auth_user.role,
        &payload,
    )
    .await?;

    Ok(Json(person))
}

pub async fn delete_person(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(person_id): Path<Uuid>,
) -> Result<Json<Value>> {
    person_service::delete_person(&state.db, person_id, auth_user.user_id, auth_user.role).await?;

    Ok(Json(json!({
        "message": "Person deleted successfully"
    })))
}
