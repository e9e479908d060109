use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        AuthorSummary, CreateVettingRequest, ListVettingQuery, VettingPostRef, VettingRequest,
        VettingRequestView, VettingStatus,
    },
    utils::{
        filters::{FilterBuilder, MatchMode},
        pagination::{PageRequest, Paginated},
    },
};

const VETTING_VIEW_SELECT: &str = r#"
    SELECT
        vr.*,
        a.username AS author_username, a.first_name AS author_first_name,
        a.last_name AS author_last_name, a.profile_image_url AS author_profile_image_url,
        t.username AS target_username, t.first_name AS target_first_name,
        t.last_name AS target_last_name, t.profile_image_url AS target_profile_image_url,
        po.title AS post_title, po.post_type AS post_post_type
    FROM vetting_requests vr
    JOIN users a ON a.id = vr.author_id
    LEFT JOIN users t ON t.id = vr.target_user_id
    LEFT JOIN posts po ON po.id = vr.post_id
"#;

fn vetting_view_from_row(row: &PgRow) -> Result<VettingRequestView> {
    let request = VettingRequest::from_row(row)?;

    let author = AuthorSummary {
        id: request.author_id,
        username: row.try_get("author_username")?,
        first_name: row.try_get("author_first_name")?,
        last_name: row.try_get("author_last_name")?,
        profile_image_url: row.try_get("author_profile_image_url")?,
    };

    let target_username: Option<String> = row.try_get("target_username")?;
    let target_user = match (request.target_user_id, target_username) {
        (Some(id), Some(username)) => Some(AuthorSummary {
            id,
            username,
            first_name: row.try_get("target_first_name")?,
            last_name: row.try_get("target_last_name")?,
            profile_image_url: row.try_get("target_profile_image_url")?,
        }),
        _ => None,
    };

    let post_title: Option<String> = row.try_get("post_title")?;
    let post = match (request.post_id, post_title) {
        (Some(id), Some(title)) => Some(VettingPostRef {
            id,
            title,
            post_type: row.try_get("post_post_type")?,
        }),
        _ => None,
    };

    Ok(VettingRequestView {
        request,
        author,
        target_user,
        post,
    })
}

async fn ensure_referenced(db: &PgPool, table: &'static str, id: Uuid, what: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
        table
    ))
    .bind(id)
    .fetch_one(db)
    .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("{} not found", what)))
    }
}

async fn load_view(db: &PgPool, request_id: Uuid) -> Result<Option<VettingRequestView>> {
    let mut builder = QueryBuilder::<Postgres>::new(VETTING_VIEW_SELECT);
    builder.push(" WHERE vr.id = ");
    builder.push_bind(request_id);

    let row = builder.build().fetch_optional(db).await?;
    row.as_ref().map(vetting_view_from_row).transpose()
}

pub async fn create_request(
    db: &PgPool,
    author_id: Uuid,
    payload: CreateVettingRequest,
) -> Result<VettingRequestView> {
    if let Some(target_user_id) = payload.target_user_id {
        ensure_referenced(db, "users", target_user_id, "Target user").await?;
    }
    if let Some(post_id) = payload.post_id {
        ensure_referenced(db, "posts", post_id, "Post").await?;
    }
    if let Some(person_id) = payload.person_id {
        ensure_referenced(db, "persons", person_id, "Person").await?;
    }

    let request_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO vetting_requests (
            id, author_id, target_user_id, post_id, person_id, target_name, target_age,
            target_gender, target_location, target_description, status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(author_id)
    .bind(payload.target_user_id)
    .bind(payload.post_id)
    .bind(payload.person_id)
    .bind(&payload.target_name)
    .bind(payload.target_age)
    .bind(payload.target_gender)
    .bind(&payload.target_location)
    .bind(&payload.target_description)
    .bind(VettingStatus::Pending)
    .fetch_one(db)
    .await?;

    tracing::info!("Vetting request {} opened by {}", request_id, author_id);

    load_view(db, request_id)
        .await?
        .ok_or_else(|| AppError::Internal("Vetting request vanished after insert".to_string()))
}

async fn list_filtered(
    db: &PgPool,
    filter: &FilterBuilder,
    page: PageRequest,
) -> Result<Paginated<VettingRequestView>> {
    let mut builder = QueryBuilder::<Postgres>::new(VETTING_VIEW_SELECT);
    filter.push_where(&mut builder);
    builder.push(" ORDER BY vr.created_at DESC LIMIT ");
    builder.push_bind(page.take);
    builder.push(" OFFSET ");
    builder.push_bind(page.skip);

    let rows = builder.build().fetch_all(db).await?;
    let requests = rows
        .iter()
        .map(vetting_view_from_row)
        .collect::<Result<Vec<_>>>()?;

    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM vetting_requests vr");
    filter.push_where(&mut count);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(db).await?;

    Ok(Paginated::new(requests, total, page))
}

pub async fn list_requests(
    db: &PgPool,
    params: &ListVettingQuery,
) -> Result<Paginated<VettingRequestView>> {
    let filter = FilterBuilder::new()
        .field("vr.status", params.status.map(|s| s.as_str()), MatchMode::Equals)
        .field("vr.author_id", params.author_id, MatchMode::Equals)
        .field("vr.target_user_id", params.target_user_id, MatchMode::Equals);

    list_filtered(db, &filter, PageRequest::from_page(params.page, params.limit)).await
}

pub async fn search_by_name(
    db: &PgPool,
    name: &str,
    page: PageRequest,
) -> Result<Paginated<VettingRequestView>> {
    let filter = FilterBuilder::new().field("vr.target_name", Some(name), MatchMode::Contains);
    list_filtered(db, &filter, page).await
}

pub async fn get_request(db: &PgPool, request_id: Uuid) -> Result<VettingRequestView> {
    load_view(db, request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Vetting request not found".to_string()))
}

pub async fn update_status(
    db: &PgPool,
    request_id: Uuid,
    status: VettingStatus,
    user_id: Uuid,
) -> Result<VettingRequest> {
    let request = sqlx::query_as::<_, VettingRequest>(
        "UPDATE vetting_requests SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(request_id)
    .bind(status)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("Vetting request not found".to_string()))?;

    tracing::info!(
        "Vetting request {} moved to {} by {}",
        request_id,
        status.as_str(),
        user_id
    );

    Ok(request)
}
