use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        CreatePersonRequest, Person, PersonCreator, PersonDetail, PersonWithPostCount, PostView,
        UpdatePersonRequest, UserRole,
    },
    services::post_service,
    utils::{
        filters::{FilterBuilder, MatchMode},
        pagination::{PageRequest, Paginated},
        permissions::{can_delete_person, can_update_person, ensure, sanitize_person_update},
        votes::WithVoteCounts,
    },
};

/// Person rows with their post count; callers append the `WHERE` clause.
pub(crate) const PERSON_WITH_POST_COUNT: &str = r#"
    SELECT pe.*, (SELECT COUNT(*) FROM posts po WHERE po.person_id = pe.id) AS post_count
    FROM persons pe
"#;

pub async fn find_person(db: &PgPool, person_id: Uuid) -> Result<Option<Person>> {
    let person = sqlx::query_as::<_, Person>("SELECT * FROM persons WHERE id = $1")
        .bind(person_id)
        .fetch_optional(db)
        .await?;

    Ok(person)
}

async fn find_with_post_count(db: &PgPool, person_id: Uuid) -> Result<PersonWithPostCount> {
    let sql = format!("{} WHERE pe.id = $1", PERSON_WITH_POST_COUNT);

    sqlx::query_as::<_, PersonWithPostCount>(&sql)
        .bind(person_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Person not found".to_string()))
}

pub async fn create_person(
    db: &PgPool,
    created_by_id: Uuid,
    payload: CreatePersonRequest,
) -> Result<PersonWithPostCount> {
    let person = sqlx::query_as::<_, Person>(
        r#"
        INSERT INTO persons (
            id, name, aliases, approximate_age, gender, phone_number, city, state,
            country, profile_image_url, created_by_id, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.name)
    .bind(&payload.aliases)
    .bind(payload.approximate_age)
    .bind(payload.gender)
    .bind(&payload.phone_number)
    .bind(&payload.city)
    .bind(&payload.state)
    .bind(&payload.country)
    .bind(&payload.profile_image_url)
    .bind(created_by_id)
    .fetch_one(db)
    .await?;

    tracing::info!("Person {} created by {}", person.id, created_by_id);

    Ok(PersonWithPostCount {
        person,
        post_count: 0,
    })
}

pub async fn get_person(db: &PgPool, person_id: Uuid) -> Result<PersonDetail> {
    let row = sqlx::query(
        r#"
        SELECT
            pe.*,
            u.username AS creator_username,
            (SELECT COUNT(*) FROM posts po WHERE po.person_id = pe.id) AS post_count,
            (SELECT COUNT(*) FROM vetting_requests vr WHERE vr.person_id = pe.id)
                AS vetting_request_count
        FROM persons pe
        JOIN users u ON u.id = pe.created_by_id
        WHERE pe.id = $1
        "#,
    )
    .bind(person_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("Person not found".to_string()))?;

    let person = Person::from_row(&row)?;

    Ok(PersonDetail {
        created_by: PersonCreator {
            id: person.created_by_id,
            username: row.try_get("creator_username")?,
        },
        post_count: row.try_get("post_count")?,
        vetting_request_count: row.try_get("vetting_request_count")?,
        person: person.with_masked_phone(),
    })
}

pub async fn get_person_posts(
    db: &PgPool,
    person_id: Uuid,
    page: PageRequest,
) -> Result<(Person, Paginated<WithVoteCounts<PostView>>)> {
    let person = find_person(db, person_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Person not found".to_string()))?;

    let filter = FilterBuilder::new().field("p.person_id", Some(person_id), MatchMode::Equals);
    let posts = post_service::list_published(db, &filter, page).await?;

    Ok((person.with_masked_phone(), posts))
}

pub async fn update_person(
    db: &PgPool,
    person_id: Uuid,
    user_id: Uuid,
    role: UserRole,
    payload: &UpdatePersonRequest,
) -> Result<PersonWithPostCount> {
    let person = find_person(db, person_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Person not found".to_string()))?;

    ensure(
        can_update_person(&person, user_id, role),
        "You do not have permission to update this person",
    )?;

    let changes = sanitize_person_update(payload, role);

    sqlx::query(
        r#"
        UPDATE persons SET
            name = COALESCE($2, name),
            aliases = COALESCE($3, aliases),
            approximate_age = COALESCE($4, approximate_age),
            gender = COALESCE($5, gender),
            phone_number = COALESCE($6, phone_number),
            city = COALESCE($7, city),
            state = COALESCE($8, state),
            country = COALESCE($9, country),
            profile_image_url = COALESCE($10, profile_image_url),
            is_verified = COALESCE($11, is_verified),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(person_id)
    .bind(&changes.name)
    .bind(&changes.aliases)
    .bind(changes.approximate_age)
    .bind(changes.gender)
    .bind(&changes.phone_number)
    .bind(&changes.city)
    .bind(&changes.state)
    .bind(&changes.country)
    .bind(&changes.profile_image_url)
    .bind(changes.is_verified)
    .execute(db)
    .await?;

    tracing::info!("Person {} updated by {}", person_id, user_id);

    find_with_post_count(db, person_id).await
}

pub async fn delete_person(
    db: &PgPool,
    person_id: Uuid,
    user_id: Uuid,
    role: UserRole,
) -> Result<()> {
    find_person(db, person_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Person not found".to_string()))?;

    ensure(can_delete_person(role), "Only admins can delete persons")?;

    sqlx::query("DELETE FROM persons WHERE id = $1")
        .bind(person_id)
        .execute(db)
        .await?;

    tracing::info!("Person {} deleted by admin {}", person_id, user_id);

    Ok(())
}
