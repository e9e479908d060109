use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        AuthorSummary, CreatePostRequest, ListPostsQuery, PersonSummary, Post, PostView,
        UpdatePostRequest, VoteEntry,
    },
    utils::{
        filters::{FilterBuilder, MatchMode},
        pagination::{PageRequest, Paginated},
        permissions::{can_mutate_post, ensure},
        trending::{MAX_CANDIDATES, candidate_cutoff},
        votes::{Voted, WithVoteCounts, aggregate_votes},
    },
};

/// Post columns joined with author, optional person, comment count and the
/// raw vote tags as a JSON array.
pub(crate) const POST_VIEW_SELECT: &str = r#"
    SELECT
        p.id, p.post_type, p.title, p.content, p.evidence_urls,
        p.is_anonymous, p.is_published, p.view_count, p.author_id, p.person_id,
        p.created_at, p.updated_at,
        u.username AS author_username, u.first_name AS author_first_name,
        u.last_name AS author_last_name, u.profile_image_url AS author_profile_image_url,
        pe.name AS person_name, pe.approximate_age AS person_approximate_age,
        pe.gender AS person_gender, pe.phone_number AS person_phone_number,
        pe.city AS person_city, pe.state AS person_state,
        pe.profile_image_url AS person_profile_image_url,
        pe.is_verified AS person_is_verified,
        (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
        COALESCE(
            (SELECT json_agg(json_build_object('voteType', v.vote_type))
             FROM votes v WHERE v.post_id = p.id),
            '[]'::json
        ) AS votes
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN persons pe ON pe.id = p.person_id
"#;

pub(crate) fn post_view_from_row(row: &PgRow) -> Result<Voted<PostView>> {
    let person_id: Option<Uuid> = row.try_get("person_id")?;
    let person_name: Option<String> = row.try_get("person_name")?;

    let person = match (person_id, person_name) {
        (Some(id), Some(name)) => Some(PersonSummary {
            id,
            name,
            approximate_age: row.try_get("person_approximate_age")?,
            gender: row.try_get("person_gender")?,
            phone_number: row.try_get("person_phone_number")?,
            city: row.try_get("person_city")?,
            state: row.try_get("person_state")?,
            profile_image_url: row.try_get("person_profile_image_url")?,
            is_verified: row.try_get("person_is_verified")?,
        }),
        _ => None,
    };

    let author_id: Uuid = row.try_get("author_id")?;
    let Json(votes): Json<Vec<VoteEntry>> = row.try_get("votes")?;

    let view = PostView {
        id: row.try_get("id")?,
        post_type: row.try_get("post_type")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        evidence_urls: row.try_get("evidence_urls")?,
        is_anonymous: row.try_get("is_anonymous")?,
        is_published: row.try_get("is_published")?,
        view_count: row.try_get("view_count")?,
        author_id,
        person_id,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        author: AuthorSummary {
            id: author_id,
            username: row.try_get("author_username")?,
            first_name: row.try_get("author_first_name")?,
            last_name: row.try_get("author_last_name")?,
            profile_image_url: row.try_get("author_profile_image_url")?,
        },
        person,
        comment_count: row.try_get("comment_count")?,
    };

    Ok(Voted::new(view, votes))
}

/// Public rendering of a loaded post: nested person phone masked, raw votes
/// replaced by counts.
pub fn present(post: Voted<PostView>) -> WithVoteCounts<PostView> {
    post.map(PostView::with_masked_person).into_counts()
}

pub async fn find_post(db: &PgPool, post_id: Uuid) -> Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(db)
        .await?;

    Ok(post)
}

pub async fn find_post_view(db: &PgPool, post_id: Uuid) -> Result<Option<Voted<PostView>>> {
    let mut builder = QueryBuilder::<Postgres>::new(POST_VIEW_SELECT);
    builder.push(" WHERE p.id = ");
    builder.push_bind(post_id);

    let row = builder.build().fetch_optional(db).await?;
    row.as_ref().map(post_view_from_row).transpose()
}

async fn load_post_view(db: &PgPool, post_id: Uuid) -> Result<WithVoteCounts<PostView>> {
    let post = find_post_view(db, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(present(post))
}

pub async fn create_post(
    db: &PgPool,
    author_id: Uuid,
    payload: CreatePostRequest,
) -> Result<WithVoteCounts<PostView>> {
    if let Some(person_id) = payload.person_id {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM persons WHERE id = $1)")
                .bind(person_id)
                .fetch_one(db)
                .await?;
        if !exists {
            return Err(AppError::NotFound("Person not found".to_string()));
        }
    }

    let post_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO posts (
            id, post_type, title, content, person_id, evidence_urls,
            is_anonymous, is_published, author_id, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.post_type)
    .bind(&payload.title)
    .bind(&payload.content)
    .bind(payload.person_id)
    .bind(&payload.evidence_urls)
    .bind(payload.is_anonymous.unwrap_or(false))
    .bind(payload.is_published.unwrap_or(true))
    .bind(author_id)
    .fetch_one(db)
    .await?;

    tracing::info!(
        "Post {} ({}) created by {}",
        post_id,
        payload.post_type.as_str(),
        author_id
    );

    load_post_view(db, post_id).await
}

pub async fn list_posts(
    db: &PgPool,
    params: &ListPostsQuery,
) -> Result<Paginated<WithVoteCounts<PostView>>> {
    let page = PageRequest::from_page(params.page, params.limit);
    let filter = FilterBuilder::new()
        .field("p.post_type", params.post_type.map(|t| t.as_str()), MatchMode::Equals)
        .field("p.author_id", params.author_id, MatchMode::Equals);

    list_published(db, &filter, page).await
}

/// Published posts matching `filter`, newest first.
pub(crate) async fn list_published(
    db: &PgPool,
    filter: &FilterBuilder,
    page: PageRequest,
) -> Result<Paginated<WithVoteCounts<PostView>>> {
    let mut builder = QueryBuilder::<Postgres>::new(POST_VIEW_SELECT);
    builder.push(" WHERE p.is_published = TRUE");
    filter.push_and(&mut builder);
    builder.push(" ORDER BY p.created_at DESC LIMIT ");
    builder.push_bind(page.take);
    builder.push(" OFFSET ");
    builder.push_bind(page.skip);

    let rows = builder.build().fetch_all(db).await?;
    let posts = rows
        .iter()
        .map(|row| post_view_from_row(row).map(present))
        .collect::<Result<Vec<_>>>()?;

    let mut count = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM posts p WHERE p.is_published = TRUE",
    );
    filter.push_and(&mut count);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(db).await?;

    Ok(Paginated::new(posts, total, page))
}

/// Loads a post and records one view. The returned view count is the one
/// read before the increment.
pub async fn get_post(db: &PgPool, post_id: Uuid) -> Result<WithVoteCounts<PostView>> {
    let post = find_post_view(db, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = $1")
        .bind(post_id)
        .execute(db)
        .await?;

    tracing::debug!("Post {} viewed", post_id);

    Ok(aggregate_votes(&post.map(PostView::with_masked_person)))
}

pub async fn update_post(
    db: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
    payload: UpdatePostRequest,
) -> Result<WithVoteCounts<PostView>> {
    let post = find_post(db, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    ensure(
        can_mutate_post(&post, user_id),
        "You can only update your own posts",
    )?;

    sqlx::query(
        r#"
        UPDATE posts SET
            title = COALESCE($2, title),
            content = COALESCE($3, content),
            evidence_urls = COALESCE($4, evidence_urls),
            is_anonymous = COALESCE($5, is_anonymous),
            is_published = COALESCE($6, is_published),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .bind(&payload.title)
    .bind(&payload.content)
    .bind(&payload.evidence_urls)
    .bind(payload.is_anonymous)
    .bind(payload.is_published)
    .execute(db)
    .await?;

    tracing::info!("Post {} updated by {}", post_id, user_id);

    load_post_view(db, post_id).await
}

pub async fn delete_post(db: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<()> {
    let post = find_post(db, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    ensure(
        can_mutate_post(&post, user_id),
        "You can only delete your own posts",
    )?;

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(db)
        .await?;

    tracing::info!("Post {} deleted by {}", post_id, user_id);

    Ok(())
}

/// Published posts from the trending window, newest first.
pub async fn trending_candidates(db: &PgPool, now: DateTime<Utc>) -> Result<Vec<Voted<PostView>>> {
    let mut builder = QueryBuilder::<Postgres>::new(POST_VIEW_SELECT);
    builder.push(" WHERE p.is_published = TRUE AND p.created_at >= ");
    builder.push_bind(candidate_cutoff(now));
    builder.push(" ORDER BY p.created_at DESC LIMIT ");
    builder.push_bind(MAX_CANDIDATES);

    let rows = builder.build().fetch_all(db).await?;
    rows.iter().map(post_view_from_row).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Gender;
    use serde_json::json;

    pub(crate) fn voted_post(tags: &[&str]) -> Voted<PostView> {
        let now = Utc::now();
        let person_id = Uuid::new_v4();
        let author_id = Uuid::new_v4();

        Voted::new(
            PostView {
                id: Uuid::new_v4(),
                post_type: crate::models::PostType::Warning,
                title: "Seen at the mall".to_string(),
                content: "Same story, different name.".to_string(),
                evidence_urls: Vec::new(),
                is_anonymous: false,
                is_published: true,
                view_count: 12,
                author_id,
                person_id: Some(person_id),
                created_at: now,
                updated_at: now,
                author: AuthorSummary {
                    id: author_id,
                    username: "tea_spiller".to_string(),
                    first_name: "Sam".to_string(),
                    last_name: "Lee".to_string(),
                    profile_image_url: None,
                },
                person: Some(PersonSummary {
                    id: person_id,
                    name: "Jordan".to_string(),
                    approximate_age: Some(31),
                    gender: Some(Gender::Male),
                    phone_number: Some("(555) 123-4567".to_string()),
                    city: Some("Austin".to_string()),
                    state: Some("TX".to_string()),
                    profile_image_url: None,
                    is_verified: false,
                }),
                comment_count: 4,
            },
            tags.iter().map(|tag| VoteEntry::new(*tag)).collect(),
        )
    }

    #[test]
    fn present_masks_person_phone_and_counts_votes() {
        let post = voted_post(&["UPVOTE", "DOWNVOTE", "UPVOTE", "MEH"]);
        let raw = post.clone();

        let shown = present(post);

        assert_eq!((shown.upvotes, shown.downvotes), (2, 1));
        assert_eq!(shown.item.title, raw.item.title);
        assert_eq!(shown.item.comment_count, 4);

        let person = shown.item.person.as_ref().unwrap();
        let original = raw.item.person.as_ref().unwrap();
        assert_eq!(person.phone_number.as_deref(), Some("******4567"));
        assert_eq!(person.name, original.name);
        assert_eq!(person.city, original.city);
        assert_eq!(person.state, original.state);
        assert_eq!(person.approximate_age, original.approximate_age);
    }

    #[test]
    fn presented_post_serializes_counts_without_votes() {
        let value = serde_json::to_value(present(voted_post(&["DOWNVOTE"]))).unwrap();

        assert_eq!(value["upvotes"], json!(0));
        assert_eq!(value["downvotes"], json!(1));
        assert_eq!(value["commentCount"], json!(4));
        assert_eq!(value["person"]["phoneNumber"], json!("******4567"));
        assert_eq!(value["person"]["name"], json!("Jordan"));
        assert!(value.get("votes").is_none());
    }

    #[test]
    fn post_without_person_presents_cleanly() {
        let mut post = voted_post(&[]);
        post.item.person = None;
        post.item.person_id = None;

        let shown = present(post);
        assert!(shown.item.person.is_none());
        assert_eq!((shown.upvotes, shown.downvotes), (0, 0));
    }
}
