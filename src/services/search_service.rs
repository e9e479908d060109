use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::Result,
    models::{
        PersonWithPostCount, PostView, SearchAllResponse, SearchPersonsQuery, SearchTotals,
        UserSearchResult,
    },
    services::{person_service::PERSON_WITH_POST_COUNT, post_service},
    utils::{
        filters::{FilterBuilder, MatchMode},
        pagination::{PageRequest, Paginated},
        trending::compute_trending,
        votes::{Voted, WithVoteCounts},
    },
};

pub const SEARCH_ALL_TAKE: i64 = 10;
pub const DEFAULT_TRENDING_LIMIT: usize = 10;

fn person_filter(params: &SearchPersonsQuery) -> FilterBuilder {
    FilterBuilder::new()
        .any_of(
            params.q.as_deref(),
            &[
                ("pe.name", MatchMode::Contains),
                ("pe.aliases", MatchMode::Has),
                ("pe.city", MatchMode::Contains),
            ],
        )
        .field("pe.name", params.name.as_deref(), MatchMode::Contains)
        .field(
            "pe.phone_number",
            params.phone_number.as_deref(),
            MatchMode::DigitsContains,
        )
        .field("pe.city", params.city.as_deref(), MatchMode::Contains)
        .field("pe.state", params.state.as_deref(), MatchMode::Contains)
}

/// Persons matching every given criterion, verified first then newest.
/// Phone numbers come back masked.
pub async fn search_persons(
    db: &PgPool,
    params: &SearchPersonsQuery,
    page: PageRequest,
) -> Result<Paginated<PersonWithPostCount>> {
    let filter = person_filter(params);

    let mut builder = QueryBuilder::<Postgres>::new(PERSON_WITH_POST_COUNT);
    filter.push_where(&mut builder);
    builder.push(" ORDER BY pe.is_verified DESC, pe.created_at DESC LIMIT ");
    builder.push_bind(page.take);
    builder.push(" OFFSET ");
    builder.push_bind(page.skip);

    let persons = builder
        .build_query_as::<PersonWithPostCount>()
        .fetch_all(db)
        .await?
        .into_iter()
        .map(PersonWithPostCount::with_masked_phone)
        .collect();

    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM persons pe");
    filter.push_where(&mut count);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(db).await?;

    tracing::debug!("Person search matched {} rows", total);

    Ok(Paginated::new(persons, total, page))
}

pub async fn search_posts(
    db: &PgPool,
    query: &str,
    page: PageRequest,
) -> Result<Paginated<WithVoteCounts<PostView>>> {
    let filter = FilterBuilder::new().any_of(
        Some(query),
        &[
            ("p.title", MatchMode::Contains),
            ("p.content", MatchMode::Contains),
        ],
    );

    post_service::list_published(db, &filter, page).await
}

/// Active, unbanned users by username or name. Only public profile fields
/// are returned.
pub async fn search_users(
    db: &PgPool,
    query: &str,
    page: PageRequest,
) -> Result<Paginated<UserSearchResult>> {
    let filter = FilterBuilder::new().any_of(
        Some(query),
        &[
            ("u.username", MatchMode::Contains),
            ("u.first_name", MatchMode::Contains),
            ("u.last_name", MatchMode::Contains),
        ],
    );

    let mut builder = QueryBuilder::<Postgres>::new(
        r#"
        SELECT u.id, u.username, u.first_name, u.last_name, u.bio,
               u.profile_image_url, u.created_at
        FROM users u
        WHERE u.is_active = TRUE AND u.is_banned = FALSE
        "#,
    );
    filter.push_and(&mut builder);
    builder.push(" ORDER BY u.created_at DESC LIMIT ");
    builder.push_bind(page.take);
    builder.push(" OFFSET ");
    builder.push_bind(page.skip);

    let users = builder
        .build_query_as::<UserSearchResult>()
        .fetch_all(db)
        .await?;

    let mut count = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM users u WHERE u.is_active = TRUE AND u.is_banned = FALSE",
    );
    filter.push_and(&mut count);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(db).await?;

    Ok(Paginated::new(users, total, page))
}

/// First page of each search kind with their totals.
pub async fn search_all(db: &PgPool, query: &str) -> Result<SearchAllResponse> {
    let page = PageRequest::from_skip_take(0, SEARCH_ALL_TAKE);
    let persons_query = SearchPersonsQuery {
        q: Some(query.to_string()),
        ..Default::default()
    };

    let (persons, posts, users) = tokio::try_join!(
        search_persons(db, &persons_query, page),
        search_posts(db, query, page),
        search_users(db, query, page),
    )?;

    Ok(SearchAllResponse {
        totals: SearchTotals {
            persons: persons.total,
            posts: posts.total,
            users: users.total,
        },
        persons: persons.items,
        posts: posts.items,
        users: users.items,
    })
}

/// Masks each candidate's person phone, then ranks by trending score.
pub fn rank_trending(
    candidates: Vec<Voted<PostView>>,
    limit: usize,
    now: DateTime<Utc>,
) -> Vec<WithVoteCounts<PostView>> {
    let masked = candidates
        .into_iter()
        .map(|post| post.map(PostView::with_masked_person))
        .collect();

    compute_trending(masked, limit, now)
}

pub async fn trending(db: &PgPool, limit: usize) -> Result<Vec<WithVoteCounts<PostView>>> {
    let now = Utc::now();
    let candidates = post_service::trending_candidates(db, now).await?;

    let ranked = rank_trending(candidates, limit, now);
    tracing::debug!("Trending returned {} posts", ranked.len());

    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VoteEntry;
    use crate::services::post_service::tests::voted_post;
    use chrono::Duration;

    fn render(params: &SearchPersonsQuery) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM persons pe");
        person_filter(params).push_where(&mut builder);
        builder.sql().to_string()
    }

    #[test]
    fn no_criteria_searches_everyone() {
        assert_eq!(
            render(&SearchPersonsQuery::default()),
            "SELECT * FROM persons pe"
        );
    }

    #[test]
    fn query_spans_name_aliases_and_city() {
        let params = SearchPersonsQuery {
            q: Some("Jay".to_string()),
            ..Default::default()
        };

        assert_eq!(
            render(&params),
            "SELECT * FROM persons pe WHERE (pe.name ILIKE '%' || $1 || '%' OR $2 = ANY(pe.aliases) OR pe.city ILIKE '%' || $3 || '%')"
        );
    }

    #[test]
    fn criteria_combine_with_and() {
        let params = SearchPersonsQuery {
            phone_number: Some("555-12".to_string()),
            state: Some("GA".to_string()),
            ..Default::default()
        };

        assert_eq!(
            render(&params),
            "SELECT * FROM persons pe WHERE regexp_replace(COALESCE(pe.phone_number, ''), '\\D', '', 'g') LIKE '%' || $1 || '%' AND pe.state ILIKE '%' || $2 || '%'"
        );
    }

    #[test]
    fn trending_masks_nested_person_and_ranks() {
        let now = Utc::now();
        let mut fresh = voted_post(&["UPVOTE", "UPVOTE", "DOWNVOTE"]);
        fresh.item.created_at = now;
        let mut stale = voted_post(&[]);
        stale.item.title = "Old news".to_string();
        stale.item.created_at = now - Duration::days(20);
        stale.votes = vec![VoteEntry::new("DOWNVOTE")];

        let ranked = rank_trending(vec![stale, fresh], 10, now);

        assert_eq!(ranked.len(), 2);
        let top = &ranked[0];
        assert_eq!(top.item.title, "Seen at the mall");
        assert_eq!((top.upvotes, top.downvotes), (2, 1));
        assert_eq!(top.item.comment_count, 4);

        let person = top.item.person.as_ref().unwrap();
        assert_eq!(person.phone_number.as_deref(), Some("******4567"));
        assert_eq!(person.name, "Jordan");
        assert_eq!(person.city.as_deref(), Some("Austin"));

        let other = ranked[1].item.person.as_ref().unwrap();
        assert_eq!(other.phone_number.as_deref(), Some("******4567"));
    }
}
