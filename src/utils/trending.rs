use chrono::{DateTime, Duration, Utc};

use crate::models::PostView;
use crate::utils::votes::{Voted, WithVoteCounts};

pub const VOTE_WEIGHT: f64 = 2.0;
pub const COMMENT_WEIGHT: f64 = 3.0;
pub const VIEW_WEIGHT: f64 = 0.1;
pub const RECENCY_BONUS_MAX: f64 = 50.0;
pub const RECENCY_DECAY_PER_DAY: f64 = 7.0;

/// Only posts this young are considered for trending.
pub const CANDIDATE_WINDOW_DAYS: i64 = 30;
/// Upper bound on posts scored per request.
pub const MAX_CANDIDATES: i64 = 100;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Engagement signals a trending candidate must expose.
pub trait Trendable {
    fn comment_count(&self) -> i64;
    fn view_count(&self) -> Option<i64>;
    fn created_at(&self) -> DateTime<Utc>;
}

impl Trendable for PostView {
    fn comment_count(&self) -> i64 {
        self.comment_count
    }

    fn view_count(&self) -> Option<i64> {
        Some(i64::from(self.view_count))
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

pub fn candidate_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(CANDIDATE_WINDOW_DAYS)
}

/// Whole days elapsed since `created_at`, floored. Clock skew that puts a
/// post in the future counts as age zero.
pub fn age_in_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_DAY)
        .max(0)
}

pub fn recency_bonus(age_in_days: i64) -> f64 {
    (RECENCY_BONUS_MAX - age_in_days as f64 * RECENCY_DECAY_PER_DAY).max(0.0)
}

pub fn trending_score(
    upvotes: i64,
    downvotes: i64,
    comment_count: i64,
    view_count: i64,
    age_in_days: i64,
) -> f64 {
    (upvotes - downvotes) as f64 * VOTE_WEIGHT
        + comment_count as f64 * COMMENT_WEIGHT
        + view_count as f64 * VIEW_WEIGHT
        + recency_bonus(age_in_days)
}

pub fn score_candidate<T: Trendable>(candidate: &Voted<T>, now: DateTime<Utc>) -> f64 {
    let tally = candidate.tally();
    let post = &candidate.item;
    trending_score(
        tally.upvotes,
        tally.downvotes,
        post.comment_count(),
        post.view_count().unwrap_or(0),
        age_in_days(post.created_at(), now),
    )
}

/// Ranks candidates by trending score, highest first, and keeps the top
/// `limit`. Equal scores keep their input order.
pub fn compute_trending<T: Trendable>(
    candidates: Vec<Voted<T>>,
    limit: usize,
    now: DateTime<Utc>,
) -> Vec<WithVoteCounts<T>> {
    let mut scored: Vec<(f64, Voted<T>)> = candidates
        .into_iter()
        .map(|candidate| (score_candidate(&candidate, now), candidate))
        .collect();

    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate.into_counts())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VoteEntry;
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq)]
    struct Sample {
        name: &'static str,
        comments: i64,
        views: Option<i64>,
        created_at: DateTime<Utc>,
    }

    impl Trendable for Sample {
        fn comment_count(&self) -> i64 {
            self.comments
        }

        fn view_count(&self) -> Option<i64> {
            self.views
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn sample(
        name: &'static str,
        tags: &[&str],
        comments: i64,
        views: Option<i64>,
        age: Duration,
    ) -> Voted<Sample> {
        Voted::new(
            Sample {
                name,
                comments,
                views,
                created_at: now() - age,
            },
            tags.iter().map(|tag| VoteEntry::new(*tag)).collect(),
        )
    }

    #[test]
    fn recency_bonus_decays_to_zero_by_day_eight() {
        assert_eq!(recency_bonus(0), 50.0);
        assert_eq!(recency_bonus(1), 43.0);
        assert_eq!(recency_bonus(7), 1.0);
        assert_eq!(recency_bonus(8), 0.0);
        assert_eq!(recency_bonus(10), 0.0);
        assert_eq!(recency_bonus(29), 0.0);

        for day in 0..30 {
            assert!(recency_bonus(day + 1) <= recency_bonus(day));
        }
    }

    #[test]
    fn age_is_floored_to_whole_days() {
        assert_eq!(age_in_days(now(), now()), 0);
        assert_eq!(age_in_days(now() - Duration::hours(23), now()), 0);
        assert_eq!(age_in_days(now() - Duration::hours(25), now()), 1);
        assert_eq!(age_in_days(now() - Duration::days(10), now()), 10);
        assert_eq!(age_in_days(now() + Duration::hours(3), now()), 0);
    }

    #[test]
    fn scores_fresh_post_with_mixed_engagement() {
        let post = sample(
            "fresh",
            &["UPVOTE", "UPVOTE", "DOWNVOTE"],
            5,
            Some(100),
            Duration::zero(),
        );

        assert_eq!(score_candidate(&post, now()), 77.0);
    }

    #[test]
    fn missing_view_count_counts_as_zero() {
        let post = sample("no views", &[], 0, None, Duration::days(20));
        assert_eq!(score_candidate(&post, now()), 0.0);
    }

    #[test]
    fn newer_post_outranks_identical_older_post() {
        let ranked = compute_trending(
            vec![
                sample("old", &["UPVOTE"], 1, Some(10), Duration::days(10)),
                sample("new", &["UPVOTE"], 1, Some(10), Duration::zero()),
            ],
            10,
            now(),
        );

        let names: Vec<_> = ranked.iter().map(|p| p.item.name).collect();
        assert_eq!(names, vec!["new", "old"]);
    }

    #[test]
    fn ranks_descending_and_truncates_to_limit() {
        let ranked = compute_trending(
            vec![
                sample("quiet", &[], 0, Some(0), Duration::days(12)),
                sample("hot", &["UPVOTE"; 20], 10, Some(500), Duration::days(2)),
                sample("warm", &["UPVOTE"; 3], 2, Some(40), Duration::days(5)),
            ],
            2,
            now(),
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item.name, "hot");
        assert_eq!(ranked[0].upvotes, 20);
        assert_eq!(ranked[1].item.name, "warm");
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = compute_trending(
            vec![
                sample("first", &[], 1, Some(0), Duration::days(9)),
                sample("second", &[], 1, Some(0), Duration::days(15)),
            ],
            5,
            now(),
        );

        let names: Vec<_> = ranked.iter().map(|p| p.item.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn empty_candidates_yield_nothing() {
        let ranked = compute_trending::<Sample>(Vec::new(), 10, now());
        assert!(ranked.is_empty());
    }
}
