use serde::{Deserialize, Serialize};

use crate::models::{PersonWithPostCount, PostView, UserSearchResult};
use crate::utils::votes::WithVoteCounts;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPersonsQuery {
    pub q: Option<String>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchTotals {
    pub persons: i64,
    pub posts: i64,
    pub users: i64,
}

#[derive(Debug, Serialize)]
pub struct SearchAllResponse {
    pub persons: Vec<PersonWithPostCount>,
    pub posts: Vec<WithVoteCounts<PostView>>,
    pub users: Vec<UserSearchResult>,
    pub totals: SearchTotals,
}
