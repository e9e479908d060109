use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::{AuthorSummary, PersonSummary};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "post_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostType {
    Experience,
    Warning,
    VettingRequest,
    Question,
}

impl PostType {
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Experience => "EXPERIENCE",
            PostType::Warning => "WARNING",
            PostType::VettingRequest => "VETTING_REQUEST",
            PostType::Question => "QUESTION",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub person_id: Option<Uuid>,
    pub evidence_urls: Vec<String>,
    pub is_anonymous: bool,
    pub is_published: bool,
    pub view_count: i32,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post as rendered to clients, minus its raw votes.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub evidence_urls: Vec<String>,
    pub is_anonymous: bool,
    pub is_published: bool,
    pub view_count: i32,
    pub author_id: Uuid,
    pub person_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: AuthorSummary,
    pub person: Option<PersonSummary>,
    pub comment_count: i64,
}

impl PostView {
    pub fn with_masked_person(self) -> Self {
        Self {
            person: self.person.map(PersonSummary::with_masked_phone),
            ..self
        }
    }
}

// Create post request
#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(rename = "type")]
    pub post_type: PostType,
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1, max = 20000))]
    pub content: String,
    pub person_id: Option<Uuid>,
    #[serde(default)]
    pub evidence_urls: Vec<String>,
    pub is_anonymous: Option<bool>,
    pub is_published: Option<bool>,
}

// Update post request
#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 20000))]
    pub content: Option<String>,
    pub evidence_urls: Option<Vec<String>>,
    pub is_anonymous: Option<bool>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub post_type: Option<PostType>,
    pub author_id: Option<Uuid>,
}
