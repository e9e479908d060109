use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::{AuthorSummary, Gender, PostType};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "vetting_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VettingStatus {
    Pending,
    InProgress,
    Completed,
    Rejected,
}

impl VettingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VettingStatus::Pending => "PENDING",
            VettingStatus::InProgress => "IN_PROGRESS",
            VettingStatus::Completed => "COMPLETED",
            VettingStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VettingRequest {
    pub id: Uuid,
    pub author_id: Uuid,
    pub target_user_id: Option<Uuid>,
    pub post_id: Option<Uuid>,
    pub person_id: Option<Uuid>,
    pub target_name: String,
    pub target_age: Option<i32>,
    pub target_gender: Option<Gender>,
    pub target_location: Option<String>,
    pub target_description: Option<String>,
    pub status: VettingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VettingPostRef {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VettingRequestView {
    #[serde(flatten)]
    pub request: VettingRequest,
    pub author: AuthorSummary,
    pub target_user: Option<AuthorSummary>,
    pub post: Option<VettingPostRef>,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVettingRequest {
    pub target_user_id: Option<Uuid>,
    pub post_id: Option<Uuid>,
    pub person_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub target_name: String,
    #[validate(range(min = 18, max = 120))]
    pub target_age: Option<i32>,
    pub target_gender: Option<Gender>,
    #[validate(length(max = 200))]
    pub target_location: Option<String>,
    #[validate(length(max = 2000))]
    pub target_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVettingStatusRequest {
    pub status: VettingStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVettingQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<VettingStatus>,
    pub author_id: Option<Uuid>,
    pub target_user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SearchVettingQuery {
    pub name: String,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
