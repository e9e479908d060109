use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Gender, PHONE_NUMBER_RE};
use crate::utils::phone::mask_phone;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub aliases: Vec<String>,
    pub approximate_age: Option<i32>,
    pub gender: Option<Gender>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_verified: bool,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    pub fn with_masked_phone(self) -> Self {
        Self {
            phone_number: mask_phone(self.phone_number.as_deref()),
            ..self
        }
    }
}

/// Person projection embedded in post views.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: Uuid,
    pub name: String,
    pub approximate_age: Option<i32>,
    pub gender: Option<Gender>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_verified: bool,
}

impl PersonSummary {
    pub fn with_masked_phone(self) -> Self {
        Self {
            phone_number: mask_phone(self.phone_number.as_deref()),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PersonWithPostCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub person: Person,
    pub post_count: i64,
}

impl PersonWithPostCount {
    pub fn with_masked_phone(self) -> Self {
        Self {
            person: self.person.with_masked_phone(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonCreator {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDetail {
    #[serde(flatten)]
    pub person: Person,
    pub created_by: PersonCreator,
    pub post_count: i64,
    pub vetting_request_count: i64,
}

// Create person request
#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[validate(range(min = 18, max = 120))]
    pub approximate_age: Option<i32>,
    pub gender: Option<Gender>,
    #[validate(regex(path = *PHONE_NUMBER_RE, message = "Phone number must be a valid format"))]
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    #[validate(url)]
    pub profile_image_url: Option<String>,
}

// Update person request; `is_verified` is honoured for admins only
#[derive(Debug, Clone, Default, Validate, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub aliases: Option<Vec<String>>,
    #[validate(range(min = 18, max = 120))]
    pub approximate_age: Option<i32>,
    pub gender: Option<Gender>,
    #[validate(regex(path = *PHONE_NUMBER_RE, message = "Phone number must be a valid format"))]
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    #[validate(url)]
    pub profile_image_url: Option<String>,
    pub is_verified: Option<bool>,
}
