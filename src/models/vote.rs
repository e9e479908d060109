use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteType::Upvote => "UPVOTE",
            VoteType::Downvote => "DOWNVOTE",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Exact, case-sensitive tags only
impl FromStr for VoteType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPVOTE" => Ok(VoteType::Upvote),
            "DOWNVOTE" => Ok(VoteType::Downvote),
            _ => Err(format!("Unknown VoteType: {}", s)),
        }
    }
}

/// One row of `votes`, keyed uniquely by `(user_id, post_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostVote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw vote tag as loaded alongside a post. The tag is kept as text so
/// unexpected values can be skipped when counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteEntry {
    pub vote_type: String,
}

impl VoteEntry {
    pub fn new(vote_type: impl Into<String>) -> Self {
        Self {
            vote_type: vote_type.into(),
        }
    }
}

// Vote request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub vote_type: VoteType,
}

// Vote toggle response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResult {
    pub vote_type: Option<VoteType>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVote {
    pub vote_type: Option<VoteType>,
}
