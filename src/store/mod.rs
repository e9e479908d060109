use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{PostVote, VoteType},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryVoteStore;

/// Persistence needed by the vote toggle. At most one vote exists per
/// `(user_id, post_id)`; a second create for the same pair fails with
/// `AppError::Conflict`.
#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn post_exists(&self, post_id: Uuid) -> Result<bool>;

    async fn find_vote(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<PostVote>>;

    async fn create_vote(&self, user_id: Uuid, post_id: Uuid, vote_type: VoteType)
    -> Result<PostVote>;
    async fn update_vote(&self, vote_id: Uuid, vote_type: VoteType) -> Result<PostVote>;
    async fn delete_vote(&self, vote_id: Uuid) -> Result<()>;
}
