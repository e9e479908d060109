use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{PostVote, VoteType},
    store::VoteStore,
};

#[derive(Debug, Default)]
struct State {
    posts: HashSet<Uuid>,
    votes: Vec<PostVote>,
    writes: usize,
    lookups: usize,
}

/// Process-local [`VoteStore`] with the same uniqueness rule as the
/// `votes` table.
#[derive(Debug, Default)]
pub struct InMemoryVoteStore(Mutex<State>);

impl InMemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_post(&self, post_id: Uuid) {
        self.0.lock().await.posts.insert(post_id);
    }

    /// Inserts a vote directly, bypassing the toggle. Used to stage races.
    pub async fn seed_vote(&self, user_id: Uuid, post_id: Uuid, vote_type: VoteType) -> PostVote {
        let vote = new_vote(user_id, post_id, vote_type);
        self.0.lock().await.votes.push(vote.clone());
        vote
    }

    pub async fn votes(&self) -> Vec<PostVote> {
        self.0.lock().await.votes.clone()
    }

    /// Number of create, update and delete calls served.
    pub async fn writes(&self) -> usize {
        self.0.lock().await.writes
    }

    /// Number of `find_vote` calls served.
    pub async fn lookups(&self) -> usize {
        self.0.lock().await.lookups
    }
}

fn new_vote(user_id: Uuid, post_id: Uuid, vote_type: VoteType) -> PostVote {
    let now = Utc::now();
    PostVote {
        id: Uuid::new_v4(),
        user_id,
        post_id,
        vote_type,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl VoteStore for InMemoryVoteStore {
    async fn post_exists(&self, post_id: Uuid) -> Result<bool> {
        Ok(self.0.lock().await.posts.contains(&post_id))
    }

    async fn find_vote(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<PostVote>> {
        let mut guard = self.0.lock().await;
        guard.lookups += 1;

        Ok(guard
            .votes
            .iter()
            .find(|v| v.user_id == user_id && v.post_id == post_id)
            .cloned())
    }

    async fn create_vote(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        vote_type: VoteType,
    ) -> Result<PostVote> {
        let mut guard = self.0.lock().await;
        guard.writes += 1;

        if guard
            .votes
            .iter()
            .any(|v| v.user_id == user_id && v.post_id == post_id)
        {
            return Err(AppError::Conflict("Vote already exists".to_string()));
        }

        let vote = new_vote(user_id, post_id, vote_type);
        guard.votes.push(vote.clone());
        Ok(vote)
    }

    async fn update_vote(&self, vote_id: Uuid, vote_type: VoteType) -> Result<PostVote> {
        let mut guard = self.0.lock().await;
        guard.writes += 1;

        let vote = guard
            .votes
            .iter_mut()
            .find(|v| v.id == vote_id)
            .ok_or_else(|| AppError::NotFound("Vote not found".to_string()))?;

        vote.vote_type = vote_type;
        vote.updated_at = Utc::now();
        Ok(vote.clone())
    }

    async fn delete_vote(&self, vote_id: Uuid) -> Result<()> {
        let mut guard = self.0.lock().await;
        guard.writes += 1;
        guard.votes.retain(|v| v.id != vote_id);
        Ok(())
    }
}
