use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{UserVote, VoteResult, VoteType},
    store::VoteStore,
};

/// A user's standing on one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    NoVote,
    Upvoted,
    Downvoted,
}

impl VoteState {
    pub fn current(&self) -> Option<VoteType> {
        match self {
            VoteState::NoVote => None,
            VoteState::Upvoted => Some(VoteType::Upvote),
            VoteState::Downvoted => Some(VoteType::Downvote),
        }
    }
}

impl From<Option<VoteType>> for VoteState {
    fn from(vote_type: Option<VoteType>) -> Self {
        match vote_type {
            None => VoteState::NoVote,
            Some(VoteType::Upvote) => VoteState::Upvoted,
            Some(VoteType::Downvote) => VoteState::Downvoted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Create(VoteType),
    Update(VoteType),
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub action: VoteAction,
    pub next: VoteState,
    pub message: &'static str,
}

/// Repeating the current vote withdraws it, the other type replaces it, and
/// any type is recorded when there is no vote yet.
pub fn transition(state: VoteState, requested: VoteType) -> Transition {
    match state.current() {
        None => Transition {
            action: VoteAction::Create(requested),
            next: Some(requested).into(),
            message: "Vote created",
        },
        Some(current) if current == requested => Transition {
            action: VoteAction::Delete,
            next: VoteState::NoVote,
            message: "Vote removed",
        },
        Some(_) => Transition {
            action: VoteAction::Update(requested),
            next: Some(requested).into(),
            message: "Vote updated",
        },
    }
}

pub async fn toggle_vote<S: VoteStore + ?Sized>(
    store: &S,
    post_id: Uuid,
    user_id: Uuid,
    vote_type: VoteType,
) -> Result<VoteResult> {
    if !store.post_exists(post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let existing = store.find_vote(user_id, post_id).await?;
    let state = VoteState::from(existing.as_ref().map(|v| v.vote_type));
    let step = transition(state, vote_type);

    match (step.action, existing) {
        (VoteAction::Create(vote_type), _) => {
            store.create_vote(user_id, post_id, vote_type).await?;
        }
        (VoteAction::Update(vote_type), Some(vote)) => {
            store.update_vote(vote.id, vote_type).await?;
        }
        (VoteAction::Delete, Some(vote)) => {
            store.delete_vote(vote.id).await?;
        }
        (_, None) => {
            return Err(AppError::Internal(
                "Vote transition without an existing vote".to_string(),
            ));
        }
    }

    tracing::info!(
        "User {} vote on post {}: {:?} -> {:?}",
        user_id,
        post_id,
        state,
        step.next
    );

    Ok(VoteResult {
        vote_type: step.next.current(),
        message: step.message.to_string(),
    })
}

pub async fn get_user_vote<S: VoteStore + ?Sized>(
    store: &S,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<UserVote> {
    let vote = store.find_vote(user_id, post_id).await?;

    Ok(UserVote {
        vote_type: vote.map(|v| v.vote_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryVoteStore;

    async fn store_with_post() -> (InMemoryVoteStore, Uuid, Uuid) {
        let store = InMemoryVoteStore::new();
        let post_id = Uuid::new_v4();
        store.add_post(post_id).await;
        (store, post_id, Uuid::new_v4())
    }

    #[test]
    fn transition_table() {
        use VoteType::{Downvote, Upvote};

        let cases = [
            (VoteState::NoVote, Upvote, VoteAction::Create(Upvote), VoteState::Upvoted, "Vote created"),
            (VoteState::NoVote, Downvote, VoteAction::Create(Downvote), VoteState::Downvoted, "Vote created"),
            (VoteState::Upvoted, Upvote, VoteAction::Delete, VoteState::NoVote, "Vote removed"),
            (VoteState::Downvoted, Downvote, VoteAction::Delete, VoteState::NoVote, "Vote removed"),
            (VoteState::Upvoted, Downvote, VoteAction::Update(Downvote), VoteState::Downvoted, "Vote updated"),
            (VoteState::Downvoted, Upvote, VoteAction::Update(Upvote), VoteState::Upvoted, "Vote updated"),
        ];

        for (state, requested, action, next, message) in cases {
            assert_eq!(
                transition(state, requested),
                Transition { action, next, message },
                "{:?} + {:?}",
                state,
                requested
            );
        }
    }

    #[tokio::test]
    async fn upvote_twice_returns_to_no_vote() {
        let (store, post_id, user_id) = store_with_post().await;

        let first = toggle_vote(&store, post_id, user_id, VoteType::Upvote).await.unwrap();
        assert_eq!(first.vote_type, Some(VoteType::Upvote));
        assert_eq!(first.message, "Vote created");
        assert_eq!(store.votes().await.len(), 1);

        let second = toggle_vote(&store, post_id, user_id, VoteType::Upvote).await.unwrap();
        assert_eq!(second.vote_type, None);
        assert_eq!(second.message, "Vote removed");
        assert!(store.votes().await.is_empty());

        let current = get_user_vote(&store, post_id, user_id).await.unwrap();
        assert_eq!(current.vote_type, None);
    }

    #[tokio::test]
    async fn opposite_vote_switches_in_place() {
        let (store, post_id, user_id) = store_with_post().await;

        toggle_vote(&store, post_id, user_id, VoteType::Upvote).await.unwrap();
        let original_id = store.votes().await[0].id;

        let switched = toggle_vote(&store, post_id, user_id, VoteType::Downvote).await.unwrap();
        assert_eq!(switched.vote_type, Some(VoteType::Downvote));
        assert_eq!(switched.message, "Vote updated");

        let votes = store.votes().await;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].id, original_id);
        assert_eq!(votes[0].vote_type, VoteType::Downvote);
    }

    #[tokio::test]
    async fn downvote_can_be_withdrawn() {
        let (store, post_id, user_id) = store_with_post().await;

        toggle_vote(&store, post_id, user_id, VoteType::Downvote).await.unwrap();
        let removed = toggle_vote(&store, post_id, user_id, VoteType::Downvote).await.unwrap();

        assert_eq!(removed.vote_type, None);
        assert_eq!(removed.message, "Vote removed");
    }

    #[tokio::test]
    async fn votes_are_scoped_per_user() {
        let (store, post_id, alice) = store_with_post().await;
        let bob = Uuid::new_v4();

        toggle_vote(&store, post_id, alice, VoteType::Upvote).await.unwrap();
        toggle_vote(&store, post_id, bob, VoteType::Downvote).await.unwrap();

        assert_eq!(
            get_user_vote(&store, post_id, alice).await.unwrap().vote_type,
            Some(VoteType::Upvote)
        );
        assert_eq!(
            get_user_vote(&store, post_id, bob).await.unwrap().vote_type,
            Some(VoteType::Downvote)
        );
    }

    #[tokio::test]
    async fn missing_post_is_not_found_without_lookup_or_writes() {
        let store = InMemoryVoteStore::new();

        let err = toggle_vote(&store, Uuid::new_v4(), Uuid::new_v4(), VoteType::Upvote)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(ref m) if m == "Post not found"));
        assert_eq!(store.lookups().await, 0);
        assert_eq!(store.writes().await, 0);
        assert!(store.votes().await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_create_surfaces_conflict() {
        let store = InMemoryVoteStore::new();
        let (post_id, user_id) = (Uuid::new_v4(), Uuid::new_v4());
        store.add_post(post_id).await;
        store.seed_vote(user_id, post_id, VoteType::Upvote).await;

        let err = store
            .create_vote(user_id, post_id, VoteType::Downvote)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.votes().await.len(), 1);
    }

    #[tokio::test]
    async fn user_vote_lookup_does_not_require_post() {
        let store = InMemoryVoteStore::new();
        let vote = get_user_vote(&store, Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        assert_eq!(vote.vote_type, None);
    }
}
