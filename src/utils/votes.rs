use serde::Serialize;

use crate::models::{VoteEntry, VoteType};

/// Up/down counts over a set of raw vote tags. Tags other than the exact
/// strings `UPVOTE` and `DOWNVOTE` land in `ignored`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
    pub ignored: i64,
}

impl VoteTally {
    pub fn count<'a, I>(tags: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        tags.into_iter()
            .fold(Self::default(), |mut tally, tag| {
                match tag.parse::<VoteType>() {
                    Ok(VoteType::Upvote) => tally.upvotes += 1,
                    Ok(VoteType::Downvote) => tally.downvotes += 1,
                    Err(_) => tally.ignored += 1,
                }
                tally
            })
    }

    pub fn from_entries(entries: &[VoteEntry]) -> Self {
        Self::count(entries.iter().map(|entry| entry.vote_type.as_str()))
    }

    pub fn balance(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}

/// Any entity loaded together with its raw vote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Voted<T> {
    pub item: T,
    pub votes: Vec<VoteEntry>,
}

impl<T> Voted<T> {
    pub fn new(item: T, votes: Vec<VoteEntry>) -> Self {
        Self { item, votes }
    }

    pub fn tally(&self) -> VoteTally {
        VoteTally::from_entries(&self.votes)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Voted<U> {
        Voted {
            item: f(self.item),
            votes: self.votes,
        }
    }

    /// Consuming form of [`aggregate_votes`] for callers that own the row.
    pub fn into_counts(self) -> WithVoteCounts<T> {
        let tally = self.tally();
        WithVoteCounts {
            item: self.item,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
        }
    }
}

/// An entity with its vote collection replaced by counts. Serializes as the
/// entity's own fields plus `upvotes` and `downvotes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithVoteCounts<T> {
    #[serde(flatten)]
    pub item: T,
    pub upvotes: i64,
    pub downvotes: i64,
}

/// Drops the raw votes from `entity` and injects up/down counts. The input is
/// left untouched.
pub fn aggregate_votes<T: Clone>(entity: &Voted<T>) -> WithVoteCounts<T> {
    let tally = entity.tally();
    WithVoteCounts {
        item: entity.item.clone(),
        upvotes: tally.upvotes,
        downvotes: tally.downvotes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Card {
        id: u32,
        title: String,
    }

    fn card_with(tags: &[&str]) -> Voted<Card> {
        Voted::new(
            Card {
                id: 7,
                title: "Red flags".to_string(),
            },
            tags.iter().map(|tag| VoteEntry::new(*tag)).collect(),
        )
    }

    #[test]
    fn counts_up_and_down_votes() {
        let counted = aggregate_votes(&card_with(&["UPVOTE", "UPVOTE", "DOWNVOTE"]));

        assert_eq!(counted.upvotes, 2);
        assert_eq!(counted.downvotes, 1);
        assert_eq!(counted.item.title, "Red flags");
    }

    #[test]
    fn empty_collection_counts_zero() {
        let counted = aggregate_votes(&card_with(&[]));
        assert_eq!((counted.upvotes, counted.downvotes), (0, 0));
    }

    #[test]
    fn unknown_and_miscased_tags_are_ignored() {
        let tags = ["UPVOTE", "upvote", "Downvote", "LIKE", "", "DOWNVOTE"];
        let tally = VoteTally::count(tags);

        assert_eq!(tally.upvotes, 1);
        assert_eq!(tally.downvotes, 1);
        assert_eq!(tally.ignored, 4);
        assert_eq!(
            tally.upvotes + tally.downvotes + tally.ignored,
            tags.len() as i64
        );
    }

    #[test]
    fn input_is_not_mutated() {
        let original = card_with(&["UPVOTE", "DOWNVOTE", "BOGUS"]);
        let snapshot = original.clone();

        let _ = aggregate_votes(&original);

        assert_eq!(original, snapshot);
        assert_eq!(original.votes.len(), 3);
    }

    #[test]
    fn serializes_without_votes_field() {
        let value = serde_json::to_value(aggregate_votes(&card_with(&["UPVOTE"]))).unwrap();

        assert_eq!(
            value,
            json!({ "id": 7, "title": "Red flags", "upvotes": 1, "downvotes": 0 })
        );
    }

    #[test]
    fn consuming_form_matches_borrowing_form() {
        let voted = card_with(&["DOWNVOTE", "DOWNVOTE", "UPVOTE"]);
        assert_eq!(aggregate_votes(&voted), voted.clone().into_counts());
        assert_eq!(voted.tally().balance(), -1);
    }
}
