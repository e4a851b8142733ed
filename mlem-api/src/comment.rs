use crate::{CommentPath, Error, ScoringOperation, Time};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct PostId(pub i64);

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct PersonId(pub i64);

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub creator_id: PersonId,
    pub post_id: PostId,
    pub content: String,

    /// Ancestry of this comment, ending with its own id
    pub path: CommentPath,

    #[serde(with = "crate::time")]
    pub published: Time,
    #[serde(default, with = "crate::time::option")]
    pub updated: Option<Time>,

    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub distinguished: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentAggregates {
    pub score: i64,
    pub upvotes: i64,
    pub downvotes: i64,

    /// Number of replies in the whole subtree, as counted by the server
    pub child_count: i64,
}

/// One comment as returned by the API, with everything needed to display it.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentView {
    pub comment: Comment,
    pub creator: Person,
    pub counts: CommentAggregates,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub my_vote: Option<ScoringOperation>,
}

impl CommentView {
    pub fn id(&self) -> CommentId {
        self.comment.id
    }

    pub fn post_id(&self) -> PostId {
        self.comment.post_id
    }

    /// `Ok(None)` for a top-level comment
    pub fn parent_id(&self) -> Result<Option<CommentId>, Error> {
        self.comment.path.parent()
    }

    pub fn published(&self) -> Time {
        self.comment.published
    }

    pub fn score(&self) -> i64 {
        self.counts.score
    }

    pub fn child_count(&self) -> i64 {
        self.counts.child_count
    }
}
