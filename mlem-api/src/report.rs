use crate::{CommentId, PersonId, Time};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentReportId(pub i64);

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentReplyId(pub i64);

/// Longest report reason the server accepts, in characters
pub const MAX_REPORT_REASON_LEN: usize = 1000;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentReport {
    pub id: CommentReportId,
    pub creator_id: PersonId,
    pub comment_id: CommentId,

    /// Content of the comment when it was reported
    pub original_comment_text: String,
    pub reason: String,
    #[serde(default)]
    pub resolved: bool,
    #[serde(with = "crate::time")]
    pub published: Time,
}

/// Inbox entry telling `recipient_id` that `comment_id` replied to them
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentReply {
    pub id: CommentReplyId,
    pub recipient_id: PersonId,
    pub comment_id: CommentId,
    #[serde(default)]
    pub read: bool,
    #[serde(with = "crate::time")]
    pub published: Time,
}
