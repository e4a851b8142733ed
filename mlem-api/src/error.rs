use anyhow::{anyhow, Context};
use serde_json::json;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Couldn't find comment")]
    CouldntFindComment,

    #[error("Couldn't find post")]
    CouldntFindPost,

    #[error("Rate limited")]
    RateLimited,

    #[error("Comment is empty")]
    EmptyComment,

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Malformed comment path {0:?}")]
    MalformedPath(String),

    #[error("Invalid vote value {0}")]
    InvalidVote(i8),

    #[error("Unknown comment sort {0:?}")]
    UnknownSort(String),

    #[error("Report reason required")]
    ReportReasonRequired,

    #[error("Report reason too long")]
    ReportTooLong,

    #[error("Couldn't update comment reply")]
    CouldntUpdateCommentReply,
}

impl Error {
    /// Lemmy-style `{"error": "<tag>"}` body
    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(tag) => json!({ "error": tag }),
            Error::NotLoggedIn => json!({ "error": "not_logged_in" }),
            Error::CouldntFindComment => json!({ "error": "couldnt_find_comment" }),
            Error::CouldntFindPost => json!({ "error": "couldnt_find_post" }),
            Error::RateLimited => json!({ "error": "rate_limit_error" }),
            Error::EmptyComment => json!({ "error": "empty_comment" }),
            Error::NullByteInString(s) => json!({
                "error": "null_byte",
                "string": s,
            }),
            Error::MalformedPath(p) => json!({
                "error": "malformed_path",
                "path": p,
            }),
            Error::InvalidVote(v) => json!({
                "error": "invalid_vote",
                "vote": v,
            }),
            Error::UnknownSort(s) => json!({
                "error": "unknown_sort",
                "sort": s,
            }),
            Error::ReportReasonRequired => json!({ "error": "report_reason_required" }),
            Error::ReportTooLong => json!({ "error": "report_too_long" }),
            Error::CouldntUpdateCommentReply => json!({ "error": "couldnt_update_comment_reply" }),
        })
        .expect("serializing json value")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let string_field = |field: &str| {
            data.get(field)
                .and_then(|s| s.as_str())
                .map(String::from)
                .ok_or_else(|| anyhow!("error has no string field {field:?}"))
        };
        let tag = string_field("error")?;
        Ok(match &tag as &str {
            "not_logged_in" => Error::NotLoggedIn,
            "couldnt_find_comment" => Error::CouldntFindComment,
            "couldnt_find_post" => Error::CouldntFindPost,
            "rate_limit_error" => Error::RateLimited,
            "empty_comment" => Error::EmptyComment,
            "null_byte" => Error::NullByteInString(string_field("string")?),
            "malformed_path" => Error::MalformedPath(string_field("path")?),
            "invalid_vote" => Error::InvalidVote(
                data.get("vote")
                    .and_then(|v| v.as_i64())
                    .and_then(|v| i8::try_from(v).ok())
                    .ok_or_else(|| anyhow!("invalid_vote error without a proper vote"))?,
            ),
            "unknown_sort" => Error::UnknownSort(string_field("sort")?),
            "report_reason_required" => Error::ReportReasonRequired,
            "report_too_long" => Error::ReportTooLong,
            "couldnt_update_comment_reply" => Error::CouldntUpdateCommentReply,
            _ => Error::Unknown(tag),
        })
    }
}
