use chrono::Utc;

mod comment;
pub use comment::{Comment, CommentAggregates, CommentId, CommentView, Person, PersonId, PostId};

mod error;
pub use error::Error;

mod path;
pub use path::CommentPath;

mod sort;
pub use sort::SortKey;

mod report;
pub use report::{CommentReply, CommentReplyId, CommentReport, CommentReportId, MAX_REPORT_REASON_LEN};

mod source;
pub use source::{CommentSource, GetCommentsResponse, NewComment};

pub mod time;

mod vote;
pub use vote::ScoringOperation;

pub type Time = chrono::DateTime<Utc>;

// The `validate` functions are there to reject input the server would
// refuse anyway, before it goes out on the wire. Anything that passes
// `validate` must be accepted by the mock server too.
pub(crate) fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(String::from(s)));
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), Error> {
    if content.trim().is_empty() {
        return Err(Error::EmptyComment);
    }
    validate_string(content)
}

pub fn validate_report_reason(reason: &str) -> Result<(), Error> {
    if reason.trim().is_empty() {
        return Err(Error::ReportReasonRequired);
    }
    if reason.chars().count() > MAX_REPORT_REASON_LEN {
        return Err(Error::ReportTooLong);
    }
    validate_string(reason)
}
