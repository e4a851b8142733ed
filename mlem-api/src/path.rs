use std::fmt;

use crate::{CommentId, Error};

/// Ancestry path of a comment, as sent by Lemmy: `0`, then the id of every
/// ancestor from the top-level comment down, then the comment's own id.
///
/// `"0.5.17"` is comment 17 replying to top-level comment 5.
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct CommentPath(pub String);

impl CommentPath {
    pub fn top_level(id: CommentId) -> CommentPath {
        CommentPath(format!("0.{}", id.0))
    }

    pub fn child(&self, id: CommentId) -> CommentPath {
        CommentPath(format!("{}.{}", self.0, id.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// All ids on the path, without the leading `0`
    pub fn segments(&self) -> Result<Vec<CommentId>, Error> {
        let malformed = || Error::MalformedPath(self.0.clone());
        let mut parts = self.0.split('.');
        if parts.next() != Some("0") {
            return Err(malformed());
        }
        let segments = parts
            .map(|p| p.parse::<i64>().map(CommentId))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed())?;
        if segments.is_empty() {
            return Err(malformed());
        }
        Ok(segments)
    }

    /// The immediate parent, `None` for a top-level comment
    pub fn parent(&self) -> Result<Option<CommentId>, Error> {
        let segments = self.segments()?;
        Ok(segments
            .len()
            .checked_sub(2)
            .map(|i| segments[i]))
    }

    /// 0 for a top-level comment
    pub fn depth(&self) -> Result<usize, Error> {
        Ok(self.segments()?.len() - 1)
    }
}

impl fmt::Display for CommentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
