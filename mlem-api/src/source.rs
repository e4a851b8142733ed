use async_trait::async_trait;

use crate::{
    CommentId, CommentReply, CommentReplyId, CommentReport, CommentView, Error, PostId,
    ScoringOperation,
};

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct GetCommentsResponse {
    pub comments: Vec<CommentView>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub content: String,
    pub parent_id: Option<CommentId>,
    pub post_id: PostId,
    pub language_id: Option<i64>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.content)
    }
}

/// Where comments come from. Every mutation returns the comment as the server
/// now sees it, so it can be merged back into a local tree.
#[async_trait]
pub trait CommentSource: Send {
    async fn load_comments(&mut self, post: PostId) -> Result<Vec<CommentView>, Error>;
    async fn load_comment(&mut self, id: CommentId) -> Result<CommentView, Error>;
    async fn create_comment(&mut self, new: NewComment) -> Result<CommentView, Error>;
    async fn apply_comment_score(
        &mut self,
        id: CommentId,
        vote: ScoringOperation,
    ) -> Result<CommentView, Error>;
    async fn save_comment(&mut self, id: CommentId, save: bool) -> Result<CommentView, Error>;
    async fn delete_comment(&mut self, id: CommentId, deleted: bool)
        -> Result<CommentView, Error>;
    async fn edit_comment(&mut self, id: CommentId, content: String)
        -> Result<CommentView, Error>;
    async fn report_comment(&mut self, id: CommentId, reason: String)
        -> Result<CommentReport, Error>;
    async fn mark_comment_reply_read(
        &mut self,
        id: CommentReplyId,
        read: bool,
    ) -> Result<CommentReply, Error>;
}
