use std::collections::{BTreeMap, BTreeSet, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use mlem_api::{
    validate_content, validate_report_reason, Comment, CommentAggregates, CommentId, CommentPath,
    CommentReply, CommentReplyId, CommentReport, CommentReportId, CommentSource, CommentView,
    Error, NewComment, Person, PersonId, PostId, ScoringOperation,
};
use tokio::sync::mpsc;

/// In-memory stand-in for a Lemmy instance, seen by a single logged-in user
pub struct MockServer {
    me: Person,
    next_id: i64,
    posts: BTreeSet<PostId>,
    comments: BTreeMap<CommentId, CommentView>,
    replies: BTreeMap<CommentReplyId, CommentReply>,
    reports: Vec<CommentReport>,
    feeds: Vec<mpsc::UnboundedSender<CommentView>>,
    failures: VecDeque<Error>,
}

impl MockServer {
    pub fn new(me: Person) -> MockServer {
        MockServer {
            me,
            next_id: 1,
            posts: BTreeSet::new(),
            comments: BTreeMap::new(),
            replies: BTreeMap::new(),
            reports: Vec::new(),
            feeds: Vec::new(),
            failures: VecDeque::new(),
        }
    }

    pub fn add_post(&mut self, post: PostId) {
        self.posts.insert(post);
    }

    /// Stores comments as-is, paths included, whether they make sense or not
    pub fn seed(&mut self, views: Vec<CommentView>) {
        for v in views {
            self.posts.insert(v.post_id());
            self.next_id = self.next_id.max(v.id().0 + 1);
            self.comments.insert(v.id(), v);
        }
    }

    /// Makes the next call fail with `err`, after the ones already queued
    pub fn test_fail_next(&mut self, err: Error) {
        self.failures.push_back(err);
    }

    pub fn test_num_comments(&self) -> usize {
        self.comments.len()
    }

    pub fn test_get(&self, id: CommentId) -> Option<&CommentView> {
        self.comments.get(&id)
    }

    pub fn test_num_reports(&self) -> usize {
        self.reports.len()
    }

    /// Replies notified to `recipient`, oldest first
    pub fn test_inbox(&self, recipient: PersonId) -> Vec<&CommentReply> {
        self.replies
            .values()
            .filter(|r| r.recipient_id == recipient)
            .collect()
    }

    /// Puts `comment` in the logged-in user's inbox, as if it replied to them
    pub fn seed_reply(&mut self, comment: CommentId) -> CommentReplyId {
        let me = self.me.id;
        self.notify(me, comment)
    }

    fn notify(&mut self, recipient: PersonId, comment: CommentId) -> CommentReplyId {
        let id = CommentReplyId(self.replies.len() as i64 + 1);
        self.replies.insert(
            id,
            CommentReply {
                id,
                recipient_id: recipient,
                comment_id: comment,
                read: false,
                published: Utc::now(),
            },
        );
        id
    }

    /// Every comment created or changed from now on
    pub fn comment_feed(&mut self) -> mpsc::UnboundedReceiver<CommentView> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.feeds.push(sender);
        receiver
    }

    fn relay(&mut self, v: &CommentView) {
        self.feeds.retain_mut(|f| matches!(f.send(v.clone()), Ok(())));
    }

    fn check_failure(&mut self) -> Result<(), Error> {
        match self.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn modify(
        &mut self,
        id: CommentId,
        f: impl FnOnce(&mut CommentView),
    ) -> Result<CommentView, Error> {
        self.check_failure()?;
        let v = self.comments.get_mut(&id).ok_or(Error::CouldntFindComment)?;
        f(v);
        let v = v.clone();
        self.relay(&v);
        Ok(v)
    }
}

#[async_trait]
impl CommentSource for MockServer {
    async fn load_comments(&mut self, post: PostId) -> Result<Vec<CommentView>, Error> {
        self.check_failure()?;
        if !self.posts.contains(&post) {
            return Err(Error::CouldntFindPost);
        }
        Ok(self
            .comments
            .values()
            .filter(|v| v.post_id() == post)
            .cloned()
            .collect())
    }

    async fn load_comment(&mut self, id: CommentId) -> Result<CommentView, Error> {
        self.check_failure()?;
        self.comments.get(&id).cloned().ok_or(Error::CouldntFindComment)
    }

    async fn create_comment(&mut self, new: NewComment) -> Result<CommentView, Error> {
        self.check_failure()?;
        new.validate()?;
        if !self.posts.contains(&new.post_id) {
            return Err(Error::CouldntFindPost);
        }
        let id = CommentId(self.next_id);
        let (path, parent_author) = match new.parent_id {
            None => (CommentPath::top_level(id), None),
            Some(p) => {
                let parent = self
                    .comments
                    .get(&p)
                    .filter(|v| v.post_id() == new.post_id)
                    .ok_or(Error::CouldntFindComment)?;
                (parent.comment.path.child(id), Some(parent.comment.creator_id))
            }
        };
        let ancestors = path.segments()?;
        self.next_id += 1;

        // Every ancestor gets one more reply in its subtree
        for ancestor in ancestors.into_iter().filter(|a| *a != id) {
            if let Some(a) = self.comments.get_mut(&ancestor) {
                a.counts.child_count += 1;
            }
        }

        // Lemmy upvotes your own comments on creation
        let view = CommentView {
            comment: Comment {
                id,
                creator_id: self.me.id,
                post_id: new.post_id,
                content: new.content,
                path,
                published: Utc::now(),
                updated: None,
                deleted: false,
                removed: false,
                distinguished: false,
            },
            creator: self.me.clone(),
            counts: CommentAggregates::default(),
            saved: false,
            my_vote: None,
        }
        .with_vote(ScoringOperation::Upvote);
        self.comments.insert(id, view.clone());
        if let Some(author) = parent_author.filter(|a| *a != self.me.id) {
            self.notify(author, id);
        }
        self.relay(&view);
        Ok(view)
    }

    async fn apply_comment_score(
        &mut self,
        id: CommentId,
        vote: ScoringOperation,
    ) -> Result<CommentView, Error> {
        self.modify(id, |v| v.apply_vote(vote))
    }

    async fn save_comment(&mut self, id: CommentId, save: bool) -> Result<CommentView, Error> {
        self.modify(id, |v| v.saved = save)
    }

    async fn delete_comment(
        &mut self,
        id: CommentId,
        deleted: bool,
    ) -> Result<CommentView, Error> {
        self.modify(id, |v| v.comment.deleted = deleted)
    }

    async fn edit_comment(
        &mut self,
        id: CommentId,
        content: String,
    ) -> Result<CommentView, Error> {
        validate_content(&content)?;
        self.modify(id, |v| {
            v.comment.content = content;
            v.comment.updated = Some(Utc::now());
        })
    }

    async fn report_comment(
        &mut self,
        id: CommentId,
        reason: String,
    ) -> Result<CommentReport, Error> {
        self.check_failure()?;
        validate_report_reason(&reason)?;
        let comment = self.comments.get(&id).ok_or(Error::CouldntFindComment)?;
        let report = CommentReport {
            id: CommentReportId(self.reports.len() as i64 + 1),
            creator_id: self.me.id,
            comment_id: id,
            original_comment_text: comment.comment.content.clone(),
            reason,
            resolved: false,
            published: Utc::now(),
        };
        self.reports.push(report.clone());
        Ok(report)
    }

    async fn mark_comment_reply_read(
        &mut self,
        id: CommentReplyId,
        read: bool,
    ) -> Result<CommentReply, Error> {
        self.check_failure()?;
        let me = self.me.id;
        let reply = self
            .replies
            .get_mut(&id)
            .filter(|r| r.recipient_id == me)
            .ok_or(Error::CouldntUpdateCommentReply)?;
        reply.read = read;
        Ok(reply.clone())
    }
}
