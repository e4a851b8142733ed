use std::collections::{hash_map, HashMap};

use parking_lot::Mutex;

use crate::{
    api::{
        validate_content, CommentId, CommentReport, CommentSource, CommentView, Error, NewComment,
        PostId, ScoringOperation, SortKey,
    },
    CommentTree, OrphanPolicy, Settings,
};

/// Issued when a reload starts; a reload only lands if no later-issued one
/// landed before it.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct ReloadTicket(u64);

/// A change shown ahead of the server's answer
#[derive(Clone, Copy, Debug)]
enum Change {
    Vote(ScoringOperation),
    Save(bool),
}

impl Change {
    fn apply(self, v: &mut CommentView) {
        match self {
            Change::Vote(op) => v.apply_vote(op),
            Change::Save(saved) => v.saved = saved,
        }
    }
}

/// A comment with changes still waiting for the server
struct Pending {
    /// Last state of the comment the server vouched for
    confirmed: CommentView,
    changes: Vec<(u64, Change)>,
}

impl Pending {
    fn view(&self) -> CommentView {
        let mut v = self.confirmed.clone();
        for (_, c) in &self.changes {
            c.apply(&mut v);
        }
        v
    }
}

struct State {
    tree: CommentTree,
    sort: SortKey,
    policy: OrphanPolicy,
    issued: u64,
    applied: u64,
    next_change: u64,
    pending: HashMap<CommentId, Pending>,
}

impl State {
    fn begin_change(&mut self, id: CommentId, change: Change) -> Option<u64> {
        let current = self.tree.get(id)?.view().clone();
        self.next_change += 1;
        let seq = self.next_change;
        let pending = self.pending.entry(id).or_insert_with(|| Pending {
            confirmed: current,
            changes: Vec::new(),
        });
        pending.changes.push((seq, change));
        let view = pending.view();
        self.tree.merge_update(view);
        Some(seq)
    }

    /// Forgets change `seq`, showing the confirmed view with what is left
    fn end_change(&mut self, id: CommentId, seq: u64) {
        if let hash_map::Entry::Occupied(mut e) = self.pending.entry(id) {
            e.get_mut().changes.retain(|(s, _)| *s != seq);
            let view = e.get().view();
            if e.get().changes.is_empty() {
                e.remove();
            }
            self.tree.merge_update(view);
        }
    }

    /// Takes `view` as the server's state of an already-loaded comment
    fn confirm(&mut self, view: CommentView) -> bool {
        match self.pending.get_mut(&view.id()) {
            Some(p) => {
                p.confirmed = view;
                let shown = p.view();
                self.tree.merge_update(shown)
            }
            None => self.tree.merge_update(view),
        }
    }

    /// Puts pending changes back on top of a freshly loaded tree
    fn replay_pending(&mut self) {
        let State { tree, pending, .. } = self;
        for (id, p) in pending.iter_mut() {
            if let Some(n) = tree.get(*id) {
                p.confirmed = n.view().clone();
                tree.merge_update(p.view());
            }
        }
    }
}

/// The comment tree of one post, for the lifetime of the view showing it.
///
/// All changes to the tree go through the same lock, which is never held
/// across a call to the server. Votes and saves are shown right away, on top
/// of the last state the server confirmed for the comment. Once the server
/// answers, its view becomes the confirmed one; if it refuses, the change is
/// dropped and the comment shows the confirmed state with whatever other
/// changes are still in flight.
pub struct CommentTracker {
    post_id: PostId,
    state: Mutex<State>,
}

impl CommentTracker {
    pub fn new(post_id: PostId, settings: &Settings) -> CommentTracker {
        CommentTracker {
            post_id,
            state: Mutex::new(State {
                tree: CommentTree::new(),
                sort: settings.default_sort,
                policy: settings.orphan_policy,
                issued: 0,
                applied: 0,
                next_change: 0,
                pending: HashMap::new(),
            }),
        }
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn sort_key(&self) -> SortKey {
        self.state.lock().sort
    }

    pub fn snapshot(&self) -> CommentTree {
        self.state.lock().tree.clone()
    }

    pub fn with_tree<R>(&self, f: impl FnOnce(&CommentTree) -> R) -> R {
        f(&self.state.lock().tree)
    }

    pub fn set_sort(&self, key: SortKey) {
        let mut state = self.state.lock();
        state.sort = key;
        state.tree.sort_by(key);
    }

    pub fn toggle_collapsed(&self, id: CommentId) -> Option<bool> {
        self.state.lock().tree.toggle_collapsed(id)
    }

    /// Merges the server's view of an already-loaded comment
    pub fn apply_update(&self, view: CommentView) -> bool {
        self.state.lock().confirm(view)
    }

    /// Merges a comment seen from the server, inserting it if it is new.
    /// Comments of other posts are ignored.
    pub fn apply_insert(&self, view: CommentView) -> bool {
        if view.post_id() != self.post_id {
            tracing::debug!(
                comment_id = view.id().0,
                post_id = view.post_id().0,
                "ignoring comment of another post"
            );
            return false;
        }
        let mut state = self.state.lock();
        match state.tree.contains(view.id()) {
            true => state.confirm(view),
            false => state.tree.merge_insert(view),
        }
    }

    pub fn begin_reload(&self) -> ReloadTicket {
        let mut state = self.state.lock();
        state.issued += 1;
        ReloadTicket(state.issued)
    }

    /// Replaces the whole tree with one built from `views`, unless a reload
    /// issued after `ticket` already landed. Returns whether it was applied.
    pub fn finish_reload(&self, ticket: ReloadTicket, views: Vec<CommentView>) -> bool {
        let policy = self.state.lock().policy;
        let tree = CommentTree::build_with(views, policy);
        let mut state = self.state.lock();
        if ticket.0 <= state.applied {
            tracing::debug!(
                ticket = ticket.0,
                applied = state.applied,
                "discarding superseded reload"
            );
            return false;
        }
        state.applied = ticket.0;
        let sort = state.sort;
        state.tree = tree.sorted(sort);
        state.replay_pending();
        true
    }

    pub async fn reload<S: CommentSource + ?Sized>(&self, source: &mut S) -> Result<bool, Error> {
        let ticket = self.begin_reload();
        let views = source.load_comments(self.post_id).await?;
        Ok(self.finish_reload(ticket, views))
    }

    /// Fetches one comment again and merges it in, as a reply if it is not
    /// loaded yet
    pub async fn refresh_comment<S: CommentSource + ?Sized>(
        &self,
        source: &mut S,
        id: CommentId,
    ) -> Result<CommentView, Error> {
        let view = source.load_comment(id).await?;
        self.apply_insert(view.clone());
        Ok(view)
    }

    pub async fn vote<S: CommentSource + ?Sized>(
        &self,
        source: &mut S,
        id: CommentId,
        op: ScoringOperation,
    ) -> Result<CommentView, Error> {
        let seq = self.state.lock().begin_change(id, Change::Vote(op));
        let res = source.apply_comment_score(id, op).await;
        self.reconcile(id, seq, res)
    }

    /// Upvotes, or takes the upvote back if there already is one
    pub async fn upvote<S: CommentSource + ?Sized>(
        &self,
        source: &mut S,
        id: CommentId,
    ) -> Result<CommentView, Error> {
        let op = ScoringOperation::toggled(self.current_vote(id), ScoringOperation::Upvote);
        self.vote(source, id, op).await
    }

    /// Downvotes, or takes the downvote back if there already is one
    pub async fn downvote<S: CommentSource + ?Sized>(
        &self,
        source: &mut S,
        id: CommentId,
    ) -> Result<CommentView, Error> {
        let op = ScoringOperation::toggled(self.current_vote(id), ScoringOperation::Downvote);
        self.vote(source, id, op).await
    }

    pub async fn toggle_save<S: CommentSource + ?Sized>(
        &self,
        source: &mut S,
        id: CommentId,
    ) -> Result<CommentView, Error> {
        let save = !self.with_tree(|t| t.get(id).map(|n| n.view().saved).unwrap_or(false));
        let seq = self.state.lock().begin_change(id, Change::Save(save));
        let res = source.save_comment(id, save).await;
        self.reconcile(id, seq, res)
    }

    /// Posts a reply to `parent`, or a top-level comment if `None`
    pub async fn reply<S: CommentSource + ?Sized>(
        &self,
        source: &mut S,
        parent: Option<CommentId>,
        content: String,
    ) -> Result<CommentView, Error> {
        let new = NewComment {
            content,
            parent_id: parent,
            post_id: self.post_id,
            language_id: None,
        };
        new.validate()?;
        let view = source.create_comment(new).await?;
        self.apply_insert(view.clone());
        Ok(view)
    }

    pub async fn edit<S: CommentSource + ?Sized>(
        &self,
        source: &mut S,
        id: CommentId,
        content: String,
    ) -> Result<CommentView, Error> {
        validate_content(&content)?;
        let view = source.edit_comment(id, content).await?;
        self.apply_update(view.clone());
        Ok(view)
    }

    pub async fn delete<S: CommentSource + ?Sized>(
        &self,
        source: &mut S,
        id: CommentId,
        deleted: bool,
    ) -> Result<CommentView, Error> {
        let view = source.delete_comment(id, deleted).await?;
        self.apply_update(view.clone());
        Ok(view)
    }

    /// Reports a comment to the moderators. The tree is left as is.
    pub async fn report<S: CommentSource + ?Sized>(
        &self,
        source: &mut S,
        id: CommentId,
        reason: String,
    ) -> Result<CommentReport, Error> {
        crate::api::validate_report_reason(&reason)?;
        source.report_comment(id, reason).await
    }

    fn current_vote(&self, id: CommentId) -> Option<ScoringOperation> {
        self.with_tree(|t| t.get(id).and_then(|n| n.view().my_vote))
    }

    fn reconcile(
        &self,
        id: CommentId,
        seq: Option<u64>,
        res: Result<CommentView, Error>,
    ) -> Result<CommentView, Error> {
        let mut state = self.state.lock();
        if let Some(seq) = seq {
            state.end_change(id, seq);
        }
        match res {
            Ok(view) => {
                state.confirm(view.clone());
                Ok(view)
            }
            Err(err) => {
                if seq.is_some() {
                    tracing::debug!(comment_id = id.0, %err, "server refused optimistic change");
                }
                Err(err)
            }
        }
    }
}
