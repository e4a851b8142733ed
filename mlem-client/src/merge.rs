use std::cmp::Ordering;

use crate::{api::CommentView, CommentNode, CommentTree, NodeId, SortKeyExt};

impl CommentTree {
    /// Replaces the view of an already-loaded comment, keeping its place in
    /// the tree and its replies. Returns `false` and does nothing if the
    /// comment is not in the tree.
    pub fn merge_update(&mut self, view: CommentView) -> bool {
        match self.index.get(&view.id()) {
            Some(node) => {
                self.nodes[node.0].view = view;
                true
            }
            None => {
                tracing::debug!(comment_id = view.id().0, "ignoring update for unknown comment");
                false
            }
        }
    }

    /// Adds a single comment under its parent, at the place the current sort
    /// would put it.
    ///
    /// A comment that is already in the tree is updated instead. Returns
    /// `false` and leaves the tree unchanged if the parent is not loaded: the
    /// next full reload will show it.
    pub fn merge_insert(&mut self, view: CommentView) -> bool {
        if self.index.contains_key(&view.id()) {
            return self.merge_update(view);
        }
        let parent = match view.parent_id() {
            Ok(None) => None,
            Ok(Some(p)) => match self.index.get(&p) {
                Some(&node) => Some(node),
                None => {
                    tracing::debug!(
                        comment_id = view.id().0,
                        parent_id = p.0,
                        "dropping reply to a comment that is not loaded"
                    );
                    return false;
                }
            },
            Err(err) => {
                tracing::debug!(comment_id = view.id().0, %err, "dropping comment with bad path");
                return false;
            }
        };

        let at = self.insertion_point(parent, &view);
        let id = NodeId(self.nodes.len());
        let mut node = CommentNode::new(view);
        node.parent = parent;
        node.parent_collapsed = parent
            .map(|p| self.nodes[p.0].hides_children())
            .unwrap_or(false);
        self.index.insert(node.id(), id);
        self.nodes.push(node);
        let siblings = match parent {
            Some(p) => &mut self.nodes[p.0].children,
            None => &mut self.roots,
        };
        siblings.insert(at, id);
        true
    }

    // After all siblings that compare lower or equal, which is where a stable
    // re-sort would leave a comment appended to the batch
    fn insertion_point(&self, parent: Option<NodeId>, view: &CommentView) -> usize {
        let siblings = match parent {
            Some(p) => &self.nodes[p.0].children,
            None => &self.roots,
        };
        match self.sort {
            None => siblings.len(),
            Some(key) => siblings.partition_point(|s| {
                key.compare(&self.nodes[s.0].view, view) != Ordering::Greater
            }),
        }
    }
}
