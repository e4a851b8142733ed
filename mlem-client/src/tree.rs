use std::{
    collections::{hash_map, HashMap},
    str::FromStr,
};

use anyhow::anyhow;

use crate::{
    api::{CommentId, CommentView, SortKey},
    CommentNode, NodeId,
};

/// What to do with a comment whose parent is not part of the batch
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Show it as a top-level comment
    #[default]
    Promote,
    /// Drop it, along with all its replies
    Discard,
}

impl FromStr for OrphanPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<OrphanPolicy> {
        match &s.trim().to_ascii_lowercase() as &str {
            "promote" => Ok(OrphanPolicy::Promote),
            "discard" => Ok(OrphanPolicy::Discard),
            _ => Err(anyhow!("unknown orphan policy {s:?}")),
        }
    }
}

/// The comments of a post, as a forest.
///
/// Nodes live in a flat arena and refer to each other by `NodeId`, with an
/// index from comment id to node. Nodes are never removed, so a `NodeId`
/// stays valid until the tree is dropped.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentTree {
    pub(crate) nodes: Vec<CommentNode>,
    pub(crate) roots: Vec<NodeId>,
    pub(crate) index: HashMap<CommentId, NodeId>,

    /// Key the siblings are currently ordered by, if any
    pub(crate) sort: Option<SortKey>,
}

#[derive(Clone, Copy)]
enum Link {
    Root,
    Parent(usize),
    Orphan,
}

#[derive(Clone, Copy, PartialEq)]
enum Walk {
    Unvisited,
    InProgress,
    Kept,
    Dropped,
}

impl CommentTree {
    pub fn new() -> CommentTree {
        CommentTree::default()
    }

    pub fn build(views: impl IntoIterator<Item = CommentView>) -> CommentTree {
        CommentTree::build_with(views, OrphanPolicy::default())
    }

    /// Assembles a flat batch of comments into a tree, using each comment's
    /// path to find its parent.
    ///
    /// Siblings are in batch order: sort the result to get a meaningful order.
    /// This never fails: malformed paths and cycles are broken by making the
    /// comment top-level, and orphans are handled according to `policy`.
    pub fn build_with(
        views: impl IntoIterator<Item = CommentView>,
        policy: OrphanPolicy,
    ) -> CommentTree {
        let mut batch: Vec<CommentView> = Vec::new();
        let mut position: HashMap<CommentId, usize> = HashMap::new();
        for v in views {
            match position.entry(v.id()) {
                hash_map::Entry::Occupied(e) => {
                    tracing::warn!(
                        comment_id = v.id().0,
                        "duplicate comment in batch, keeping the last one"
                    );
                    batch[*e.get()] = v;
                }
                hash_map::Entry::Vacant(e) => {
                    e.insert(batch.len());
                    batch.push(v);
                }
            }
        }

        let mut links = batch
            .iter()
            .map(|v| link_for(v, &position, policy))
            .collect::<Vec<_>>();

        // Walk up from every comment until reaching something already decided,
        // a root, or an orphan. Reaching a comment of the current walk again
        // means a cycle, which is broken there.
        let mut state = vec![Walk::Unvisited; batch.len()];
        for start in 0..batch.len() {
            let mut chain = Vec::new();
            let mut cur = start;
            let outcome = loop {
                match state[cur] {
                    Walk::Kept => break Walk::Kept,
                    Walk::Dropped => break Walk::Dropped,
                    Walk::InProgress => {
                        tracing::warn!(
                            comment_id = batch[cur].id().0,
                            "comment ancestry forms a cycle, making it top-level"
                        );
                        links[cur] = Link::Root;
                        break Walk::Kept;
                    }
                    Walk::Unvisited => {
                        state[cur] = Walk::InProgress;
                        chain.push(cur);
                        match links[cur] {
                            Link::Root => break Walk::Kept,
                            Link::Orphan => break Walk::Dropped,
                            Link::Parent(p) => cur = p,
                        }
                    }
                }
            };
            for i in chain {
                state[i] = outcome;
            }
        }

        let mut tree = CommentTree::new();
        let mut ids = vec![None; batch.len()];
        let mut dropped = 0;
        for (i, v) in batch.into_iter().enumerate() {
            if state[i] != Walk::Kept {
                dropped += 1;
                continue;
            }
            let id = NodeId(tree.nodes.len());
            ids[i] = Some(id);
            tree.index.insert(v.id(), id);
            tree.nodes.push(CommentNode::new(v));
        }
        if dropped > 0 {
            tracing::debug!(dropped, "discarded orphaned comments");
        }

        for (i, link) in links.into_iter().enumerate() {
            let Some(id) = ids[i] else { continue };
            // A kept comment only ever has a kept parent
            match link {
                Link::Parent(p) => match ids[p] {
                    Some(parent) => {
                        tree.nodes[id.0].parent = Some(parent);
                        tree.nodes[parent.0].children.push(id);
                    }
                    None => tree.roots.push(id),
                },
                Link::Root | Link::Orphan => tree.roots.push(id),
            }
        }

        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort
    }

    pub fn roots(&self) -> impl Iterator<Item = &CommentNode> {
        self.roots.iter().map(|id| &self.nodes[id.0])
    }

    pub fn node(&self, id: NodeId) -> &CommentNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: CommentId) -> Option<&CommentNode> {
        self.index.get(&id).map(|n| &self.nodes[n.0])
    }

    pub fn contains(&self, id: CommentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn children<'a>(&'a self, node: &'a CommentNode) -> impl Iterator<Item = &'a CommentNode> {
        node.children.iter().map(|id| &self.nodes[id.0])
    }

    /// Every node, depth-first in display order, with its depth
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            stack: self.roots.iter().rev().map(|id| (0, *id)).collect(),
        }
    }

    /// The nodes to display: those with no collapsed ancestor
    pub fn visible(&self) -> impl Iterator<Item = (usize, &CommentNode)> {
        self.iter().filter(|(_, n)| !n.parent_collapsed)
    }

    /// Returns the new state, or `None` if the comment is not in the tree
    pub fn toggle_collapsed(&mut self, id: CommentId) -> Option<bool> {
        let node = *self.index.get(&id)?;
        let collapsed = !self.nodes[node.0].collapsed;
        self.set_node_collapsed(node, collapsed);
        Some(collapsed)
    }

    /// Returns `false` if the comment is not in the tree
    pub fn set_collapsed(&mut self, id: CommentId, collapsed: bool) -> bool {
        match self.index.get(&id) {
            Some(&node) => {
                self.set_node_collapsed(node, collapsed);
                true
            }
            None => false,
        }
    }

    fn set_node_collapsed(&mut self, node: NodeId, collapsed: bool) {
        self.nodes[node.0].collapsed = collapsed;
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let hidden = self.nodes[n.0].hides_children();
            let children = self.nodes[n.0].children.clone();
            for c in children {
                self.nodes[c.0].parent_collapsed = hidden;
                stack.push(c);
            }
        }
    }
}

fn link_for(v: &CommentView, position: &HashMap<CommentId, usize>, policy: OrphanPolicy) -> Link {
    match v.parent_id() {
        Ok(None) => Link::Root,
        Ok(Some(p)) if p == v.id() => {
            tracing::warn!(
                comment_id = v.id().0,
                "comment is its own parent, making it top-level"
            );
            Link::Root
        }
        Ok(Some(p)) => match (position.get(&p), policy) {
            (Some(&i), _) => Link::Parent(i),
            (None, OrphanPolicy::Promote) => {
                tracing::warn!(
                    comment_id = v.id().0,
                    parent_id = p.0,
                    "parent comment not loaded, making it top-level"
                );
                Link::Root
            }
            (None, OrphanPolicy::Discard) => Link::Orphan,
        },
        Err(err) => {
            tracing::warn!(comment_id = v.id().0, %err, "making comment with bad path top-level");
            Link::Root
        }
    }
}

pub struct Iter<'a> {
    tree: &'a CommentTree,
    stack: Vec<(usize, NodeId)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a CommentNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        let node = &self.tree.nodes[id.0];
        self.stack
            .extend(node.children.iter().rev().map(|c| (depth + 1, *c)));
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    #[test]
    fn simple_tree() {
        let tree = CommentTree::build(vec![
            view(1, None, 2, 5),
            view(2, Some(1), 1, 9),
            view(3, None, 3, 1),
            view(4, Some(2), 4, 0),
        ]);
        assert_eq!(tree.len(), 4);
        assert_eq!(shape(&tree), vec![(0, 1), (1, 2), (2, 4), (0, 3)]);
        assert_eq!(tree.sort_key(), None);
        let two = tree.get(CommentId(2)).unwrap();
        assert_eq!(tree.node(two.parent().unwrap()).id(), CommentId(1));
    }

    #[test]
    fn batch_order_is_irrelevant_to_parenting() {
        let tree = CommentTree::build(vec![
            view(4, Some(2), 4, 0),
            view(2, Some(1), 1, 9),
            view(1, None, 2, 5),
        ]);
        assert_eq!(shape(&tree), vec![(0, 1), (1, 2), (2, 4)]);
    }

    #[test]
    fn deep_paths_use_the_immediate_parent() {
        let tree = CommentTree::build(vec![
            view(1, None, 0, 0),
            with_path(2, "0.1.2"),
            with_path(3, "0.1.2.3"),
        ]);
        assert_eq!(shape(&tree), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn orphans_are_promoted() {
        let tree = CommentTree::build(vec![
            view(1, None, 0, 0),
            view(2, Some(99), 0, 0),
            view(3, Some(2), 0, 0),
        ]);
        assert_eq!(tree.len(), 3);
        assert_eq!(shape(&tree), vec![(0, 1), (0, 2), (1, 3)]);
    }

    #[test]
    fn orphans_can_be_discarded() {
        let tree = CommentTree::build_with(
            vec![
                view(1, None, 0, 0),
                view(2, Some(99), 0, 0),
                view(3, Some(2), 0, 0),
                view(4, Some(1), 0, 0),
            ],
            OrphanPolicy::Discard,
        );
        assert_eq!(shape(&tree), vec![(0, 1), (1, 4)]);
        assert!(!tree.contains(CommentId(2)));
        assert!(!tree.contains(CommentId(3)));
    }

    #[test]
    fn malformed_paths_are_top_level() {
        let tree = CommentTree::build(vec![
            view(1, None, 0, 0),
            with_path(2, "1.2"),
            with_path(3, "0.x.3"),
            with_path(4, ""),
        ]);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.roots().count(), 4);
    }

    #[test]
    fn self_parent_is_top_level() {
        let tree = CommentTree::build(vec![with_path(7, "0.7.7")]);
        assert_eq!(shape(&tree), vec![(0, 7)]);
    }

    #[test]
    fn cycles_are_broken() {
        let tree = CommentTree::build(vec![
            view(1, Some(3), 0, 0),
            view(2, Some(1), 0, 0),
            view(3, Some(2), 0, 0),
            view(4, Some(3), 0, 0),
        ]);
        assert_eq!(tree.len(), 4);
        // walking up from 1 goes 1 -> 3 -> 2 -> 1, so 1 becomes the root
        assert_eq!(shape(&tree), vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn duplicates_keep_the_last_record() {
        let tree = CommentTree::build(vec![
            view(1, None, 0, 5),
            view(2, None, 0, 0),
            view(1, None, 0, 8),
        ]);
        assert_eq!(shape(&tree), vec![(0, 1), (0, 2)]);
        assert_eq!(tree.get(CommentId(1)).unwrap().view().score(), 8);
    }

    #[test]
    fn empty() {
        let tree = CommentTree::build(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.iter().count(), 0);
        assert_eq!(tree, CommentTree::new());
    }

    #[test]
    fn collapsing() {
        let mut tree = CommentTree::build(vec![
            view(1, None, 0, 0),
            view(2, Some(1), 0, 0),
            view(3, Some(2), 0, 0),
            view(4, None, 0, 0),
        ]);
        assert_eq!(tree.toggle_collapsed(CommentId(1)), Some(true));
        assert!(tree.get(CommentId(1)).unwrap().collapsed());
        assert!(!tree.get(CommentId(1)).unwrap().parent_collapsed());
        assert!(tree.get(CommentId(2)).unwrap().parent_collapsed());
        assert!(tree.get(CommentId(3)).unwrap().parent_collapsed());
        assert!(!tree.get(CommentId(4)).unwrap().parent_collapsed());
        let visible = tree.visible().map(|(_, n)| n.id().0).collect::<Vec<_>>();
        assert_eq!(visible, vec![1, 4]);

        // collapsing inside a collapsed subtree is remembered once expanded
        assert!(tree.set_collapsed(CommentId(2), true));
        assert_eq!(tree.toggle_collapsed(CommentId(1)), Some(false));
        assert!(!tree.get(CommentId(2)).unwrap().parent_collapsed());
        assert!(tree.get(CommentId(3)).unwrap().parent_collapsed());
        let visible = tree.visible().map(|(_, n)| n.id().0).collect::<Vec<_>>();
        assert_eq!(visible, vec![1, 2, 4]);

        assert_eq!(tree.toggle_collapsed(CommentId(42)), None);
        assert!(!tree.set_collapsed(CommentId(42), true));
    }

    #[test]
    fn orphan_policy_parsing() {
        assert_eq!("promote".parse::<OrphanPolicy>().unwrap(), OrphanPolicy::Promote);
        assert_eq!(" Discard".parse::<OrphanPolicy>().unwrap(), OrphanPolicy::Discard);
        assert!("keep".parse::<OrphanPolicy>().is_err());
    }
}
