use crate::api::{CommentId, CommentView};

/// Position of a node in its tree's arena. Only meaningful for the tree that
/// handed it out, and stable for the whole life of that tree.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(pub(crate) usize);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub(crate) view: CommentView,
    pub(crate) parent: Option<NodeId>,

    /// Replies, in display order
    pub(crate) children: Vec<NodeId>,

    /// Collapsed by the user
    pub(crate) collapsed: bool,

    /// Some ancestor is collapsed
    pub(crate) parent_collapsed: bool,
}

impl CommentNode {
    pub(crate) fn new(view: CommentView) -> CommentNode {
        CommentNode {
            view,
            parent: None,
            children: Vec::new(),
            collapsed: false,
            parent_collapsed: false,
        }
    }

    pub fn id(&self) -> CommentId {
        self.view.id()
    }

    pub fn view(&self) -> &CommentView {
        &self.view
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn parent_collapsed(&self) -> bool {
        self.parent_collapsed
    }

    /// Whether replies to this node are hidden
    pub(crate) fn hides_children(&self) -> bool {
        self.collapsed || self.parent_collapsed
    }
}
