use std::cmp::Ordering;

use crate::{
    api::{CommentView, SortKey},
    CommentTree,
};

pub trait SortKeyExt {
    fn compare(&self, a: &CommentView, b: &CommentView) -> Ordering;
    fn sort(&self, tree: &mut CommentTree);
}

impl SortKeyExt for SortKey {
    fn compare(&self, a: &CommentView, b: &CommentView) -> Ordering {
        match self {
            SortKey::New => b.published().cmp(&a.published()),
            SortKey::Old => a.published().cmp(&b.published()),
            SortKey::Top => b.score().cmp(&a.score()),
            SortKey::Hot => b.child_count().cmp(&a.child_count()),
        }
    }

    fn sort(&self, tree: &mut CommentTree) {
        tree.sort_by(*self)
    }
}

impl CommentTree {
    /// Orders the roots, then the replies of every comment, by `key`.
    ///
    /// The sort is stable: comments comparing equal keep their relative order.
    /// Parent/child relationships are untouched.
    pub fn sort_by(&mut self, key: SortKey) {
        self.roots
            .sort_by(|a, b| key.compare(&self.nodes[a.0].view, &self.nodes[b.0].view));
        for i in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[i].children);
            children.sort_by(|a, b| key.compare(&self.nodes[a.0].view, &self.nodes[b.0].view));
            self.nodes[i].children = children;
        }
        self.sort = Some(key);
    }

    pub fn sorted(mut self, key: SortKey) -> CommentTree {
        self.sort_by(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::CommentId, test_util::*};

    fn tree() -> CommentTree {
        CommentTree::build(vec![
            view(1, None, 2, 5),
            view(2, Some(1), 1, 9),
            view(3, None, 3, 1),
        ])
    }

    #[test]
    fn top_orders_roots_by_score() {
        let tree = tree().sorted(SortKey::Top);
        assert_eq!(shape(&tree), vec![(0, 1), (1, 2), (0, 3)]);
        let one = tree.get(CommentId(1)).unwrap();
        let children = tree.children(one).map(|n| n.id()).collect::<Vec<_>>();
        assert_eq!(children, vec![CommentId(2)]);
        assert_eq!(tree.sort_key(), Some(SortKey::Top));
    }

    #[test]
    fn new_and_old() {
        assert_eq!(
            shape(&tree().sorted(SortKey::New)),
            vec![(0, 3), (0, 1), (1, 2)],
        );
        assert_eq!(
            shape(&tree().sorted(SortKey::Old)),
            vec![(0, 1), (1, 2), (0, 3)],
        );
    }

    #[test]
    fn hot_uses_reply_count() {
        let tree = CommentTree::build(vec![
            hot_view(1, None, 0),
            hot_view(2, None, 7),
            hot_view(3, None, 2),
        ])
        .sorted(SortKey::Hot);
        assert_eq!(shape(&tree), vec![(0, 2), (0, 3), (0, 1)]);
    }

    #[test]
    fn every_level_is_sorted() {
        let tree = CommentTree::build(vec![
            view(1, None, 0, 1),
            view(10, Some(1), 0, 1),
            view(11, Some(1), 0, 3),
            view(12, Some(1), 0, 2),
            view(110, Some(11), 0, 0),
            view(111, Some(11), 0, 4),
        ])
        .sorted(SortKey::Top);
        assert_eq!(
            shape(&tree),
            vec![(0, 1), (1, 11), (2, 111), (2, 110), (1, 12), (1, 10)],
        );
    }

    #[test]
    fn ties_keep_batch_order() {
        let tree = CommentTree::build(vec![
            view(5, None, 0, 1),
            view(3, None, 0, 2),
            view(9, None, 0, 1),
            view(1, None, 0, 1),
        ])
        .sorted(SortKey::Top);
        assert_eq!(shape(&tree), vec![(0, 3), (0, 5), (0, 9), (0, 1)]);
    }

    #[test]
    fn resorting() {
        let mut tree = tree();
        SortKey::New.sort(&mut tree);
        SortKey::Top.sort(&mut tree);
        assert_eq!(tree, self::tree().sorted(SortKey::Top));
        let once = tree.clone();
        tree.sort_by(SortKey::Top);
        assert_eq!(tree, once);
    }
}
