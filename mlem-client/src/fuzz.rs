#![cfg(test)]

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

use crate::{
    api::{CommentId, CommentView, SortKey},
    test_util::*,
    CommentNode, CommentTree, SortKeyExt,
};

// (id, parent, published, score, reply count), parent 0 being top-level
type Raw = (u8, u8, u8, i8, u8);

// Generated ids are at most 256, these are never generated
const NEW_ID: i64 = 1000;
const UNLOADED_PARENT: i64 = 2000;

fn make_view(id: i64, parent: u8, published: u8, score: i8, child_count: u8) -> CommentView {
    let parent = (parent != 0).then_some(i64::from(parent));
    let mut v = view(id, parent, i64::from(published), i64::from(score));
    v.counts.child_count = i64::from(child_count);
    v
}

/// Views of `raw`, keeping only the first occurrence of each id
fn batch(raw: &[Raw]) -> Vec<CommentView> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter(|r| seen.insert(r.0))
        .map(|&(id, parent, published, score, child_count)| {
            make_view(i64::from(id) + 1, parent, published, score, child_count)
        })
        .collect()
}

fn sibling_lists(tree: &CommentTree) -> Vec<Vec<&CommentNode>> {
    let mut res = vec![tree.roots().collect::<Vec<_>>()];
    for (_, n) in tree.iter() {
        res.push(tree.children(n).collect());
    }
    res
}

fn sorted_ids(nodes: &[&CommentNode]) -> Vec<CommentId> {
    let mut ids = nodes.iter().map(|n| n.id()).collect::<Vec<_>>();
    ids.sort();
    ids
}

#[test]
fn build_keeps_every_comment() {
    bolero::check!()
        .with_type::<Vec<Raw>>()
        .cloned()
        .for_each(|raw| {
            let views = batch(&raw);
            let tree = CommentTree::build(views.clone());
            assert_eq!(tree.len(), views.len());
            assert_eq!(tree.iter().count(), views.len());
            for v in &views {
                assert!(tree.contains(v.id()));
            }
            for (_, n) in tree.iter() {
                for c in tree.children(n) {
                    assert_eq!(c.view().parent_id(), Ok(Some(n.id())));
                    assert!(!c.parent_collapsed());
                }
            }
        })
}

#[test]
fn discarding_keeps_a_subset() {
    bolero::check!()
        .with_type::<Vec<Raw>>()
        .cloned()
        .for_each(|raw| {
            let views = batch(&raw);
            let promoted = CommentTree::build(views.clone());
            let discarded = CommentTree::build_with(views, crate::OrphanPolicy::Discard);
            assert!(discarded.len() <= promoted.len());
            for (_, n) in discarded.iter() {
                let p = promoted.get(n.id()).expect("discarding invented a comment");
                assert_eq!(
                    sorted_ids(&discarded.children(n).collect::<Vec<_>>()),
                    sorted_ids(&promoted.children(p).collect::<Vec<_>>()),
                );
            }
        })
}

#[test]
fn sorting_is_stable_and_keeps_shape() {
    bolero::check!()
        .with_type::<Vec<Raw>>()
        .cloned()
        .for_each(|raw| {
            let views = batch(&raw);
            let position = views
                .iter()
                .enumerate()
                .map(|(i, v)| (v.id(), i))
                .collect::<HashMap<_, _>>();
            let unsorted = CommentTree::build(views);
            for key in SortKey::ALL {
                let tree = unsorted.clone().sorted(key);
                assert_eq!(tree.sort_key(), Some(key));
                for siblings in sibling_lists(&tree) {
                    for w in siblings.windows(2) {
                        match key.compare(w[0].view(), w[1].view()) {
                            Ordering::Less => (),
                            Ordering::Equal => {
                                assert!(position[&w[0].id()] < position[&w[1].id()])
                            }
                            Ordering::Greater => panic!("siblings out of order for {key}"),
                        }
                    }
                }

                assert_eq!(
                    sorted_ids(&tree.roots().collect::<Vec<_>>()),
                    sorted_ids(&unsorted.roots().collect::<Vec<_>>()),
                );
                for (_, n) in tree.iter() {
                    let before = unsorted.get(n.id()).unwrap();
                    assert_eq!(
                        sorted_ids(&tree.children(n).collect::<Vec<_>>()),
                        sorted_ids(&unsorted.children(before).collect::<Vec<_>>()),
                    );
                }

                assert_eq!(tree.clone().sorted(key), tree);
            }
        })
}

#[test]
fn merging_matches_rebuilding() {
    bolero::check!()
        .with_type::<(Vec<Raw>, (u8, u8, i8, u8), u8)>()
        .cloned()
        .for_each(|(raw, (parent, published, score, child_count), key)| {
            let views = batch(&raw);
            let key = SortKey::ALL[usize::from(key) % SortKey::ALL.len()];
            let tree = CommentTree::build(views.clone()).sorted(key);

            // updating never moves anything
            if let Some(first) = views.first() {
                let mut updated = tree.clone();
                let mut v = first.clone();
                v.counts.score = i64::from(score);
                v.counts.child_count = i64::from(child_count);
                assert!(updated.merge_update(v.clone()));
                assert_eq!(shape(&updated), shape(&tree));
                assert_eq!(updated.get(v.id()).unwrap().view(), &v);
            }

            // replies to unloaded comments are dropped
            let mut unchanged = tree.clone();
            let mut orphan = view(NEW_ID, Some(UNLOADED_PARENT), 0, 0);
            orphan.counts.score = i64::from(score);
            assert!(!unchanged.merge_insert(orphan));
            assert_eq!(unchanged, tree);

            // inserting is the same as reloading with one more comment
            let parent = match tree.contains(CommentId(i64::from(parent))) {
                true => parent,
                false => 0,
            };
            let new = make_view(NEW_ID, parent, published, score, child_count);
            let mut merged = tree.clone();
            assert!(merged.merge_insert(new.clone()));
            let mut all = views;
            all.push(new);
            assert_eq!(merged, CommentTree::build(all).sorted(key));
        })
}
