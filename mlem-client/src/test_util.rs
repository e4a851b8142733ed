use chrono::{TimeZone, Utc};

use crate::{
    api::{
        Comment, CommentAggregates, CommentId, CommentPath, CommentView, Person, PersonId, PostId,
    },
    CommentTree,
};

pub fn with_path(id: i64, path: &str) -> CommentView {
    CommentView {
        comment: Comment {
            id: CommentId(id),
            creator_id: PersonId(1),
            post_id: PostId(1),
            content: format!("comment {id}"),
            path: CommentPath(String::from(path)),
            published: Utc.timestamp_opt(0, 0).unwrap(),
            updated: None,
            deleted: false,
            removed: false,
            distinguished: false,
        },
        creator: Person {
            id: PersonId(1),
            name: String::from("alice"),
            display_name: None,
        },
        counts: CommentAggregates::default(),
        saved: false,
        my_vote: None,
    }
}

pub fn view(id: i64, parent: Option<i64>, published: i64, score: i64) -> CommentView {
    let path = match parent {
        Some(p) => format!("0.{p}.{id}"),
        None => format!("0.{id}"),
    };
    let mut v = with_path(id, &path);
    v.comment.published = Utc.timestamp_opt(published, 0).unwrap();
    v.counts.score = score;
    v.counts.upvotes = score.max(0);
    v.counts.downvotes = (-score).max(0);
    v
}

pub fn hot_view(id: i64, parent: Option<i64>, child_count: i64) -> CommentView {
    let mut v = view(id, parent, 0, 0);
    v.counts.child_count = child_count;
    v
}

/// `(depth, id)` of every node in display order
pub fn shape(tree: &CommentTree) -> Vec<(usize, i64)> {
    tree.iter().map(|(d, n)| (d, n.id().0)).collect()
}
