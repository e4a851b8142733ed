mod config;
pub use config::Settings;

mod node;
pub use node::{CommentNode, NodeId};

mod tree;
pub use tree::{CommentTree, Iter, OrphanPolicy};

mod merge;

mod sort;
pub use sort::SortKeyExt;

mod tracker;
pub use tracker::{CommentTracker, ReloadTicket};

mod fuzz;

#[cfg(test)]
mod test_util;

pub mod api {
    pub use mlem_api::*;
}

pub mod prelude {
    pub use crate::SortKeyExt;
}
