// src/bookmark/walk.rs
// =============================================================================
// Depth-first traversal of a bookmark tree.
//
// Leaves are visited in pre-order, following each folder's child order.
// walk_async awaits the visitor for one leaf before starting the next, so
// a single subtree never has two probes in flight at once; concurrency only
// exists between whole root subtrees (see checker::queue).
// =============================================================================

use std::future::Future;

use super::node::{BookmarkNode, Leaf};

/// Calls `visit` on every leaf under `node`, in document order
pub fn walk<'a, F>(node: &'a BookmarkNode, visit: &mut F)
where
    F: FnMut(&'a Leaf),
{
    match node {
        BookmarkNode::Leaf(leaf) => visit(leaf),
        BookmarkNode::Folder(folder) => {
            for child in &folder.children {
                walk(child, visit);
            }
        }
    }
}

/// All leaves under `node`, in the order `walk` visits them
pub fn leaves(node: &BookmarkNode) -> Vec<&Leaf> {
    let mut out = Vec::new();
    walk(node, &mut |leaf| out.push(leaf));
    out
}

/// Async variant of `walk`: each visit is awaited before the next begins.
///
/// The traversal itself never suspends, so the leaf order is fixed up front
/// and only the visitor's futures are awaited.
pub async fn walk_async<F, Fut>(node: &BookmarkNode, mut visit: F)
where
    F: FnMut(&Leaf) -> Fut,
    Fut: Future<Output = ()>,
{
    for leaf in leaves(node) {
        visit(leaf).await;
    }
}

/// Number of leaves across a set of roots
pub fn count_leaves(nodes: &[BookmarkNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            BookmarkNode::Leaf(_) => 1,
            BookmarkNode::Folder(folder) => count_leaves(&folder.children),
        })
        .sum()
}
