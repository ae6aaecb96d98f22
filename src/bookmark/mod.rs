// src/bookmark/mod.rs
// =============================================================================
// The bookmark tree: data model, traversal and on-disk store.
//
// Submodules:
// - node: BookmarkNode (Folder | Leaf), root selection, filtered copies
// - walk: depth-first traversal and leaf counting
// - store: loading/saving trees from JSON files
// =============================================================================

mod node;
mod store;
mod walk;

pub use node::{list_folders, remove_nodes_by_ids, select_roots, BookmarkNode, Folder, FolderInfo, Leaf};
pub use store::{load_tree, save_tree};
pub use walk::{count_leaves, leaves, walk, walk_async};
