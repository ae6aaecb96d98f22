// src/bookmark/node.rs
// =============================================================================
// The bookmark tree data model.
//
// A node is either a Folder (children, no url) or a Leaf (url, no children).
// Stored bookmark data describes that with optional fields, so we parse into
// a RawNode first and convert with TryFrom: a node with both a url and
// children never makes it into a BookmarkNode.
//
// Also here: the tree helpers the removal workflow needs (filtered copies,
// folder lookup). None of them mutate the tree they are given.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::GuardianError;

/// A bookmark entry carrying a URL and no children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// A bookmark entry holding other entries, in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: String,
    pub title: String,
    pub children: Vec<BookmarkNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum BookmarkNode {
    Folder(Folder),
    Leaf(Leaf),
}

// The on-disk shape: the same fields the browser bookmarks API hands out
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<BookmarkNode>>,
}

impl TryFrom<RawNode> for BookmarkNode {
    type Error = GuardianError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        match (raw.url, raw.children) {
            (Some(_), Some(_)) => Err(GuardianError::MalformedNode { id: raw.id }),
            (Some(url), None) => Ok(BookmarkNode::Leaf(Leaf {
                id: raw.id,
                title: raw.title,
                url,
            })),
            // A node with neither is an empty folder
            (None, children) => Ok(BookmarkNode::Folder(Folder {
                id: raw.id,
                title: raw.title,
                children: children.unwrap_or_default(),
            })),
        }
    }
}

impl From<BookmarkNode> for RawNode {
    fn from(node: BookmarkNode) -> Self {
        match node {
            BookmarkNode::Folder(folder) => RawNode {
                id: folder.id,
                title: folder.title,
                url: None,
                children: Some(folder.children),
            },
            BookmarkNode::Leaf(leaf) => RawNode {
                id: leaf.id,
                title: leaf.title,
                url: Some(leaf.url),
                children: None,
            },
        }
    }
}

impl BookmarkNode {
    pub fn folder(id: impl Into<String>, title: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        BookmarkNode::Folder(Folder {
            id: id.into(),
            title: title.into(),
            children,
        })
    }

    pub fn leaf(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        BookmarkNode::Leaf(Leaf {
            id: id.into(),
            title: title.into(),
            url: url.into(),
        })
    }

    pub fn id(&self) -> &str {
        match self {
            BookmarkNode::Folder(folder) => &folder.id,
            BookmarkNode::Leaf(leaf) => &leaf.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            BookmarkNode::Folder(folder) => &folder.title,
            BookmarkNode::Leaf(leaf) => &leaf.title,
        }
    }
}

/// A folder as shown in the folder picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderInfo {
    pub id: String,
    pub title: String,
    pub depth: usize,
}

/// Lists every folder of the tree in pre-order, with its nesting depth
pub fn list_folders(nodes: &[BookmarkNode]) -> Vec<FolderInfo> {
    fn collect(nodes: &[BookmarkNode], depth: usize, out: &mut Vec<FolderInfo>) {
        for node in nodes {
            if let BookmarkNode::Folder(folder) = node {
                out.push(FolderInfo {
                    id: folder.id.clone(),
                    title: folder.title.clone(),
                    depth,
                });
                collect(&folder.children, depth + 1, out);
            }
        }
    }

    let mut out = Vec::new();
    collect(nodes, 0, &mut out);
    out
}

fn find_folder<'a>(nodes: &'a [BookmarkNode], id: &str) -> Option<&'a BookmarkNode> {
    nodes.iter().find_map(|node| match node {
        BookmarkNode::Folder(folder) if folder.id == id => Some(node),
        BookmarkNode::Folder(folder) => find_folder(&folder.children, id),
        BookmarkNode::Leaf(_) => None,
    })
}

/// Picks the roots a check runs over.
///
/// No ids means "the whole tree". Otherwise the listed folders are returned
/// in the order given; an id that is not a folder is an error.
pub fn select_roots(tree: &[BookmarkNode], folder_ids: &[String]) -> Result<Vec<BookmarkNode>, GuardianError> {
    if folder_ids.is_empty() {
        return Ok(tree.to_vec());
    }

    folder_ids
        .iter()
        .map(|id| {
            find_folder(tree, id)
                .cloned()
                .ok_or_else(|| GuardianError::UnknownFolder { id: id.clone() })
        })
        .collect()
}

/// Returns a copy of `nodes` without any node whose id is in `ids`.
/// Removing a folder removes its whole subtree.
pub fn remove_nodes_by_ids(nodes: &[BookmarkNode], ids: &[String]) -> Vec<BookmarkNode> {
    nodes
        .iter()
        .filter(|node| !ids.iter().any(|id| id == node.id()))
        .map(|node| match node {
            BookmarkNode::Folder(folder) => BookmarkNode::Folder(Folder {
                id: folder.id.clone(),
                title: folder.title.clone(),
                children: remove_nodes_by_ids(&folder.children, ids),
            }),
            BookmarkNode::Leaf(leaf) => BookmarkNode::Leaf(leaf.clone()),
        })
        .collect()
}
