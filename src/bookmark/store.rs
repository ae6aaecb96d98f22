// src/bookmark/store.rs
// =============================================================================
// Reads and writes bookmark trees on disk.
//
// Two input layouts are understood:
// - a node tree exported from the browser bookmarks API: an array (or one
//   object) of { id, title, url?, children? }
// - a Chromium profile "Bookmarks" file: { "roots": { "bookmark_bar": {...},
//   "other": {...}, "synced": {...} } } where nodes carry "name" and "type"
//
// Output is always the node-tree layout.
// =============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::node::BookmarkNode;
use crate::error::{GuardianError, Result};

// Chromium profile node: "type" tells folders and urls apart
#[derive(Debug, Deserialize)]
struct ProfileNode {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    children: Option<Vec<ProfileNode>>,
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    roots: BTreeMap<String, Value>,
}

impl TryFrom<ProfileNode> for BookmarkNode {
    type Error = GuardianError;

    fn try_from(node: ProfileNode) -> Result<Self> {
        match (node.kind.as_str(), node.url, node.children) {
            (_, Some(_), Some(_)) => Err(GuardianError::MalformedNode { id: node.id }),
            ("url", Some(url), None) | ("", Some(url), None) => Ok(BookmarkNode::leaf(node.id, node.name, url)),
            ("url", None, _) => Err(GuardianError::MalformedNode { id: node.id }),
            (_, _, children) => {
                let children = children
                    .unwrap_or_default()
                    .into_iter()
                    .map(BookmarkNode::try_from)
                    .collect::<Result<Vec<_>>>()?;
                Ok(BookmarkNode::folder(node.id, node.name, children))
            }
        }
    }
}

/// Parses bookmark JSON in either supported layout
pub fn parse_tree(json: &str) -> Result<Vec<BookmarkNode>> {
    let value: Value = serde_json::from_str(json)?;

    if value.get("roots").is_some() {
        let file: ProfileFile = serde_json::from_value(value)?;
        let mut roots = Vec::new();
        // Chromium also stores non-node values under "roots" (e.g. sync
        // metadata), so only objects with an id are taken
        for (name, root) in file.roots {
            if root.get("id").is_none() {
                debug!(root = %name, "Skipping non-node entry under roots");
                continue;
            }
            let node: ProfileNode = serde_json::from_value(root)?;
            roots.push(BookmarkNode::try_from(node)?);
        }
        return Ok(roots);
    }

    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}

/// Loads a bookmark tree from a file
pub fn load_tree(path: &Path) -> Result<Vec<BookmarkNode>> {
    let json = std::fs::read_to_string(path)?;
    let tree = parse_tree(&json)?;
    debug!(path = %path.display(), roots = tree.len(), "Loaded bookmark tree");
    Ok(tree)
}

/// Writes a tree in the node-tree layout
pub fn save_tree(path: &Path, nodes: &[BookmarkNode]) -> Result<()> {
    let json = serde_json::to_string_pretty(nodes)?;
    std::fs::write(path, json)?;
    Ok(())
}
