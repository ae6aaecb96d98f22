// src/lib.rs
// =============================================================================
// bookmark-guardian as a library: the bookmark tree model plus the two
// checks (duplicates and invalid links). The CLI in main.rs is one host;
// anything that can hand over a BookmarkNode tree can drive the same checks.
// =============================================================================

pub mod bookmark;
pub mod checker;
pub mod config;
pub mod error;

pub use error::{GuardianError, Result};
