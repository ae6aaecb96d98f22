// src/checker/duplicate.rs
// =============================================================================
// Finds bookmarks that point at the same place.
//
// Every leaf under the selected roots gets a key, leaves are bucketed by key
// and buckets with a single leaf are dropped. Two keys are available:
// - NormalizedUrl: drop one trailing '/', then lowercase
// - Domain: the URL's hostname (needs a parseable URL)
//
// This is pure in-memory work, so roots are walked one after another with no
// concurrency at all.
// =============================================================================

use tracing::{debug, info, warn};
use url::Url;

use super::groups::DuplicateGroup;
use crate::bookmark::{walk, BookmarkNode, Leaf};
use crate::error::{GuardianError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKey {
    NormalizedUrl,
    Domain,
}

impl DuplicateKey {
    pub fn from_settings(use_domain: bool) -> Self {
        if use_domain {
            DuplicateKey::Domain
        } else {
            DuplicateKey::NormalizedUrl
        }
    }

    /// Computes the grouping key for one URL. Only Domain mode can fail.
    pub fn key_for(self, url: &str) -> Result<String> {
        match self {
            DuplicateKey::NormalizedUrl => Ok(normalize_url(url)),
            DuplicateKey::Domain => hostname(url),
        }
    }
}

/// What to do with a leaf whose URL cannot be parsed in Domain mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseErrorPolicy {
    /// Fail the whole check with the parse error
    #[default]
    Abort,
    /// Leave the leaf out of every group and keep going
    Skip,
}

fn normalize_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_lowercase()
}

fn hostname(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|source| GuardianError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    // Host-less URLs (mailto:, data:, ...) all share the empty key
    Ok(parsed.host_str().unwrap_or_default().to_string())
}

/// Groups the leaves under `roots` by `key`, keeping only keys shared by at
/// least two leaves. Groups and their members are in discovery order.
pub fn find_duplicates(roots: &[BookmarkNode], key: DuplicateKey, policy: ParseErrorPolicy) -> Result<DuplicateGroup> {
    let mut groups = DuplicateGroup::new();
    if roots.is_empty() {
        return Ok(groups);
    }

    let mut skipped = 0usize;
    for root in roots {
        // walk() takes an infallible visitor, so the first error is parked
        // here and checked once this root is done
        let mut failure: Option<GuardianError> = None;

        walk(root, &mut |leaf: &Leaf| {
            if failure.is_some() {
                return;
            }
            match key.key_for(&leaf.url) {
                Ok(k) => groups.push(k, leaf.clone()),
                Err(e) => match policy {
                    ParseErrorPolicy::Abort => failure = Some(e),
                    ParseErrorPolicy::Skip => {
                        warn!(id = %leaf.id, url = %leaf.url, error = %e, "Skipping bookmark with an unparsable URL");
                        skipped += 1;
                    }
                },
            }
        });

        if let Some(e) = failure {
            return Err(e);
        }
        debug!(root = %root.id(), keys = groups.len(), "Scanned root for duplicates");
    }

    groups.retain(|_, leaves| leaves.len() > 1);
    info!(groups = groups.len(), skipped, "Duplicate check finished");
    Ok(groups)
}
