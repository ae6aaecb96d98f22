// src/checker/mod.rs
// =============================================================================
// This module contains both bookmark checks.
//
// Submodules:
// - groups: ordered key -> leaves buckets shared by both checks
// - duplicate: groups leaves by normalized URL or hostname
// - probe: one HTTP GET per URL, classified into an outcome
// - queue: bounded pool running root subtrees concurrently
// - validate: drives the probes and aggregates results and progress
// =============================================================================

mod duplicate;
mod groups;
mod probe;
mod queue;
mod validate;

pub use duplicate::{find_duplicates, DuplicateKey, ParseErrorPolicy};
pub use groups::{DuplicateGroup, Groups, InvalidGroup};
pub use probe::{ProbeOutcome, Prober, ReqwestProber, TIMEOUT_KEY};
pub use queue::TaskQueue;
pub use validate::{
    validate_links, validate_links_with, validate_links_with_callbacks, Progress, ValidationEvent, ValidationRun,
};
