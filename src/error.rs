// src/error.rs
// =============================================================================
// Typed errors for the library-level modules (bookmark tree, checkers,
// settings).
//
// main.rs still works with anyhow::Result: every GuardianError converts into
// anyhow::Error through `?`, so the application layer can add context with
// .context(...) while the lower layers keep precise, matchable variants.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardianError {
    /// A bookmark URL could not be parsed while extracting its hostname
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A stored node carries both a url and children
    #[error("bookmark node '{id}' has both a url and children")]
    MalformedNode { id: String },

    /// A selected folder id does not exist in the tree (or is not a folder)
    #[error("no folder with id '{id}' in the bookmark tree")]
    UnknownFolder { id: String },

    #[error("setting '{name}' is {value}, expected a value between {min} and {max}")]
    InvalidSetting {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, GuardianError>;
