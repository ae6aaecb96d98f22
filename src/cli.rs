// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Three subcommands:
// - folders: list folders (ids to pass to --folder)
// - duplicates: find bookmarks pointing at the same URL or domain
// - invalid: probe every bookmark URL and group the dead ones
//
// Settings flags are all optional: anything left out falls back to the
// settings file (--settings) and then to the built-in defaults.
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use bookmark_guardian::config::{Settings, MAX_REQUESTS_RANGE, REQUEST_TIMEOUT_RANGE};

#[derive(Parser, Debug)]
#[command(
    name = "bookmark-guardian",
    version = "0.1.0",
    about = "Find duplicate and dead links in a browser bookmark tree",
    long_about = "bookmark-guardian reads an exported bookmark tree (or a Chromium 'Bookmarks' profile file), \
                  groups duplicate bookmarks and checks every bookmarked URL for dead links."
)]
pub struct Cli {
    /// Show debug logging (RUST_LOG overrides this)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every folder with its id
    ///
    /// Example: bookmark-guardian folders bookmarks.json
    Folders {
        /// Bookmark file to read
        file: PathBuf,

        /// Output results in JSON format instead of a list
        #[arg(long)]
        json: bool,
    },

    /// Find duplicate bookmarks
    ///
    /// Example: bookmark-guardian duplicates bookmarks.json --by-domain
    Duplicates {
        #[command(flatten)]
        target: Target,

        /// Group by hostname instead of by normalized URL
        #[arg(long)]
        by_domain: bool,

        /// In domain mode, skip bookmarks whose URL cannot be parsed instead
        /// of failing the whole check
        #[arg(long)]
        skip_unparsable: bool,
    },

    /// Check every bookmark URL and report the ones that do not answer 2xx
    ///
    /// Example: bookmark-guardian invalid bookmarks.json --max-requests 5 --timeout 10
    Invalid {
        #[command(flatten)]
        target: Target,

        /// Root folders checked concurrently
        #[arg(long, value_parser = clap::value_parser!(u64).range(MAX_REQUESTS_RANGE.0 as u64..=MAX_REQUESTS_RANGE.1 as u64))]
        max_requests: Option<u64>,

        /// Timeout for one request, in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(REQUEST_TIMEOUT_RANGE.0..=REQUEST_TIMEOUT_RANGE.1))]
        timeout: Option<u64>,
    },
}

/// Arguments shared by both checks
#[derive(Args, Debug)]
pub struct Target {
    /// Bookmark file to read
    pub file: PathBuf,

    /// Only check this folder (repeatable); default is the whole tree
    #[arg(long = "folder", value_name = "ID")]
    pub folders: Vec<String>,

    /// Settings file ({"maxRequests", "requestTimeoutSeconds", "useDomainForDuplicationCheck"})
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// Write a copy of the tree without the reported bookmarks to this file
    #[arg(long, value_name = "PATH")]
    pub prune_output: Option<PathBuf>,
}

impl Target {
    /// Settings from the file given with --settings, or the defaults
    pub fn base_settings(&self) -> bookmark_guardian::Result<Settings> {
        match &self.settings {
            Some(path) => Settings::load(path),
            None => Ok(Settings::default()),
        }
    }
}
