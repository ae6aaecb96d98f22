// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Load the bookmark tree and pick the roots to check
// 3. Run the requested check and print the results
// 4. Exit with proper code (0 = nothing found, 1 = findings, 2 = error)
// =============================================================================

mod cli;
mod report;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use bookmark_guardian::bookmark::{self, BookmarkNode};
use bookmark_guardian::checker::{self, DuplicateKey, Groups, ParseErrorPolicy, ValidationEvent};
use cli::{Cli, Commands, Target};
use report::Report;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Folders { file, json } => {
            let tree = load(&file)?;
            report::print_folders(&bookmark::list_folders(&tree), json)?;
            Ok(0)
        }
        Commands::Duplicates {
            target,
            by_domain,
            skip_unparsable,
        } => handle_duplicates(&target, by_domain, skip_unparsable),
        Commands::Invalid {
            target,
            max_requests,
            timeout,
        } => handle_invalid(&target, max_requests, timeout).await,
    }
}

fn setup_logging(verbose: bool) {
    let default = if verbose {
        "bookmark_guardian=debug,warn"
    } else {
        "bookmark_guardian=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load(file: &Path) -> Result<Vec<BookmarkNode>> {
    bookmark::load_tree(file).with_context(|| format!("failed to read bookmarks from {}", file.display()))
}

// Loads the tree and resolves --folder ids; returns (whole tree, roots)
fn load_target(target: &Target) -> Result<(Vec<BookmarkNode>, Vec<BookmarkNode>)> {
    let tree = load(&target.file)?;
    let roots = bookmark::select_roots(&tree, &target.folders)?;
    Ok((tree, roots))
}

fn handle_duplicates(target: &Target, by_domain: bool, skip_unparsable: bool) -> Result<i32> {
    let mut settings = target.base_settings().context("failed to read settings")?;
    settings.use_domain_for_duplication_check |= by_domain;

    let (tree, roots) = load_target(target)?;
    let key = DuplicateKey::from_settings(settings.use_domain_for_duplication_check);
    let policy = if skip_unparsable {
        ParseErrorPolicy::Skip
    } else {
        ParseErrorPolicy::Abort
    };

    info!(?key, roots = roots.len(), "Looking for duplicate bookmarks");
    let groups = checker::find_duplicates(&roots, key, policy)?;

    report::print_groups(&groups, Report::Duplicates, target.json)?;
    prune(target, &tree, &groups.redundant_ids())?;

    Ok(exit_code_for(&groups))
}

async fn handle_invalid(target: &Target, max_requests: Option<u64>, timeout: Option<u64>) -> Result<i32> {
    let mut settings = target.base_settings().context("failed to read settings")?;
    if let Some(max_requests) = max_requests {
        settings.max_requests = max_requests as usize;
    }
    if let Some(timeout) = timeout {
        settings.request_timeout_secs = timeout;
    }

    let (tree, roots) = load_target(target)?;
    let mut run = checker::validate_links(roots, &settings)?;

    eprintln!(
        "🌐 Checking {} bookmark(s), {} folder(s) at a time, {}s timeout...",
        run.total(),
        settings.max_requests,
        settings.request_timeout_secs
    );

    while let Some(event) = run.next_event().await {
        match event {
            ValidationEvent::Progress(progress) => {
                eprintln!(
                    "   [{:>5.1}%] {}/{} checked",
                    progress.percent(),
                    progress.processed,
                    progress.total
                );
            }
            ValidationEvent::Partial(groups) => {
                debug!(invalid = groups.leaf_count(), "Invalid bookmarks so far");
            }
        }
    }
    let invalid = run.finish().await;

    report::print_groups(&invalid, Report::Invalid, target.json)?;
    prune(target, &tree, &invalid.ids())?;

    Ok(exit_code_for(&invalid))
}

// Writes the tree minus `ids` when --prune-output was given
fn prune(target: &Target, tree: &[BookmarkNode], ids: &[String]) -> Result<()> {
    let Some(path) = &target.prune_output else {
        return Ok(());
    };

    let pruned = bookmark::remove_nodes_by_ids(tree, ids);
    bookmark::save_tree(path, &pruned).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), removed = ids.len(), "Wrote pruned bookmark tree");
    Ok(())
}

fn exit_code_for(groups: &Groups) -> i32 {
    if groups.is_empty() {
        0
    } else {
        1
    }
}
