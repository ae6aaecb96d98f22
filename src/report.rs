// src/report.rs
// =============================================================================
// Prints check results, either as a human-readable table or as JSON.
// Results go to stdout; logs and live progress go to stderr.
// =============================================================================

use anyhow::Result;

use bookmark_guardian::bookmark::FolderInfo;
use bookmark_guardian::checker::Groups;

/// Which check produced the groups; only changes the wording
#[derive(Debug, Clone, Copy)]
pub enum Report {
    Duplicates,
    Invalid,
}

impl Report {
    fn key_header(self) -> &'static str {
        match self {
            Report::Duplicates => "KEY",
            Report::Invalid => "REASON",
        }
    }
}

pub fn print_groups(groups: &Groups, kind: Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(groups)?);
    } else {
        print_table(groups, kind);
    }
    Ok(())
}

fn print_table(groups: &Groups, kind: Report) {
    if groups.is_empty() {
        match kind {
            Report::Duplicates => println!("✅ No duplicate bookmarks found"),
            Report::Invalid => println!("✅ All bookmarks answered with 2xx"),
        }
        return;
    }

    println!("{:<8} {:<40} {:<60}", "ID", "TITLE", "URL");
    println!("{}", "=".repeat(110));

    for (key, leaves) in groups.iter() {
        println!("{} {} ({})", kind.key_header(), key, leaves.len());
        for leaf in leaves {
            println!("{:<8} {:<40} {:<60}", leaf.id, truncate(&leaf.title, 40), truncate(&leaf.url, 60));
        }
        println!();
    }

    println!("📊 Summary:");
    println!("   🗂️  Groups: {}", groups.len());
    println!("   🔖 Bookmarks: {}", groups.leaf_count());
}

pub fn print_folders(folders: &[FolderInfo], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(folders)?);
        return Ok(());
    }

    for folder in folders {
        println!("{:<8} {}{}", folder.id, "  ".repeat(folder.depth), folder.title);
    }
    Ok(())
}

// Cuts on a char boundary so multi-byte titles don't panic
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
