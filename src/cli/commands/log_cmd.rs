//! log command - List recorded pushes
//!
//! One line per pushed solution, oldest first, followed by the point total.

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::push::log::{FilePushLog, PushLogEntry, PushLogStore};

/// Print the push log, optionally for one user.
pub fn log(ctx: &Context, user: Option<&str>) -> Result<()> {
    let path = ctx
        .config
        .log_path()
        .context("Failed to locate push log")?;
    let entries = FilePushLog::new(path)
        .entries(user)
        .context("Failed to read push log")?;

    if ctx.quiet {
        for entry in &entries {
            println!("{}", entry.filename);
        }
        return Ok(());
    }

    if entries.is_empty() {
        println!("No pushes recorded.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    println!();
    println!(
        "{} solution(s), {} point(s)",
        entries.len(),
        total_points(&entries)
    );
    Ok(())
}

fn format_entry(entry: &PushLogEntry) -> String {
    let difficulty = entry
        .difficulty
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}  {:<16} {:<32} {:<6} {:>2}  {}",
        entry.timestamp.format("%Y-%m-%d %H:%M"),
        entry.user,
        entry.filename,
        difficulty,
        entry.points,
        entry.repository
    )
}

fn total_points(entries: &[PushLogEntry]) -> u32 {
    entries.iter().map(|e| e.points).sum()
}
