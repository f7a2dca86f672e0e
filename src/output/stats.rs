//! Statistics reporting.

use console::style;

use crate::scan::{DuplicateHit, FolderOutcome, RunResult};

/// Print statistics for a single folder.
pub fn print_folder_stats(outcome: &FolderOutcome, dry_run: bool) {
    println!();
    println!(
        "{}",
        style(format!("Statistics for {}:", outcome.folder)).bold()
    );
    println!("  Scanned:    {}", outcome.scanned);
    println!("  Duplicates: {}", outcome.duplicate_count());
    if outcome.parse_failures > 0 {
        println!(
            "  Skipped:    {} (unparseable headers)",
            style(outcome.parse_failures).yellow()
        );
    }
    if dry_run {
        println!(
            "  Would mark: {} (dry run)",
            style(outcome.duplicate_count()).green()
        );
    } else {
        println!("  Marked:     {}", outcome.marked);
        if outcome.mark_failures > 0 {
            println!("  Failed:     {}", style(outcome.mark_failures).red());
        }
    }
}

/// Print global statistics across all folders.
pub fn print_run_stats(result: &RunResult) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Run summary:").bold());
    println!("  Mode:       {}", result.mode);
    println!("  Folders:    {}", result.folders.len());
    println!("  Scanned:    {}", result.total_scanned());
    println!("  Duplicates: {}", result.total_duplicates());
    if result.total_parse_failures() > 0 {
        println!(
            "  Skipped:    {} (unparseable headers)",
            style(result.total_parse_failures()).yellow()
        );
    }
    if result.dry_run {
        println!(
            "  Would mark: {} (dry run)",
            style(result.total_duplicates()).green()
        );
    } else {
        println!("  Marked:     {}", result.total_marked());
        if result.total_mark_failures() > 0 {
            println!(
                "  Failed:     {}",
                style(result.total_mark_failures()).red()
            );
        }
    }
    println!("{}", style("═".repeat(50)).dim());
}

/// Print header details for every duplicate found in a folder.
pub fn print_duplicates(outcome: &FolderOutcome) {
    for hit in &outcome.duplicates {
        print_duplicate(&outcome.folder, hit);
    }
}

fn print_duplicate(folder: &str, hit: &DuplicateHit) {
    println!(
        "{} {}/{} duplicates {}",
        style("DUP").magenta().bold(),
        folder,
        hit.handle,
        hit.first_seen
    );
    println!("  Subject: {}", hit.summary.subject.as_deref().unwrap_or("-"));
    println!("  From:    {}", hit.summary.from.as_deref().unwrap_or("-"));
    println!("  Date:    {}", hit.summary.date.as_deref().unwrap_or("-"));
}
