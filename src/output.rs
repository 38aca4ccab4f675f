//! Terminal rendering for the command-line front-end.
//!
//! Everything the CLI prints to stdout goes through [`OutputFormatter`]:
//! status lines, the progress bar, the plan table and the per-operation
//! summaries. Per-file log events go to stderr through
//! [`ConsoleSink`](crate::logging::ConsoleSink) instead.

use crate::cleanup::CleanupReport;
use crate::executor::ApplyReport;
use crate::plan::{MovePlan, PlanAction};
use crate::revert::{RevertOutcome, RevertReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Consistent styling for CLI output.
///
/// - success lines are green with ✓
/// - errors are red with ✗ and go to stderr
/// - warnings are yellow with ⚠
pub struct OutputFormatter;

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use sortwise::output::OutputFormatter;
    /// OutputFormatter::success("Folder organized");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for `total` items.
    ///
    /// A bar created with `total == 0` can be resized later with
    /// `set_length` once the batch size is known.
    ///
    /// ```no_run
    /// use sortwise::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(10);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");

        let pb = ProgressBar::new(total);
        pb.set_style(style);
        pb
    }

    /// Prints how many files go into each category, with a total row.
    ///
    /// ```no_run
    /// use sortwise::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 3);
    /// counts.insert("Pictures".to_string(), 1);
    /// OutputFormatter::summary_table(&counts, 4);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = category_counts
            .keys()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Category".len());

        println!("{:<width$} | {}", "Category".bold(), "Files".bold(), width = width);
        println!("{}", "-".repeat(width + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }

    /// Prints every plan entry, then the category summary of the moves.
    pub fn plan_table(plan: &MovePlan) {
        if plan.is_empty() {
            Self::warning("Nothing to organize.");
            return;
        }

        Self::header("PLAN");
        let width = plan
            .entries()
            .iter()
            .map(|e| e.filename.chars().count())
            .max()
            .unwrap_or(0);

        for entry in plan.entries() {
            let target = match entry.action {
                PlanAction::Move => entry.category.green().to_string(),
                PlanAction::Skip => "(skip)".dimmed().to_string(),
                PlanAction::Missing => "(not found)".yellow().to_string(),
            };
            println!("  {:<width$}  →  {}", entry.filename, target, width = width);
        }

        let counts = plan.counts();
        Self::summary_table(&plan.moves_by_category(), counts.moves);
        if counts.skips > 0 {
            Self::info(&format!("{} {} left in place", counts.skips, plural(counts.skips)));
        }
        if counts.missing > 0 {
            Self::warning(&format!(
                "{} {} no longer in the folder",
                counts.missing,
                plural(counts.missing)
            ));
        }
    }

    /// Prints the result of applying a plan.
    pub fn apply_summary(report: &ApplyReport) {
        let moved = report.moved.len();
        if moved > 0 {
            let mut counts = BTreeMap::new();
            for entry in &report.moved {
                let category = entry
                    .destination
                    .parent()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                *counts.entry(category).or_insert(0) += 1;
            }
            Self::summary_table(&counts, moved);
        }

        if report.is_complete_success() {
            Self::success(&format!("Moved {} {}", moved, plural(moved)));
            return;
        }

        Self::warning(&format!("Moved {} {} with problems", moved, plural(moved)));
        for name in &report.not_found {
            println!("  {} {} (not found)", "-".yellow(), name);
        }
        for (name, reason) in &report.failed {
            println!("  {} {}: {}", "-".red(), name, reason);
        }
    }

    /// Prints the result of a revert.
    pub fn revert_summary(report: &RevertReport) {
        match report.outcome {
            RevertOutcome::NoJournal => {
                Self::warning("No movement log found. Nothing to revert.");
                return;
            }
            RevertOutcome::EmptyJournal => {
                Self::info("Movement log is empty. Nothing to revert.");
                return;
            }
            RevertOutcome::CorruptJournal => {
                Self::error("Movement log could not be read; it was left untouched.");
                return;
            }
            RevertOutcome::Reverted => {}
        }

        if report.is_complete_success() {
            Self::success(&format!(
                "Restored {} {}",
                report.restored,
                plural(report.restored)
            ));
        } else {
            Self::warning(&format!(
                "Restored {} of {} {}",
                report.restored,
                report.total_processed(),
                plural(report.total_processed())
            ));
            for path in &report.skipped_missing {
                println!("  {} {} (missing)", "-".yellow(), path.display());
            }
            for path in &report.skipped_conflict {
                println!("  {} {} (occupied)", "-".yellow(), path.display());
            }
            for (path, reason) in &report.failed {
                println!("  {} {}: {}", "-".red(), path.display(), reason);
            }
        }

        if !report.pruned_folders.is_empty() {
            Self::info(&format!(
                "Removed {} empty folder(s)",
                report.pruned_folders.len()
            ));
        }
    }

    /// Prints the result of a cleanup.
    pub fn cleanup_summary(report: &CleanupReport) {
        if report.journal_deleted {
            Self::success("Deleted movement log");
        }
        for folder in &report.pruned_folders {
            Self::success(&format!("Removed empty folder {}", folder.display()));
        }
        if !report.journal_deleted && report.pruned_folders.is_empty() {
            Self::info("Nothing to clean.");
        }
    }

    /// Marks output that describes changes which were not made.
    pub fn preview_notice(message: &str) {
        println!("{}", format!("[PREVIEW] {}", message).yellow());
    }
}
