//! Output formatting and styling module.
//!
//! All terminal output of the CLI goes through here: colored status lines,
//! the extension table, the organize summary and the progress bar. The
//! library passes never print; they log and return reports.

use crate::organizer::{CopyOperation, OrganizeReport};
use crate::rename::RenameReport;
use crate::scanner::ExtensionTally;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Label shown for the empty extension.
pub const NO_EXTENSION_LABEL: &str = "No Extension";

/// Display label of a tally key.
pub fn extension_label(extension: &str) -> &str {
    if extension.is_empty() {
        NO_EXTENSION_LABEL
    } else {
        extension
    }
}

fn files_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// One dry-run line: source, full destination, and a note when a file
/// would be replaced.
fn planned_line(op: &CopyOperation) -> String {
    format!(
        " - {} → {}{}",
        op.source.display(),
        op.destination.display(),
        if op.overwritten { " (replaces existing)" } else { "" }
    )
}

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar showing `N/Total` copied files.
    ///
    /// The length is set by the organizer once it has counted the tree.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use photofold::output::OutputFormatter;
    /// use photofold::organizer::Organizer;
    /// use std::path::Path;
    ///
    /// let organizer = Organizer::new().with_progress(OutputFormatter::create_progress_bar());
    /// organizer.organize(Path::new("/camera"), Path::new("/sorted"));
    /// ```
    pub fn create_progress_bar() -> ProgressBar {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} Copying files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        ProgressBar::new(0).with_style(style)
    }

    /// Prints the per-extension file counts of a scan.
    pub fn tally_table(tally: &ExtensionTally) {
        Self::header("File type counts");

        if tally.is_empty() {
            println!("No files found.");
        } else {
            let width = tally
                .iter()
                .map(|(ext, _)| extension_label(ext).len())
                .max()
                .unwrap_or(0)
                .max("Extension".len());

            println!(
                "{:<width$} | {}",
                "Extension".bold(),
                "Files".bold(),
                width = width
            );
            println!("{}", "-".repeat(width + 10));
            for (ext, count) in tally.iter() {
                println!(
                    "{:<width$} | {} {}",
                    extension_label(ext),
                    count.to_string().green(),
                    files_word(count),
                    width = width
                );
            }
            println!("{}", "-".repeat(width + 10));
            println!(
                "{:<width$} | {} {}",
                "Total".bold(),
                tally.total().to_string().green().bold(),
                files_word(tally.total()),
                width = width
            );
        }

        Self::failure_list("Skipped directories", tally.skipped());
    }

    /// Prints the outcome of an organize run.
    pub fn organize_summary(report: &OrganizeReport, dry_run: bool) {
        if dry_run {
            Self::header("DRY RUN: files would be copied as follows");
            for op in &report.planned {
                println!("{}", planned_line(op));
            }
        }

        Self::header("SUMMARY");
        println!("Files found:      {}", report.total_discovered);
        if dry_run {
            println!("Would copy:       {}", report.planned.len());
        } else {
            println!("Photos copied:    {}", report.photos_copied.to_string().green());
            println!("Others copied:    {}", report.others_copied.to_string().green());
        }
        println!("Deferred others:  {}", report.deferred);
        if report.overwritten > 0 {
            println!("Replaced:         {}", report.overwritten.to_string().yellow());
        }
        if report.filtered > 0 {
            println!("Filtered out:     {}", report.filtered);
        }

        Self::failure_list("Failed", &report.failures);
    }

    /// Prints the outcome of a rename pass.
    pub fn rename_summary(report: &RenameReport) {
        for (old, new) in &report.renamed {
            println!(
                " - {} → {}",
                old.file_name().unwrap_or_default().to_string_lossy(),
                new.file_name().unwrap_or_default().to_string_lossy()
            );
        }
        Self::header("SUMMARY");
        println!("Renamed:   {}", report.renamed.len().to_string().green());
        println!("Unchanged: {}", report.unchanged);
        Self::failure_list("Failed", &report.failures);
    }

    fn failure_list(title: &str, failures: &[(PathBuf, String)]) {
        if failures.is_empty() {
            return;
        }
        Self::warning(&format!("{}: {}", title, failures.len()));
        for (_, reason) in failures {
            eprintln!("    - {}", reason);
        }
    }
}
