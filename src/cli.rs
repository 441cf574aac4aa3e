//! Command-line interface module for photofold.
//!
//! This module turns a parsed [`Command`] into calls to the scanner,
//! organizer and renamer, validates paths before any of them run, and
//! renders their reports. Per-file failures never make a command fail:
//! only invalid paths or configuration do.

use crate::config::Config;
use crate::organizer::Organizer;
use crate::output::OutputFormatter;
use crate::rename::ImageRenamer;
use crate::scanner::Scanner;
use std::fs;
use std::path::{Path, PathBuf};

/// Represents a CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Count files per extension.
    Scan {
        root: PathBuf,
        recursive: bool,
        /// Print the tally as JSON instead of a table.
        json: bool,
    },
    /// Copy photos into month folders and the rest into the catch-all.
    Organize {
        root: PathBuf,
        destination: PathBuf,
        /// If true, report what would be copied without copying.
        dry_run: bool,
    },
    /// Scan, print the tally, then organize.
    Run {
        root: PathBuf,
        destination: PathBuf,
        recursive: bool,
    },
    /// Rename images in one directory after their modification time.
    Rename { directory: PathBuf, subsecond: bool },
}

/// Runs a command.
///
/// # Arguments
///
/// * `command` - What to do
/// * `config_path` - Optional configuration file; otherwise the usual
///   lookup applies (see [`Config::load`])
///
/// # Examples
///
/// ```no_run
/// use photofold::cli::{Command, run_cli};
/// use std::path::PathBuf;
///
/// let result = run_cli(
///     Command::Scan { root: PathBuf::from("/photos"), recursive: true, json: false },
///     None,
/// );
/// if let Err(e) = result {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(command: Command, config_path: Option<&Path>) -> Result<(), String> {
    match command {
        Command::Scan {
            root,
            recursive,
            json,
        } => scan_directory(&root, recursive, json),
        Command::Organize {
            root,
            destination,
            dry_run,
        } => organize_directory(&root, &destination, dry_run, config_path),
        Command::Run {
            root,
            destination,
            recursive,
        } => {
            ensure_directory(&destination, "destination")?;
            scan_directory(&root, recursive, false)?;
            organize_directory(&root, &destination, false, config_path)
        }
        Command::Rename {
            directory,
            subsecond,
        } => rename_directory(&directory, subsecond, config_path),
    }
}

/// Fails unless `path` is an existing directory.
pub fn ensure_directory(path: &Path, role: &str) -> Result<(), String> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(format!(
            "The {} path is not a valid folder: {}",
            role,
            path.display()
        ))
    }
}

fn load_config(config_path: Option<&Path>) -> Result<Config, String> {
    Config::load(config_path).map_err(|e| format!("Error loading configuration: {}", e))
}

fn scan_directory(root: &Path, recursive: bool, json: bool) -> Result<(), String> {
    ensure_directory(root, "source")?;

    let tally = Scanner::scan(root, recursive);
    if json {
        let text = serde_json::to_string_pretty(&tally)
            .map_err(|e| format!("Error serializing scan result: {}", e))?;
        println!("{}", text);
    } else {
        OutputFormatter::info(&format!("Scanned: {}", root.display()));
        OutputFormatter::tally_table(&tally);
    }
    Ok(())
}

fn organize_directory(
    root: &Path,
    destination: &Path,
    dry_run: bool,
    config_path: Option<&Path>,
) -> Result<(), String> {
    ensure_directory(root, "source")?;
    ensure_directory(destination, "destination")?;
    if fs::canonicalize(root).ok() == fs::canonicalize(destination).ok() {
        return Err(format!(
            "The destination must differ from the source folder: {}",
            destination.display()
        ));
    }

    let config = load_config(config_path)?;
    let organizer = Organizer::from_config(config)
        .map_err(|e| format!("Error in configuration: {}", e))?
        .dry_run(dry_run)
        .with_progress(OutputFormatter::create_progress_bar());

    if dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "Analyzing {} (nothing will be copied)",
            root.display()
        ));
    } else {
        OutputFormatter::info(&format!(
            "Organizing {} into {}",
            root.display(),
            destination.display()
        ));
    }

    let report = organizer.organize(root, destination);
    OutputFormatter::organize_summary(&report, dry_run);

    if dry_run {
        OutputFormatter::success("Dry run complete. No files were copied.");
    } else if report.is_complete_success() {
        OutputFormatter::success("Files have been copied to their respective folders.");
    } else {
        OutputFormatter::warning("Some files could not be copied. Please review errors above.");
    }
    Ok(())
}

fn rename_directory(
    directory: &Path,
    subsecond: bool,
    config_path: Option<&Path>,
) -> Result<(), String> {
    ensure_directory(directory, "image")?;

    let config = load_config(config_path)?;
    let report = ImageRenamer::new()
        .with_classifier(config.organize.classifier())
        .with_subsecond(subsecond)
        .rename_images(directory)
        .map_err(|e| e.to_string())?;

    OutputFormatter::rename_summary(&report);
    if report.is_complete_success() {
        OutputFormatter::success("Rename complete.");
    } else {
        OutputFormatter::warning("Some files could not be renamed. Please review errors above.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(ensure_directory(temp_dir.path(), "source").is_ok());
        assert!(ensure_directory(&file, "source").is_err());
        assert!(ensure_directory(&temp_dir.path().join("missing"), "source").is_err());
    }

    #[test]
    fn test_organize_rejects_missing_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = run_cli(
            Command::Organize {
                root: temp_dir.path().to_path_buf(),
                destination: temp_dir.path().join("missing"),
                dry_run: false,
            },
            None,
        );

        let message = result.unwrap_err();
        assert!(message.contains("destination"));
    }

    #[test]
    fn test_organize_rejects_destination_equal_to_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(temp_dir.path().join("a.jpg"), "x").unwrap();

        let result = run_cli(
            Command::Organize {
                root: temp_dir.path().to_path_buf(),
                destination: temp_dir.path().join("."),
                dry_run: false,
            },
            None,
        );

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_run_validates_both_paths_before_scanning() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = run_cli(
            Command::Run {
                root: temp_dir.path().join("missing"),
                destination: temp_dir.path().to_path_buf(),
                recursive: true,
            },
            None,
        );
        assert!(result.is_err());
    }
}
