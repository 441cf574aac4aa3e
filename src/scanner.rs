//! Extension tally over a directory tree.
//!
//! The scan is purely informational: it never touches the files it counts.
//! Unreadable subtrees are logged, remembered in the tally and skipped, so a
//! partial result is always returned.

use crate::walk::walk_files;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Number of files seen per normalized extension.
///
/// The empty string key stands for files without an extension. Every
/// stored count is at least 1: extensions never seen are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtensionTally {
    counts: BTreeMap<String, usize>,
    #[serde(skip)]
    skipped: Vec<(PathBuf, String)>,
}

impl ExtensionTally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more file with `extension`.
    pub fn record(&mut self, extension: &str) {
        *self.counts.entry(extension.to_string()).or_insert(0) += 1;
    }

    /// Returns the count for `extension`, if any file had it.
    pub fn get(&self, extension: &str) -> Option<usize> {
        self.counts.get(extension).copied()
    }

    /// Number of distinct extensions.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of files counted.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Iterates `(extension, count)` pairs in extension order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(ext, count)| (ext.as_str(), *count))
    }

    /// Subtrees that could not be read, with the reason.
    pub fn skipped(&self) -> &[(PathBuf, String)] {
        &self.skipped
    }

    /// Consumes the tally into a plain map.
    pub fn into_map(self) -> BTreeMap<String, usize> {
        self.counts
    }
}

/// Counts files by extension.
pub struct Scanner;

impl Scanner {
    /// Scans `root` and returns a count of files per extension.
    ///
    /// With `recursive` false only the files directly inside `root` are
    /// counted; subdirectories are neither entered nor counted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use photofold::scanner::Scanner;
    /// use std::path::Path;
    ///
    /// let tally = Scanner::scan(Path::new("/path/to/photos"), true);
    /// for (ext, count) in tally.iter() {
    ///     println!("{}: {}", if ext.is_empty() { "No Extension" } else { ext }, count);
    /// }
    /// ```
    pub fn scan(root: &Path, recursive: bool) -> ExtensionTally {
        info!(
            "Scanning {} ({})",
            root.display(),
            if recursive { "recursive" } else { "top level only" }
        );

        let mut tally = ExtensionTally::new();
        for result in walk_files(root, recursive, None) {
            match result {
                Ok(file) => {
                    debug!("Counted {} as '{}'", file.path.display(), file.extension);
                    tally.record(&file.extension);
                }
                Err(e) => {
                    warn!("Skipping {}", e);
                    tally.skipped.push((e.path().clone(), e.to_string()));
                }
            }
        }

        info!(
            "Scan finished: {} files, {} extensions",
            tally.total(),
            tally.len()
        );
        tally
    }
}
