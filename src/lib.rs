//! photofold - sort photos into month folders
//!
//! This library counts files in a directory tree by extension and copies
//! photos into `MM-YYYY` folders named after their creation date, with
//! every other file collected in a single `unknown` folder. A companion
//! renamer gives images timestamp-based names in place.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod organizer;
pub mod output;
pub mod rename;
pub mod scanner;
pub mod walk;

pub use classify::{Classifier, FileClass};
pub use config::{CompiledFilters, Config, ConfigError};
pub use error::{OrganizeError, OrganizeResult};
pub use organizer::{OrganizeReport, Organizer};
pub use rename::{ImageRenamer, RenameReport};
pub use scanner::{ExtensionTally, Scanner};
pub use walk::FileEntry;

pub use cli::{Command, run_cli};

use std::path::Path;

/// Counts files under `root` by normalized extension.
///
/// Shorthand for [`Scanner::scan`].
pub fn scan(root: &Path, recursive: bool) -> ExtensionTally {
    Scanner::scan(root, recursive)
}

/// Copies photos under `root` into month folders of `destination_base` and
/// everything else into its `unknown` folder, with default settings.
///
/// Shorthand for [`Organizer::organize`] on [`Organizer::new`].
pub fn organize(root: &Path, destination_base: &Path) -> OrganizeReport {
    Organizer::new().organize(root, destination_base)
}
