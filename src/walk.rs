//! Directory traversal shared by the scan and organize passes.
//!
//! The walk is iterative (`walkdir` keeps its own stack of open
//! directories), so deep trees cannot exhaust the call stack. Inside each
//! directory, files come before subdirectories and both are sorted by name.
//! A directory that cannot be listed yields one error and the walk moves on
//! to its siblings.

use crate::classify::extension_of;
use crate::error::{OrganizeError, OrganizeResult};
use chrono::{DateTime, Local};
use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A regular file (or a symbolic link to one) discovered during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path, rooted at the walked directory.
    pub path: PathBuf,
    /// Always false for entries yielded by [`walk_files`]; directories are
    /// traversed, never classified.
    pub is_dir: bool,
    /// Normalized extension, see [`extension_of`].
    pub extension: String,
}

impl FileEntry {
    /// Builds an entry for a file path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        Self {
            path,
            is_dir: false,
            extension,
        }
    }

    fn from_dir_entry(entry: &DirEntry) -> Self {
        Self::from_path(entry.path())
    }

    /// The final component of the path.
    pub fn file_name(&self) -> Option<&OsStr> {
        self.path.file_name()
    }

    /// Reads the file's creation time in the local timezone.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::Timestamp` if the file vanished or the
    /// filesystem exposes no usable timestamp.
    pub fn creation_time(&self) -> OrganizeResult<DateTime<Local>> {
        fs::metadata(&self.path)
            .and_then(|metadata| creation_time(&metadata))
            .map_err(|source| OrganizeError::Timestamp {
                path: self.path.clone(),
                source,
            })
    }
}

/// Resolves the creation time recorded in `metadata`.
///
/// Uses the birth time where the platform reports one. On Unix filesystems
/// that do not record birth times, the inode change time is used instead.
pub fn creation_time(metadata: &fs::Metadata) -> io::Result<DateTime<Local>> {
    match metadata.created() {
        Ok(created) => Ok(created.into()),
        Err(err) => change_time(metadata).ok_or(err),
    }
}

#[cfg(unix)]
fn change_time(metadata: &fs::Metadata) -> Option<DateTime<Local>> {
    use std::os::unix::fs::MetadataExt;

    let nanos = u32::try_from(metadata.ctime_nsec()).ok()?;
    DateTime::from_timestamp(metadata.ctime(), nanos).map(|utc| utc.with_timezone(&Local))
}

#[cfg(not(unix))]
fn change_time(_metadata: &fs::Metadata) -> Option<DateTime<Local>> {
    None
}

/// Files first, then directories; each group by name.
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Resolves a walked entry to a file, if it is one.
///
/// Links are resolved to their target: a link to a file counts as that
/// file, a link to a directory is skipped without being entered.
fn file_entry(entry: &DirEntry) -> Option<OrganizeResult<FileEntry>> {
    if entry.file_type().is_file() {
        return Some(Ok(FileEntry::from_dir_entry(entry)));
    }
    if !entry.path_is_symlink() {
        return None;
    }
    match fs::metadata(entry.path()) {
        Ok(target) if target.is_file() => Some(Ok(FileEntry::from_dir_entry(entry))),
        Ok(_) => None,
        Err(source) => Some(Err(OrganizeError::BrokenLink {
            path: entry.path().to_path_buf(),
            source,
        })),
    }
}

fn traversal_error(err: walkdir::Error) -> OrganizeError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
    OrganizeError::Traversal { path, source }
}

/// Walks the regular files under `root`.
///
/// With `recursive` false only the direct children of `root` are listed
/// and subdirectories are skipped entirely. If `exclude` names a directory
/// inside the tree, that subtree is not entered. A symbolic link to a file
/// is reported as a file; links to directories are never followed, and a
/// link whose target cannot be read yields `OrganizeError::BrokenLink`.
///
/// # Examples
///
/// ```no_run
/// use photofold::walk::walk_files;
/// use std::path::Path;
///
/// for entry in walk_files(Path::new("/photos"), true, None) {
///     match entry {
///         Ok(file) => println!("{} ({})", file.path.display(), file.extension),
///         Err(e) => eprintln!("skipped: {}", e),
///     }
/// }
/// ```
pub fn walk_files(
    root: &Path,
    recursive: bool,
    exclude: Option<&Path>,
) -> impl Iterator<Item = OrganizeResult<FileEntry>> {
    let excluded = exclude.map(Path::to_path_buf);
    let mut walker = WalkDir::new(root).min_depth(1).sort_by(files_first);
    if !recursive {
        walker = walker.max_depth(1);
    }

    walker
        .into_iter()
        .filter_entry(move |entry| excluded.as_deref() != Some(entry.path()))
        .filter_map(|result| match result {
            Ok(entry) => file_entry(&entry),
            Err(err) => Some(Err(traversal_error(err))),
        })
}

/// Counts the files a walk would yield, ignoring traversal errors.
pub fn count_files(root: &Path, recursive: bool, exclude: Option<&Path>) -> usize {
    walk_files(root, recursive, exclude)
        .filter(Result::is_ok)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(root: &Path, recursive: bool, exclude: Option<&Path>) -> Vec<String> {
        walk_files(root, recursive, exclude)
            .filter_map(Result::ok)
            .map(|f| {
                f.path
                    .strip_prefix(root)
                    .expect("entry under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_walk_lists_files_before_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("a_sub")).unwrap();
        fs::write(root.join("a_sub/inner.txt"), "x").unwrap();
        fs::write(root.join("z.jpg"), "x").unwrap();
        fs::write(root.join("b.png"), "x").unwrap();

        assert_eq!(names(root, true, None), vec!["b.png", "z.jpg", "a_sub/inner.txt"]);
    }

    #[test]
    fn test_non_recursive_walk_skips_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("sub/deeper/c.txt"), "x").unwrap();
        fs::write(root.join("top.txt"), "x").unwrap();

        assert_eq!(names(root, false, None), vec!["top.txt"]);
    }

    #[test]
    fn test_excluded_subtree_is_not_entered() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("out/05-2023")).unwrap();
        fs::write(root.join("out/05-2023/a.jpg"), "x").unwrap();
        fs::write(root.join("a.jpg"), "x").unwrap();

        let out = root.join("out");
        assert_eq!(names(root, true, Some(&out)), vec!["a.jpg"]);
    }

    #[test]
    fn test_missing_root_yields_traversal_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("missing");

        let results: Vec<_> = walk_files(&missing, true, None).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(OrganizeError::Traversal { .. })));
    }

    #[test]
    fn test_count_files_matches_walk() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        for name in ["a.jpg", "b.txt", "sub/c.JPG"] {
            fs::write(root.join(name), "x").unwrap();
        }

        assert_eq!(count_files(root, true, None), 3);
        assert_eq!(count_files(root, false, None), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_walked_as_file() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("src");
        let outside = temp_dir.path().join("outside");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(outside.join("nested")).unwrap();
        fs::write(outside.join("target.txt"), "x").unwrap();
        fs::write(outside.join("nested/deep.jpg"), "x").unwrap();
        symlink(outside.join("target.txt"), root.join("link.txt")).unwrap();
        symlink(&outside, root.join("linked_dir")).unwrap();

        assert_eq!(names(&root, true, None), vec!["link.txt"]);
        assert_eq!(count_files(&root, true, None), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_yields_broken_link_error() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        symlink(root.join("nowhere.jpg"), root.join("dangling.jpg")).unwrap();
        fs::write(root.join("real.jpg"), "x").unwrap();

        let results: Vec<_> = walk_files(root, true, None).collect();
        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(OrganizeError::BrokenLink { path, .. }) if path.ends_with("dangling.jpg")
        )));
        assert!(results.iter().any(|r| r.is_ok()));
    }

    #[test]
    fn test_file_entry_reads_creation_time() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("a.jpg");
        fs::write(&path, "x").unwrap();

        let entry = FileEntry::from_path(&path);
        assert_eq!(entry.extension, ".jpg");
        assert!(!entry.is_dir);
        assert!(entry.creation_time().is_ok());
    }

    #[test]
    fn test_creation_time_of_vanished_file_is_timestamp_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let entry = FileEntry::from_path(temp_dir.path().join("gone.jpg"));

        assert!(matches!(
            entry.creation_time(),
            Err(OrganizeError::Timestamp { .. })
        ));
    }
}
