/// In-place renaming of images after their modification time.
///
/// Each image directly inside a directory is renamed to
/// `YYYYMMDD_HHMMSS<ext>` (optionally with microseconds). Unlike the
/// organizer, which overwrites same-named copies, the renamer never replaces
/// a file: it appends `_1`, `_2`, ... until the name is free.
use crate::classify::Classifier;
use crate::error::{OrganizeError, OrganizeResult};
use crate::walk::walk_files;
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// `strftime` pattern of renamed files.
pub const RENAME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Same as [`RENAME_FORMAT`] with six fractional digits appended.
pub const RENAME_FORMAT_SUBSEC: &str = "%Y%m%d_%H%M%S%6f";

/// Formats the new file stem for a timestamp.
///
/// ```
/// use chrono::{Local, TimeZone};
/// use photofold::rename::timestamp_stem;
///
/// let t = Local.with_ymd_and_hms(2015, 12, 24, 18, 5, 9).unwrap();
/// assert_eq!(timestamp_stem(&t, false), "20151224_180509");
/// assert_eq!(timestamp_stem(&t, true), "20151224_180509000000");
/// ```
pub fn timestamp_stem(time: &DateTime<Local>, subsecond: bool) -> String {
    let format = if subsecond {
        RENAME_FORMAT_SUBSEC
    } else {
        RENAME_FORMAT
    };
    time.format(format).to_string()
}

/// Represents the result of a rename pass.
#[derive(Debug, Default)]
pub struct RenameReport {
    /// `(old, new)` pairs, in processing order.
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Images that already carried their timestamp name.
    pub unchanged: usize,
    /// Files that could not be renamed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

impl RenameReport {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Renames images in one directory after their modification time.
#[derive(Debug, Clone, Default)]
pub struct ImageRenamer {
    classifier: Classifier,
    subsecond: bool,
}

impl ImageRenamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include microseconds in new names.
    pub fn with_subsecond(mut self, subsecond: bool) -> Self {
        self.subsecond = subsecond;
        self
    }

    /// Decide which extensions count as images.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Renames every image directly inside `directory`.
    ///
    /// Subdirectories are not visited. The original extension, including
    /// its case, is kept.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::InvalidRoot` if `directory` cannot be listed.
    /// Failures on individual files are recorded in the report instead.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use photofold::rename::ImageRenamer;
    /// use std::path::Path;
    ///
    /// let report = ImageRenamer::new().rename_images(Path::new("/photos/12-2015"))?;
    /// for (old, new) in &report.renamed {
    ///     println!("{} -> {}", old.display(), new.display());
    /// }
    /// # Ok::<(), photofold::OrganizeError>(())
    /// ```
    pub fn rename_images(&self, directory: &Path) -> OrganizeResult<RenameReport> {
        fs::read_dir(directory).map_err(|e| OrganizeError::InvalidRoot {
            path: directory.to_path_buf(),
            source: e,
        })?;

        // Listed up front: renaming while reading the directory could
        // revisit renamed files.
        let mut images = Vec::new();
        let mut report = RenameReport::default();
        for result in walk_files(directory, false, None) {
            match result {
                Ok(file) if self.classifier.is_photo_extension(&file.extension) => {
                    images.push(file.path)
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("{}", e);
                    report.failures.push((e.path().clone(), e.to_string()));
                }
            }
        }
        info!("Renaming {} images in {}", images.len(), directory.display());

        for path in images {
            match self.rename_one(&path) {
                Ok(Some(new_path)) => {
                    debug!("Renamed {} to {}", path.display(), new_path.display());
                    report.renamed.push((path, new_path));
                }
                Ok(None) => report.unchanged += 1,
                Err(e) => {
                    warn!("{}", e);
                    report.failures.push((e.path().clone(), e.to_string()));
                }
            }
        }

        Ok(report)
    }

    fn rename_one(&self, path: &Path) -> OrganizeResult<Option<PathBuf>> {
        let modified: DateTime<Local> = fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|source| OrganizeError::Timestamp {
                path: path.to_path_buf(),
                source,
            })?
            .into();

        let stem = timestamp_stem(&modified, self.subsecond);
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let Some(target) = free_name(path, &stem, &extension) else {
            return Ok(None);
        };

        fs::rename(path, &target).map_err(|e| OrganizeError::RenameFailed {
            source: path.to_path_buf(),
            destination: target.clone(),
            source_error: e,
        })?;
        Ok(Some(target))
    }
}

/// Finds the first free name `stem[_N]ext` next to `path`.
///
/// Returns `None` when `path` itself is the name that would be chosen.
fn free_name(path: &Path, stem: &str, extension: &str) -> Option<PathBuf> {
    let directory = path.parent().unwrap_or(Path::new(""));
    let mut counter = 0usize;
    loop {
        let name = if counter == 0 {
            format!("{}{}", stem, extension)
        } else {
            format!("{}_{}{}", stem, counter, extension)
        };
        let candidate = directory.join(name);
        if candidate == path {
            return None;
        }
        if !candidate.exists() {
            return Some(candidate);
        }
        counter += 1;
    }
}
