/// Photo organization: copy photos into month folders, everything else into
/// a catch-all folder.
///
/// A run walks the whole tree once. Photos are copied as soon as they are
/// found, into `<dest>/<MM-YYYY>/` named after their creation month. Every
/// other file is queued and copied into `<dest>/unknown/` after the walk.
/// Failures are logged and recorded per item; nothing aborts the run and
/// nothing already copied is rolled back.
use crate::classify::{Classifier, FileClass};
use crate::config::{CompiledFilters, Config, ConfigError};
use crate::error::{OrganizeError, OrganizeResult};
use crate::walk::{FileEntry, count_files, walk_files};
use chrono::{DateTime, TimeZone};
use filetime::FileTime;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::fmt::Display;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the catch-all folder for non-photo files.
pub const UNKNOWN_FOLDER: &str = "unknown";

/// `strftime` pattern of month folder names (`05-2023`).
pub const MONTH_FOLDER_FORMAT: &str = "%m-%Y";

/// Formats a timestamp as a month folder name, `MM-YYYY`.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use photofold::organizer::month_folder_name;
///
/// let taken = Local.with_ymd_and_hms(2023, 5, 10, 12, 0, 0).unwrap();
/// assert_eq!(month_folder_name(&taken), "05-2023");
/// ```
pub fn month_folder_name<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    time.format(MONTH_FOLDER_FORMAT).to_string()
}

/// A single copy performed, or planned in a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOperation {
    /// The file that was copied.
    pub source: PathBuf,
    /// Where the copy landed.
    pub destination: PathBuf,
    /// The destination folder name (`MM-YYYY` or the catch-all).
    pub folder: String,
    /// Whether a file with the same name was replaced.
    pub overwritten: bool,
}

/// Non-photo files waiting for the final catch-all pass.
///
/// Paths keep their discovery order and are consumed exactly once.
#[derive(Debug, Default)]
pub struct DeferredFiles {
    paths: Vec<PathBuf>,
}

impl DeferredFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a file.
    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl IntoIterator for DeferredFiles {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

/// The outcome of an organize run.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Files found by the up-front count. Advisory: the tree may change
    /// while the run is in progress.
    pub total_discovered: usize,
    /// Photos copied into month folders.
    pub photos_copied: usize,
    /// Non-photo files copied into the catch-all folder.
    pub others_copied: usize,
    /// Non-photo files queued for the catch-all pass.
    pub deferred: usize,
    /// Copies that replaced a file with the same name.
    pub overwritten: usize,
    /// Files left alone because the configured filters excluded them.
    pub filtered: usize,
    /// Copies that a dry run would have made.
    pub planned: Vec<CopyOperation>,
    /// Items that failed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

impl OrganizeReport {
    /// Total number of files copied.
    pub fn copied(&self) -> usize {
        self.photos_copied + self.others_copied
    }

    /// Returns true if no item failed.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_failure(&mut self, error: &OrganizeError) {
        warn!("{}", error);
        self.failures
            .push((error.path().clone(), error.to_string()));
    }
}

/// Copies photos into month folders and everything else into a catch-all
/// folder.
pub struct Organizer {
    classifier: Classifier,
    filters: Option<CompiledFilters>,
    unknown_folder: String,
    preserve_times: bool,
    dry_run: bool,
    progress: ProgressBar,
}

impl Default for Organizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Organizer {
    /// Creates an organizer with the default photo extensions, no filters
    /// and a hidden progress bar.
    pub fn new() -> Self {
        Self {
            classifier: Classifier::default(),
            filters: None,
            unknown_folder: UNKNOWN_FOLDER.to_string(),
            preserve_times: true,
            dry_run: false,
            progress: ProgressBar::hidden(),
        }
    }

    /// Creates an organizer from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a filter pattern is invalid or the catch-all
    /// folder name is not a plain folder name.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.organize.validate()?;
        let classifier = config.organize.classifier();
        let unknown_folder = config.organize.unknown_folder.clone();
        let preserve_times = config.organize.preserve_times;
        let filters = config.compile()?;

        Ok(Self {
            classifier,
            filters: Some(filters),
            unknown_folder,
            preserve_times,
            ..Self::new()
        })
    }

    /// Replaces the classifier.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Reports progress on `progress`; its length is set when a run starts.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// When enabled, destinations are computed and reported but nothing is
    /// created or copied.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Organizes every file under `root` into `destination_base`.
    ///
    /// Both paths are expected to be existing directories. If the
    /// destination lies inside `root`, it is left out of the walk.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use photofold::organizer::Organizer;
    /// use std::path::Path;
    ///
    /// let report = Organizer::new().organize(Path::new("/camera"), Path::new("/sorted"));
    /// println!(
    ///     "{} photos, {} other files, {} failures",
    ///     report.photos_copied,
    ///     report.others_copied,
    ///     report.failures.len()
    /// );
    /// ```
    pub fn organize(&self, root: &Path, destination_base: &Path) -> OrganizeReport {
        let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let destination_base =
            fs::canonicalize(destination_base).unwrap_or_else(|_| destination_base.to_path_buf());
        let exclude = (destination_base != root && destination_base.starts_with(&root))
            .then_some(destination_base.as_path());

        let mut report = OrganizeReport {
            total_discovered: count_files(&root, true, exclude),
            ..OrganizeReport::default()
        };
        info!(
            "Organizing {} files from {} into {}",
            report.total_discovered,
            root.display(),
            destination_base.display()
        );
        self.progress.set_length(report.total_discovered as u64);

        let mut deferred = DeferredFiles::new();
        for result in walk_files(&root, true, exclude) {
            match result {
                Ok(file) => {
                    self.process_file(&root, &destination_base, file, &mut deferred, &mut report);
                    self.progress.inc(1);
                }
                Err(e) => report.record_failure(&e),
            }
        }

        report.deferred = deferred.len();
        self.copy_deferred(deferred, &destination_base, &mut report);

        self.progress.finish_and_clear();
        info!(
            "Organize finished: {} photos, {} other files, {} failures",
            report.photos_copied,
            report.others_copied,
            report.failures.len()
        );
        report
    }

    fn process_file(
        &self,
        root: &Path,
        destination_base: &Path,
        file: FileEntry,
        deferred: &mut DeferredFiles,
        report: &mut OrganizeReport,
    ) {
        if let Some(filters) = &self.filters {
            let relative = file.path.strip_prefix(root).unwrap_or(&file.path);
            if !filters.should_include(relative) {
                debug!("Filtered out {}", file.path.display());
                report.filtered += 1;
                return;
            }
        }

        match self
            .classifier
            .classify_with_extension(&file.path, &file.extension)
        {
            FileClass::Photo => match self.copy_photo(&file, destination_base) {
                Ok(operation) => {
                    report.photos_copied += usize::from(!self.dry_run);
                    self.record_copy(operation, report);
                }
                Err(e) => report.record_failure(&e),
            },
            FileClass::Other => {
                debug!("Deferred {}", file.path.display());
                deferred.push(file.path);
            }
        }
    }

    fn copy_photo(&self, file: &FileEntry, destination_base: &Path) -> OrganizeResult<CopyOperation> {
        let folder = month_folder_name(&file.creation_time()?);
        self.copy_into(&file.path, destination_base, &folder)
    }

    fn copy_deferred(
        &self,
        deferred: DeferredFiles,
        destination_base: &Path,
        report: &mut OrganizeReport,
    ) {
        if deferred.is_empty() {
            return;
        }
        info!(
            "Copying {} other files into {}/",
            deferred.len(),
            self.unknown_folder
        );

        for path in deferred {
            match self.copy_into(&path, destination_base, &self.unknown_folder) {
                Ok(operation) => {
                    report.others_copied += usize::from(!self.dry_run);
                    self.record_copy(operation, report);
                }
                Err(e) => report.record_failure(&e),
            }
        }
    }

    fn record_copy(&self, operation: CopyOperation, report: &mut OrganizeReport) {
        if operation.overwritten {
            report.overwritten += 1;
        }
        if self.dry_run {
            report.planned.push(operation);
        }
    }

    /// Copies `source` into `<destination_base>/<folder>/` under its own name.
    ///
    /// The folder is created if needed. A same-named file already there is
    /// replaced.
    fn copy_into(
        &self,
        source: &Path,
        destination_base: &Path,
        folder: &str,
    ) -> OrganizeResult<CopyOperation> {
        let folder_path = destination_base.join(folder);
        let file_name = source
            .file_name()
            .ok_or_else(|| OrganizeError::CopyFailed {
                source: source.to_path_buf(),
                destination: folder_path.clone(),
                source_error: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;
        let destination = folder_path.join(file_name);
        let overwritten = destination.exists();

        if !self.dry_run {
            fs::create_dir_all(&folder_path).map_err(|e| {
                OrganizeError::DirectoryCreationFailed {
                    path: folder_path.clone(),
                    source: e,
                }
            })?;

            copy_file(source, &destination, self.preserve_times).map_err(|e| {
                OrganizeError::CopyFailed {
                    source: source.to_path_buf(),
                    destination: destination.clone(),
                    source_error: e,
                }
            })?;
            debug!("Copied {} to {}", source.display(), destination.display());
        }

        Ok(CopyOperation {
            source: source.to_path_buf(),
            destination,
            folder: folder.to_string(),
            overwritten,
        })
    }
}

/// Copies `source` to `destination`, replacing it if present.
///
/// The data lands in a temporary file in the destination folder first and
/// is renamed over the destination, so a reader never sees a half-written
/// file under the final name. The temporary file is removed if any step
/// fails. Permissions are copied; access and modification times too when
/// `preserve_times` is set.
pub fn copy_file(source: &Path, destination: &Path, preserve_times: bool) -> io::Result<()> {
    let folder = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut reader = File::open(source)?;
    let metadata = reader.metadata()?;

    let mut temp = NamedTempFile::new_in(folder)?;
    io::copy(&mut reader, temp.as_file_mut())?;
    fs::set_permissions(temp.path(), metadata.permissions())?;
    if preserve_times {
        filetime::set_file_times(
            temp.path(),
            FileTime::from_last_access_time(&metadata),
            FileTime::from_last_modification_time(&metadata),
        )?;
    }
    temp.persist(destination).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_month_folder_name_pads_month() {
        let january = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(month_folder_name(&january), "01-2022");

        let december = Utc.with_ymd_and_hms(2019, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(month_folder_name(&december), "12-2019");
    }

    #[test]
    fn test_month_folder_name_uses_the_given_timezone() {
        let utc = Utc.with_ymd_and_hms(2023, 4, 30, 23, 30, 0).unwrap();
        let east = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(month_folder_name(&utc), "04-2023");
        assert_eq!(month_folder_name(&east), "05-2023");
    }

    #[test]
    fn test_copy_file_replaces_existing_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("a.jpg");
        let destination = temp_dir.path().join("copy.jpg");
        fs::write(&source, "new").unwrap();
        fs::write(&destination, "old").unwrap();

        copy_file(&source, &destination, true).expect("copy failed");

        assert_eq!(fs::read_to_string(&destination).unwrap(), "new");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_copy_file_preserves_modification_time() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("a.jpg");
        let destination = temp_dir.path().join("b.jpg");
        fs::write(&source, "data").unwrap();
        let mtime = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&source, mtime).unwrap();

        copy_file(&source, &destination, true).expect("copy failed");

        let copied = fs::metadata(&destination).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&copied), mtime);
    }

    #[test]
    fn test_copy_file_missing_source_leaves_nothing_behind() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let destination = temp_dir.path().join("b.jpg");

        let result = copy_file(&temp_dir.path().join("gone.jpg"), &destination, true);

        assert!(result.is_err());
        assert!(!destination.exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_file_handles_names_at_the_length_limit() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let name = format!("{}.txt", "a".repeat(250));
        let source = temp_dir.path().join(&name);
        let dest_folder = temp_dir.path().join(UNKNOWN_FOLDER);
        fs::create_dir(&dest_folder).unwrap();
        fs::write(&source, "long").unwrap();

        copy_file(&source, &dest_folder.join(&name), true).expect("copy failed");

        assert_eq!(fs::read_to_string(dest_folder.join(&name)).unwrap(), "long");
        assert_eq!(fs::read_dir(&dest_folder).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_file_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("script.sh");
        let destination = temp_dir.path().join("copy.sh");
        fs::write(&source, "#!/bin/sh").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o754)).unwrap();

        copy_file(&source, &destination, false).expect("copy failed");

        let mode = fs::metadata(&destination).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o754);
    }

    #[test]
    fn test_deferred_files_keep_order() {
        let mut deferred = DeferredFiles::new();
        deferred.push(PathBuf::from("b.txt"));
        deferred.push(PathBuf::from("a.txt"));
        assert_eq!(deferred.len(), 2);

        let paths: Vec<_> = deferred.into_iter().collect();
        assert_eq!(paths, vec![PathBuf::from("b.txt"), PathBuf::from("a.txt")]);
    }

    #[test]
    fn test_organize_copies_photo_into_month_folder() {
        let source_dir = TempDir::new().expect("Failed to create temp directory");
        let dest_dir = TempDir::new().expect("Failed to create temp directory");
        let photo = source_dir.path().join("a.jpg");
        fs::write(&photo, "jpeg bytes").unwrap();
        let folder = month_folder_name(&FileEntry::from_path(&photo).creation_time().unwrap());

        let report = Organizer::new().organize(source_dir.path(), dest_dir.path());

        assert_eq!(report.photos_copied, 1);
        assert_eq!(report.others_copied, 0);
        assert!(report.is_complete_success());
        let copied = dest_dir.path().join(folder).join("a.jpg");
        assert_eq!(fs::read(&copied).unwrap(), b"jpeg bytes");
        assert!(photo.exists(), "source must be left in place");
    }

    #[test]
    fn test_organize_defers_other_files_to_unknown() {
        let source_dir = TempDir::new().expect("Failed to create temp directory");
        let dest_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(source_dir.path().join("sub")).unwrap();
        fs::write(source_dir.path().join("sub/b.txt"), "text").unwrap();

        let report = Organizer::new().organize(source_dir.path(), dest_dir.path());

        assert_eq!(report.deferred, 1);
        assert_eq!(report.others_copied, 1);
        assert!(dest_dir.path().join("unknown/b.txt").is_file());
    }

    #[test]
    fn test_dry_run_plans_without_copying() {
        let source_dir = TempDir::new().expect("Failed to create temp directory");
        let dest_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(source_dir.path().join("a.png"), "x").unwrap();
        fs::write(source_dir.path().join("b.txt"), "x").unwrap();

        let report = Organizer::new()
            .dry_run(true)
            .organize(source_dir.path(), dest_dir.path());

        assert_eq!(report.copied(), 0);
        assert_eq!(report.planned.len(), 2);
        assert_eq!(report.planned[1].folder, UNKNOWN_FOLDER);
        assert_eq!(fs::read_dir(dest_dir.path()).unwrap().count(), 0);
    }
}
