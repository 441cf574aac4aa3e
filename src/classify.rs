/// File classification by extension.
///
/// Every file is either a photo, routed to a month folder, or "other",
/// collected into the catch-all folder. The decision is made from the
/// lowercased extension alone and never fails.
///
/// # Examples
///
/// ```
/// use photofold::classify::{Classifier, FileClass};
/// use std::path::Path;
///
/// let classifier = Classifier::default();
/// assert_eq!(classifier.classify(Path::new("holiday.JPG")), FileClass::Photo);
/// assert_eq!(classifier.classify(Path::new("notes.txt")), FileClass::Other);
/// ```
use std::collections::HashSet;
use std::path::Path;

/// Extensions treated as photos when no configuration overrides them.
pub const PHOTO_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff"];

/// The outcome of classifying a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileClass {
    /// Copied into a `MM-YYYY` folder named after its creation month.
    Photo,
    /// Deferred and copied into the catch-all folder at the end of a run.
    Other,
}

/// Returns the normalized extension of a path.
///
/// The result is the text after the last `.` of the file name, lowercased,
/// with the leading dot kept. Dots at the start of the name never begin an
/// extension, so dot-files such as `.bashrc` or `..bashrc` yield an empty
/// string, like files without any dot.
///
/// ```
/// use photofold::classify::extension_of;
/// use std::path::Path;
///
/// assert_eq!(extension_of(Path::new("IMG_0001.JPG")), ".jpg");
/// assert_eq!(extension_of(Path::new("archive.tar.gz")), ".gz");
/// assert_eq!(extension_of(Path::new("Makefile")), "");
/// ```
pub fn extension_of(path: &Path) -> String {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return String::new();
    };
    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => name[dot..].to_lowercase(),
        _ => String::new(),
    }
}

/// Normalizes a configured extension to the `.ext` lowercase form.
fn normalize_extension(ext: &str) -> String {
    let lower = ext.trim().to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

/// Decides whether a file is a photo or something else.
#[derive(Debug, Clone)]
pub struct Classifier {
    photo_extensions: HashSet<String>,
    legacy_prefixes: Vec<String>,
}

impl Classifier {
    /// Creates a classifier for the given photo extensions.
    ///
    /// Extensions may be given with or without the leading dot and in any
    /// case; they are normalized before use.
    pub fn new<I, S>(photo_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            photo_extensions: photo_extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
            legacy_prefixes: Vec::new(),
        }
    }

    /// Enables the legacy filename-prefix axis.
    ///
    /// Files whose name starts with one of `prefixes` are treated as photos
    /// in addition to the extension rule. Matching is case-sensitive, like
    /// the camera and year tags it was written for (`IMG`, `2021`, ...).
    pub fn with_legacy_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.legacy_prefixes = prefixes
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.is_empty())
            .collect();
        self
    }

    /// Returns true if the normalized extension belongs to the photo set.
    pub fn is_photo_extension(&self, extension: &str) -> bool {
        self.photo_extensions.contains(extension)
    }

    /// Classifies a file from its path.
    pub fn classify(&self, path: &Path) -> FileClass {
        self.classify_with_extension(path, &extension_of(path))
    }

    /// Classifies a file whose extension has already been normalized.
    pub fn classify_with_extension(&self, path: &Path, extension: &str) -> FileClass {
        if self.is_photo_extension(extension) || self.matches_legacy_prefix(path) {
            FileClass::Photo
        } else {
            FileClass::Other
        }
    }

    fn matches_legacy_prefix(&self, path: &Path) -> bool {
        if self.legacy_prefixes.is_empty() {
            return false;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        self.legacy_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(PHOTO_EXTENSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased_with_dot() {
        assert_eq!(extension_of(Path::new("a.JPG")), ".jpg");
        assert_eq!(extension_of(Path::new("dir/b.Txt")), ".txt");
    }

    #[test]
    fn test_extension_uses_last_dot() {
        assert_eq!(extension_of(Path::new("backup.2023.tar.GZ")), ".gz");
    }

    #[test]
    fn test_extensionless_files() {
        assert_eq!(extension_of(Path::new("README")), "");
        assert_eq!(extension_of(Path::new(".bashrc")), "");
        assert_eq!(extension_of(Path::new("..bashrc")), "");
        assert_eq!(extension_of(Path::new("...")), "");
    }

    #[test]
    fn test_leading_dots_do_not_hide_a_later_extension() {
        assert_eq!(extension_of(Path::new(".hidden.JPG")), ".jpg");
        assert_eq!(extension_of(Path::new("..a.b")), ".b");
        assert_eq!(extension_of(Path::new("dir.d/notes")), "");
    }

    #[test]
    fn test_trailing_dot_is_its_own_extension() {
        assert_eq!(extension_of(Path::new("weird.")), ".");
    }

    #[test]
    fn test_default_photo_set() {
        let classifier = Classifier::default();
        for name in ["a.jpg", "b.jpeg", "c.png", "d.gif", "e.bmp", "f.tiff"] {
            assert_eq!(classifier.classify(Path::new(name)), FileClass::Photo, "{name}");
        }
        for name in ["g.tif", "h.heic", "i.txt", "noext", ".hidden"] {
            assert_eq!(classifier.classify(Path::new(name)), FileClass::Other, "{name}");
        }
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(Path::new("C.JPG")), FileClass::Photo);
        assert_eq!(classifier.classify(Path::new("D.TiFf")), FileClass::Photo);
    }

    #[test]
    fn test_custom_extensions_are_normalized() {
        let classifier = Classifier::new(["HEIC", ".Webp"]);
        assert!(classifier.is_photo_extension(".heic"));
        assert!(classifier.is_photo_extension(".webp"));
        assert!(!classifier.is_photo_extension(".jpg"));
    }

    #[test]
    fn test_legacy_prefixes_add_to_extension_rule() {
        let classifier = Classifier::default().with_legacy_prefixes(["IMG", "2021"]);
        assert_eq!(classifier.classify(Path::new("IMG_0042.mov")), FileClass::Photo);
        assert_eq!(classifier.classify(Path::new("2021-trip.mp4")), FileClass::Photo);
        assert_eq!(classifier.classify(Path::new("img_0042.mov")), FileClass::Other);
        assert_eq!(classifier.classify(Path::new("scan.png")), FileClass::Photo);
    }

    #[test]
    fn test_empty_legacy_prefix_is_ignored() {
        let classifier = Classifier::default().with_legacy_prefixes([""]);
        assert_eq!(classifier.classify(Path::new("notes.txt")), FileClass::Other);
    }
}
