//! Configuration: which files count as photos, where the rest goes, and
//! which files the organizer leaves alone.
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db", ".DS_Store"]
//! patterns = ["*.tmp", "cache/**"]
//! extensions = ["part"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//!
//! [organize]
//! photo_extensions = [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff"]
//! unknown_folder = "unknown"
//! legacy_prefixes = []
//! preserve_times = true
//! ```
//!
//! Every section and key is optional. Filters apply to the organize pass
//! only; a scan always counts every file.

use crate::classify::{Classifier, PHOTO_EXTENSIONS, extension_of};
use crate::organizer::UNKNOWN_FOLDER;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".photofoldrc.toml";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax, structure or values.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// Why it failed.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which files the organizer skips.
    pub filters: FilterRules,
    /// How files are classified and where they go.
    pub organize: OrganizeRules,
}

/// Filter rules for the organize pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to organize hidden files (starting with "."). Defaults to
    /// true so that every file reaches a destination.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules that override `exclude` and the hidden-file switch.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Files the organizer should not touch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the path relative to the scanned root.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions, with or without the leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Whitelist that wins over every exclude rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Classification and destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizeRules {
    /// Extensions copied into month folders.
    pub photo_extensions: Vec<String>,
    /// Name of the catch-all folder for everything else.
    pub unknown_folder: String,
    /// Filename prefixes that also mark a file as a photo. Experimental;
    /// empty by default.
    pub legacy_prefixes: Vec<String>,
    /// Copy access and modification times along with the data.
    pub preserve_times: bool,
}

impl Default for OrganizeRules {
    fn default() -> Self {
        Self {
            photo_extensions: PHOTO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            unknown_folder: UNKNOWN_FOLDER.to_string(),
            legacy_prefixes: Vec::new(),
            preserve_times: true,
        }
    }
}

impl OrganizeRules {
    /// Checks that the catch-all folder is a single plain folder name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigInvalid` for empty names, `.`/`..` or
    /// names containing a path separator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut components = Path::new(&self.unknown_folder).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(ConfigError::ConfigInvalid(format!(
                "unknown_folder must be a plain folder name, got '{}'",
                self.unknown_folder
            ))),
        }
    }

    /// Builds the classifier these rules describe.
    pub fn classifier(&self) -> Classifier {
        Classifier::new(&self.photo_extensions)
            .with_legacy_prefixes(self.legacy_prefixes.iter().cloned())
    }
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if provided
    /// 2. `.photofoldrc.toml` in the current directory
    /// 3. `~/.config/photofold/config.toml`
    /// 4. Built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any file found is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("photofold")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile the filter rules for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(self.filters)
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

/// Filter rules with every pattern compiled up front.
#[derive(Debug)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// Check whether the organizer should handle a file.
    ///
    /// `file_path` is the path relative to the organized root. Checks run in
    /// this order:
    /// 1. Include patterns: a match always includes
    /// 2. Hidden files, when disabled
    /// 3. Exact filename
    /// 4. Extension
    /// 5. Glob patterns
    /// 6. Regex patterns on the file name
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(file_path))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        let extension = extension_of(file_path);
        if !extension.is_empty()
            && self
                .exclude_extensions
                .contains(extension.trim_start_matches('.'))
        {
            return false;
        }

        let excluded_by_pattern = self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(file_path))
            || self
                .exclude_regexes
                .iter()
                .any(|regex| regex.is_match(&file_name));

        !excluded_by_pattern
    }
}
