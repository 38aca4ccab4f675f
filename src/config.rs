//! Configuration: categories, classifier command and file exclusion rules.
//!
//! Configuration is read from a TOML file. Every section and key is optional:
//!
//! ```toml
//! [organizer]
//! categories = ["Documents", "Pictures", "Videos", "Personal", "Misc"]
//! allow_skip = true
//! context = "Keep tax documents where they are."
//! mode = "by_content"          # or "by_name"
//!
//! [classifier]
//! command = "llm"
//! args = ["-m", "gemini-2.5-flash"]
//!
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = ["desktop.ini", "Thumbs.db"]
//! patterns = ["*.tmp", "~$*"]
//! extensions = ["lnk", ".url"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! Filename, pattern and extension rules compare case-insensitively.

use glob::{MatchOptions, Pattern};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::ClassifyMode;

/// Errors that can occur during configuration loading and filtering.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading or writing configuration.
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
            ConfigError::IoError(msg) => write!(f, "IO error accessing configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Complete configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub organizer: OrganizerSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub filters: FilterRules,
}

/// What to sort into and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerSettings {
    /// Category names offered to the classifier; also the folder names.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Whether the classifier may answer `SKIP` to leave a file alone.
    #[serde(default = "default_allow_skip")]
    pub allow_skip: bool,
    /// Free-form instructions passed to the classifier.
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub mode: ClassifyMode,
}

fn default_categories() -> Vec<String> {
    ["Documents", "Pictures", "Videos", "Personal", "Misc"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_allow_skip() -> bool {
    true
}

impl Default for OrganizerSettings {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            allow_skip: default_allow_skip(),
            context: String::new(),
            mode: ClassifyMode::default(),
        }
    }
}

/// External command used as the classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Program that reads a prompt on stdin and answers with JSON on stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Root-level filter rules configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to include hidden files (starting with "."). Defaults to false.
    #[serde(default)]
    pub enable_hidden_files: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including files (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for excluding files from classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., "desktop.ini").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude, with or without the leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.sortwiserc.toml` in the current directory
    /// 3. Look for `~/.config/sortwise/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any discovered file is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(home_config) = Self::user_config_path()
            && home_config.exists()
        {
            return Self::load_from_file(&home_config);
        }

        Ok(Self::default())
    }

    /// `~/.config/sortwise/config.toml`, if a home directory is known.
    pub fn user_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("sortwise")
                .join("config.toml")
        })
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }
        fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Compile the filter rules into matchers.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE_NAME: &str = ".sortwiserc.toml";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Pre-compiled filter rules.
///
/// Patterns and regexes are validated and compiled once, so checking a file
/// costs one pass over the rules.
#[derive(Debug)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

/// Why a file was left out of classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    Hidden,
    Filename,
    Extension(String),
    Pattern(String),
    Regex(String),
}

impl std::fmt::Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exclusion::Hidden => write!(f, "hidden file"),
            Exclusion::Filename => write!(f, "excluded by name"),
            Exclusion::Extension(ext) => write!(f, "excluded by extension '.{}'", ext),
            Exclusion::Pattern(p) => write!(f, "matches pattern '{}'", p),
            Exclusion::Regex(r) => write!(f, "matches regex '{}'", r),
        }
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: false,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

impl CompiledFilters {
    /// Create compiled filters from filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex patterns are invalid.
    pub fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let compile_globs = |patterns: &[String]| {
            patterns
                .iter()
                .map(|pattern| {
                    Pattern::new(pattern.trim())
                        .map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };

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
            exclude_filenames: rules
                .exclude
                .filenames
                .iter()
                .map(|name| name.trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// Checks a file name against the rules.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden file filter - if hidden and disabled, exclude
    /// 3. Exact filename match
    /// 4. File extension match
    /// 5. Glob pattern match
    /// 6. Regex pattern match
    ///
    /// Returns `None` when the file should be classified.
    pub fn exclusion(&self, file_name: &str) -> Option<Exclusion> {
        if self
            .include_patterns
            .iter()
            .any(|p| p.matches_with(file_name, MATCH_OPTIONS))
        {
            return None;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return Some(Exclusion::Hidden);
        }

        let lower = file_name.to_lowercase();
        if self.exclude_filenames.contains(&lower) {
            return Some(Exclusion::Filename);
        }

        if let Some(ext) = Path::new(&lower).extension() {
            let ext = ext.to_string_lossy().to_string();
            if self.exclude_extensions.contains(&ext) {
                return Some(Exclusion::Extension(ext));
            }
        }

        if let Some(pattern) = self
            .exclude_patterns
            .iter()
            .find(|p| p.matches_with(file_name, MATCH_OPTIONS))
        {
            return Some(Exclusion::Pattern(pattern.as_str().to_string()));
        }

        self.exclude_regexes
            .iter()
            .find(|r| r.is_match(file_name))
            .map(|r| Exclusion::Regex(r.as_str().to_string()))
    }

    pub fn should_include(&self, file_name: &str) -> bool {
        self.exclusion(file_name).is_none()
    }
}
