//! Scan configuration and exclusion rules.
//!
//! Two layers live here. [`ScanConfig`] is the per-session configuration the
//! host assembles from its inputs: source and destination roots, the
//! organize-by-type flag, which categories are enabled, and the ad-hoc
//! custom extension list. [`RulesConfig`] is the optional TOML rules file
//! that extends the built-in exclusion lists with extra extensions,
//! directory names, glob patterns, and regexes.
//!
//! # Rules File Format
//!
//! ```toml
//! [skip]
//! extensions = ["bak", ".tmp"]
//! dirs = ["Steam", "do-not-touch"]
//! patterns = ["draft_*"]
//! regex = ['^copy_of_.*$']
//! ```

use crate::classify::Category;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// System and cache directory names, pruned during traversal.
///
/// Matched as case-insensitive substrings of a directory name, so "cache"
/// also covers ".cache" and "PipCache".
const DEFAULT_SKIP_DIRS: &[&str] = &[
    "$recycle.bin",
    "system volume information",
    "recycler",
    "windows",
    "program files",
    "programdata",
    "appdata",
    "temp",
    "tmp",
    "cache",
    "__pycache__",
    "node_modules",
    ".git",
    ".svn",
];

/// Errors that can occur while assembling or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The source path does not exist.
    SourceMissing(PathBuf),
    /// The source path exists but is not a directory.
    SourceNotDirectory(PathBuf),
    /// An explicitly named rules file was not found.
    RulesNotFound(PathBuf),
    /// The rules file has invalid TOML syntax or structure.
    RulesInvalid(String),
    /// A glob pattern in the rules file failed to compile.
    InvalidGlobPattern(String),
    /// A regex in the rules file failed to compile, with the reason.
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading the rules file.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::SourceMissing(path) => {
                write!(f, "Source directory does not exist: {}", path.display())
            }
            ConfigError::SourceNotDirectory(path) => {
                write!(f, "Source path is not a directory: {}", path.display())
            }
            ConfigError::RulesNotFound(path) => {
                write!(f, "Rules file not found: {}", path.display())
            }
            ConfigError::RulesInvalid(msg) => write!(f, "Invalid rules file: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading rules file: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Exclusion rules loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub skip: SkipRules,
}

/// User-supplied additions to the built-in exclusion lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkipRules {
    /// Extra file extensions to skip (with or without the leading dot).
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Extra directory-name substrings to prune.
    #[serde(default)]
    pub dirs: Vec<String>,

    /// Glob patterns matched against filenames.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns matched against filenames.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl RulesConfig {
    /// Loads the rules file, with fallback to defaults.
    ///
    /// Resolution order:
    /// 1. An explicitly provided path (missing file is an error)
    /// 2. `.sortaway.toml` in the current directory
    /// 3. `~/.config/sortaway/rules.toml`
    /// 4. Built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        let local = PathBuf::from(".sortaway.toml");
        if local.exists() {
            return Self::load_from_file(&local);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_rules = PathBuf::from(home)
                .join(".config")
                .join("sortaway")
                .join("rules.toml");
            if home_rules.exists() {
                return Self::load_from_file(&home_rules);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::RulesNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::RulesInvalid(e.to_string()))
    }

    /// Compiles the rules into matcher structures, validating every pattern.
    pub fn compile(self) -> Result<CompiledSkipRules, ConfigError> {
        CompiledSkipRules::new(self.skip)
    }
}

/// Pre-compiled exclusion rules: built-in lists merged with user extras.
///
/// Compiled once per configuration so that matching during a scan never
/// reparses a pattern.
#[derive(Debug, Clone)]
pub struct CompiledSkipRules {
    dir_substrings: Vec<String>,
    pub(crate) extra_extensions: HashSet<String>,
    pub(crate) name_patterns: Vec<Pattern>,
    pub(crate) name_regexes: Vec<Regex>,
}

impl CompiledSkipRules {
    fn new(rules: SkipRules) -> Result<Self, ConfigError> {
        let dir_substrings = DEFAULT_SKIP_DIRS
            .iter()
            .map(|dir| dir.to_string())
            .chain(rules.dirs.iter().map(|dir| dir.to_lowercase()))
            .collect();

        let extra_extensions = rules
            .extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .collect();

        let name_patterns = rules
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let name_regexes = rules
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
            dir_substrings,
            extra_extensions,
            name_patterns,
            name_regexes,
        })
    }

    /// Returns true if a directory with this name must be pruned.
    pub fn skips_dir(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.dir_substrings
            .iter()
            .any(|skip| lower.contains(skip.as_str()))
    }
}

impl Default for CompiledSkipRules {
    fn default() -> Self {
        // built-in lists contain no user patterns, compilation cannot fail
        Self::new(SkipRules::default()).expect("built-in skip rules are valid")
    }
}

/// Configuration for one scan-and-transfer session.
///
/// The host builds this from its inputs and passes it by value into the
/// worker; nothing in here is shared mutable state.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root of the tree to scan.
    pub source: PathBuf,
    /// Transfer target root. During scanning it is only used to skip
    /// anything already under it.
    pub destination: Option<PathBuf>,
    /// Create one subdirectory per category inside the batch directory.
    pub organize_by_type: bool,
    /// The predefined categories to match. Defaults to all of them.
    pub enabled: HashSet<Category>,
    /// Ad-hoc extensions forming the session's custom category.
    pub custom_extensions: Vec<String>,
    /// Narrow messaging-app export trees to their `msg` subdirectory.
    pub messaging_redirect: bool,
    /// Compiled exclusion rules.
    pub rules: CompiledSkipRules,
}

impl ScanConfig {
    /// Creates a configuration with defaults: every category enabled,
    /// organize-by-type on, no destination, no custom extensions.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: None,
            organize_by_type: true,
            enabled: Category::predefined().collect(),
            custom_extensions: Vec::new(),
            messaging_redirect: true,
            rules: CompiledSkipRules::default(),
        }
    }

    /// Rejects configurations that cannot be scanned.
    ///
    /// Runs before any worker starts; the scan itself assumes a valid
    /// source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source.exists() {
            return Err(ConfigError::SourceMissing(self.source.clone()));
        }
        if !self.source.is_dir() {
            return Err(ConfigError::SourceNotDirectory(self.source.clone()));
        }
        Ok(())
    }
}

/// Parses a comma-separated custom extension list into normalized tokens.
///
/// Tokens are trimmed, lower-cased, and dot-prefixed; empty entries are
/// discarded. Order is preserved.
///
/// # Examples
///
/// ```
/// use sortaway::config::parse_custom_extensions;
///
/// let exts = parse_custom_extensions(" .XYZ, abc ,, .def ");
/// assert_eq!(exts, vec![".xyz", ".abc", ".def"]);
/// ```
pub fn parse_custom_extensions(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(normalize_extension)
        .collect()
}

/// Lower-cases an extension token and ensures the leading dot.
fn normalize_extension(token: &str) -> String {
    let lower = token.trim().to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_enables_all_categories() {
        let config = ScanConfig::new("/tmp/in");
        assert_eq!(config.enabled.len(), Category::predefined().count());
        assert!(config.organize_by_type);
        assert!(config.messaging_redirect);
        assert!(config.custom_extensions.is_empty());
    }

    #[test]
    fn test_validate_missing_source() {
        let config = ScanConfig::new("/definitely/not/here");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SourceMissing(_))
        ));
    }

    #[test]
    fn test_validate_source_is_file() {
        let temp = TempDir::new().expect("temp dir");
        let file_path = temp.path().join("plain.txt");
        fs::write(&file_path, "not a directory").expect("write file");

        let config = ScanConfig::new(&file_path);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SourceNotDirectory(_))
        ));
    }

    #[test]
    fn test_validate_accepts_directory() {
        let temp = TempDir::new().expect("temp dir");
        let config = ScanConfig::new(temp.path());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_custom_extensions_normalizes() {
        assert_eq!(
            parse_custom_extensions(".XYZ,abc, .DeF "),
            vec![".xyz", ".abc", ".def"]
        );
    }

    #[test]
    fn test_parse_custom_extensions_discards_empty_tokens() {
        assert_eq!(parse_custom_extensions(",, ,"), Vec::<String>::new());
        assert_eq!(parse_custom_extensions(""), Vec::<String>::new());
    }

    #[test]
    fn test_default_rules_skip_system_dirs() {
        let rules = CompiledSkipRules::default();
        assert!(rules.skips_dir("node_modules"));
        assert!(rules.skips_dir("NODE_MODULES"));
        assert!(rules.skips_dir("__pycache__"));
        assert!(rules.skips_dir(".cache"));
        assert!(rules.skips_dir("Temporary Items"));
        assert!(!rules.skips_dir("photos"));
    }

    #[test]
    fn test_extra_dirs_merge_with_defaults() {
        let rules = RulesConfig {
            skip: SkipRules {
                dirs: vec!["Steam".to_string()],
                ..Default::default()
            },
        }
        .compile()
        .expect("rules should compile");

        assert!(rules.skips_dir("steamapps"));
        assert!(rules.skips_dir("node_modules"));
    }

    #[test]
    fn test_extra_extensions_are_normalized() {
        let rules = RulesConfig {
            skip: SkipRules {
                extensions: vec!["BAK".to_string(), ".tmp".to_string()],
                ..Default::default()
            },
        }
        .compile()
        .expect("rules should compile");

        assert!(rules.extra_extensions.contains(".bak"));
        assert!(rules.extra_extensions.contains(".tmp"));
    }

    #[test]
    fn test_invalid_glob_pattern_is_rejected() {
        let result = RulesConfig {
            skip: SkipRules {
                patterns: vec!["[invalid".to_string()],
                ..Default::default()
            },
        }
        .compile();

        assert!(matches!(result, Err(ConfigError::InvalidGlobPattern(_))));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let result = RulesConfig {
            skip: SkipRules {
                regex: vec!["[invalid(".to_string()],
                ..Default::default()
            },
        }
        .compile();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidRegexPattern { .. })
        ));
    }

    #[test]
    fn test_load_explicit_missing_path_is_error() {
        let result = RulesConfig::load(Some(Path::new("/no/such/rules.toml")));
        assert!(matches!(result, Err(ConfigError::RulesNotFound(_))));
    }

    #[test]
    fn test_load_explicit_rules_file() {
        let temp = TempDir::new().expect("temp dir");
        let rules_path = temp.path().join("rules.toml");
        let mut file = fs::File::create(&rules_path).expect("create rules file");
        writeln!(
            file,
            "[skip]\nextensions = [\"bak\"]\ndirs = [\"Steam\"]\npatterns = [\"draft_*\"]"
        )
        .expect("write rules file");

        let rules = RulesConfig::load(Some(&rules_path)).expect("rules should load");
        assert_eq!(rules.skip.extensions, vec!["bak"]);
        assert_eq!(rules.skip.dirs, vec!["Steam"]);

        let compiled = rules.compile().expect("rules should compile");
        assert!(compiled.extra_extensions.contains(".bak"));
        assert!(compiled.skips_dir("SteamLibrary"));
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let temp = TempDir::new().expect("temp dir");
        let rules_path = temp.path().join("rules.toml");
        fs::write(&rules_path, "not [ valid toml").expect("write rules file");

        let result = RulesConfig::load(Some(&rules_path));
        assert!(matches!(result, Err(ConfigError::RulesInvalid(_))));
    }
}
