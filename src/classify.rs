/// File classification for the scan pipeline.
///
/// This module decides, from a filename alone, whether a file is worth
/// transferring and which category it belongs to. Hidden files, known system
/// files, source code, and program binaries are filtered out; everything else
/// is matched against the predefined category table and the session's custom
/// extension list.
///
/// # Examples
///
/// ```
/// use sortaway::classify::{Category, Classifier};
/// use sortaway::config::ScanConfig;
///
/// let config = ScanConfig::new("/data/inbox");
/// let classifier = Classifier::new(&config);
/// assert_eq!(classifier.classify("photo.JPG"), Some(Category::Image));
/// assert_eq!(classifier.classify("notes.py"), None);
/// assert_eq!(classifier.classify(".hidden.png"), None);
/// ```
use crate::config::ScanConfig;
use std::collections::{HashMap, HashSet};

/// Represents a file category used to route files into subfolders.
///
/// The predefined variants mirror the common user file types the tool
/// targets; [`Category::Custom`] is a session-only category backed by a
/// user-supplied extension list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Image files (JPG, PNG, GIF).
    Image,
    /// Music files (MP3).
    Music,
    /// Video files (MP4).
    Video,
    /// Document files (PDF, DOC, TXT).
    Document,
    /// Spreadsheet files (XLS, XLSX, CSV).
    Spreadsheet,
    /// Presentation files (PPT, PPTX).
    Presentation,
    /// Archive files (ZIP, RAR, 7Z).
    Archive,
    /// Ad-hoc category defined by the session's custom extension list.
    Custom,
}

/// The predefined category table, in declaration order.
///
/// Declaration order is significant: the extension index is built
/// first-insert-wins, so an extension can never silently move between
/// categories across runs.
const CATEGORY_TABLE: &[(Category, &[&str])] = &[
    (Category::Image, &[".jpg", ".jpeg", ".png", ".gif"]),
    (Category::Music, &[".mp3"]),
    (Category::Video, &[".mp4"]),
    (Category::Document, &[".pdf", ".doc", ".docx", ".txt"]),
    (Category::Spreadsheet, &[".xls", ".xlsx", ".csv"]),
    (Category::Presentation, &[".ppt", ".pptx"]),
    (Category::Archive, &[".zip", ".rar", ".7z"]),
];

/// Program and installer extensions, never transferred.
const PROGRAM_EXTENSIONS: &[&str] = &[
    ".exe", ".msi", ".dmg", ".pkg", ".deb", ".rpm", ".apk", ".app", ".command",
    ".appimage", ".snap", ".flatpak", ".bin", ".run", ".out", ".jar", ".war",
];

/// Source, config, and markup extensions, never transferred.
const CODE_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".html", ".css", ".java", ".cpp", ".c", ".h", ".cs", ".php",
    ".rb", ".go", ".rs", ".swift", ".kt", ".scala", ".r", ".m", ".sh", ".bat",
    ".ps1", ".sql", ".xml", ".json", ".yaml", ".yml", ".toml", ".ini", ".cfg",
    ".conf", ".log", ".md", ".tex", ".less", ".sass", ".scss", ".vue", ".jsx",
    ".tsx", ".ts", ".dart", ".lua", ".pl", ".vb", ".asm", ".s", ".dockerfile",
];

/// Well-known system file basenames, compared lower-cased.
const SKIP_BASENAMES: &[&str] = &["thumbs.db", "desktop.ini", "ds_store"];

impl Category {
    /// Returns the predefined categories, in table order.
    pub fn predefined() -> impl Iterator<Item = Category> {
        CATEGORY_TABLE.iter().map(|(category, _)| *category)
    }

    /// Returns the subdirectory name used when organizing by type.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortaway::classify::Category;
    ///
    /// assert_eq!(Category::Image.dir_name(), "images");
    /// assert_eq!(Category::Custom.dir_name(), "custom");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Image => "images",
            Category::Music => "music",
            Category::Video => "videos",
            Category::Document => "documents",
            Category::Spreadsheet => "spreadsheets",
            Category::Presentation => "presentations",
            Category::Archive => "archives",
            Category::Custom => "custom",
        }
    }

    /// Returns a human-readable name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Image => "Image",
            Category::Music => "Music",
            Category::Video => "Video",
            Category::Document => "Document",
            Category::Spreadsheet => "Spreadsheet",
            Category::Presentation => "Presentation",
            Category::Archive => "Archive",
            Category::Custom => "Custom",
        }
    }

    /// Parses a category name as given on the command line.
    ///
    /// Accepts the display name or the directory name, case-insensitive.
    /// [`Category::Custom`] is session-only and cannot be named here.
    pub fn parse(name: &str) -> Option<Category> {
        match name.trim().to_lowercase().as_str() {
            "image" | "images" => Some(Category::Image),
            "music" => Some(Category::Music),
            "video" | "videos" => Some(Category::Video),
            "document" | "documents" => Some(Category::Document),
            "spreadsheet" | "spreadsheets" => Some(Category::Spreadsheet),
            "presentation" | "presentations" => Some(Category::Presentation),
            "archive" | "archives" => Some(Category::Archive),
            _ => None,
        }
    }
}

/// Maps filenames to categories against a fixed rule set.
///
/// Built once per scan from a [`ScanConfig`]; all lookups afterwards are
/// hash-set membership checks, so classification stays cheap over large
/// trees. [`Classifier::classify`] is pure: identical input and config
/// always produce the same answer.
#[derive(Debug, Clone)]
pub struct Classifier {
    extension_index: HashMap<String, Category>,
    skip_extensions: HashSet<String>,
    custom_extensions: HashSet<String>,
    name_patterns: Vec<glob::Pattern>,
    name_regexes: Vec<regex::Regex>,
}

impl Classifier {
    /// Builds a classifier for the given configuration.
    ///
    /// The extension index only contains extensions of enabled categories;
    /// the skip set merges the program and code tables with any extra
    /// extensions from the exclusion rules file.
    pub fn new(config: &ScanConfig) -> Self {
        let mut extension_index = HashMap::new();
        for (category, extensions) in CATEGORY_TABLE {
            if !config.enabled.contains(category) {
                continue;
            }
            for ext in *extensions {
                // first declaration wins
                extension_index.entry(ext.to_string()).or_insert(*category);
            }
        }

        let skip_extensions = PROGRAM_EXTENSIONS
            .iter()
            .chain(CODE_EXTENSIONS.iter())
            .map(|ext| ext.to_string())
            .chain(config.rules.extra_extensions.iter().cloned())
            .collect();

        Self {
            extension_index,
            skip_extensions,
            custom_extensions: config.custom_extensions.iter().cloned().collect(),
            name_patterns: config.rules.name_patterns.clone(),
            name_regexes: config.rules.name_regexes.clone(),
        }
    }

    /// Classifies a filename, returning `None` for anything that must not
    /// be scanned or transferred.
    ///
    /// Checks run in a fixed order: hidden files, known system basenames,
    /// user filename filters, skip extensions, custom extensions, and
    /// finally the predefined category index. Custom extensions win over
    /// predefined categories regardless of which categories are enabled.
    pub fn classify(&self, filename: &str) -> Option<Category> {
        if filename.starts_with('.') {
            return None;
        }

        let lower = filename.to_lowercase();
        if SKIP_BASENAMES.contains(&lower.as_str()) {
            return None;
        }

        if self.matches_name_filter(filename) {
            return None;
        }

        let ext = extension_of(&lower)?;
        if self.skip_extensions.contains(ext) {
            return None;
        }
        if self.custom_extensions.contains(ext) {
            return Some(Category::Custom);
        }

        self.extension_index.get(ext).copied()
    }

    /// Checks the filename against the user-supplied glob and regex filters.
    fn matches_name_filter(&self, filename: &str) -> bool {
        self.name_patterns
            .iter()
            .any(|pattern| pattern.matches(filename))
            || self.name_regexes.iter().any(|re| re.is_match(filename))
    }
}

/// Extracts the extension of a lower-cased filename, leading dot included.
///
/// A dot in the first position marks a hidden file, not an extension.
fn extension_of(lower: &str) -> Option<&str> {
    match lower.rfind('.') {
        Some(idx) if idx > 0 => Some(&lower[idx..]),
        _ => None,
    }
}
