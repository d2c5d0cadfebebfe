//! Scan session: traversal plus classification into an ordered record list.
//!
//! A scan owns its configuration, walks the source tree, classifies every
//! candidate filename, and collects the matches as [`FileRecord`]s. Each
//! match is reported to the event sink as it is found; cancellation yields
//! the partial result accumulated so far, which is a valid input for a
//! transfer.

use crate::classify::{Category, Classifier};
use crate::config::ScanConfig;
use crate::events::{CancelToken, EventSink};
use crate::walker::TreeWalker;
use std::fs;
use std::path::PathBuf;

/// One matched file, as discovered during a scan.
///
/// Records are immutable once created and live for the length of one scan
/// session. The category is always a real category, never an excluded
/// outcome; the classifier filters those out before a record exists.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Base name without the extension.
    pub stem: String,
    /// Extension, lower-cased, leading dot included.
    pub extension: String,
    /// Size in bytes; `None` when stat failed.
    pub size: Option<u64>,
    /// Resolved category.
    pub category: Category,
}

/// The outcome of one scan: matched records, in traversal order.
///
/// Replaced wholesale on every new scan; there is no incremental merge.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub records: Vec<FileRecord>,
    /// True when the scan stopped early at the user's request.
    pub cancelled: bool,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct categories present, in order of first appearance.
    pub fn distinct_categories(&self) -> Vec<Category> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.category) {
                seen.push(record.category);
            }
        }
        seen
    }
}

/// Runs one scan over a validated configuration.
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scans the source tree, reporting each match to `sink`.
    ///
    /// The cancel token is checked at every file boundary; a cancelled scan
    /// returns the records collected up to that point with `cancelled` set.
    /// A stat failure leaves the record in with an unknown size. Sink
    /// delivery is infallible by contract, so nothing here can be aborted
    /// from the outside except through the token.
    pub fn scan(&self, token: &CancelToken, sink: &dyn EventSink) -> ScanResult {
        let classifier = Classifier::new(&self.config);
        let walker = TreeWalker::new(&self.config);

        sink.status(&format!("Scanning {}", self.config.source.display()));
        let root = walker.resolve_root(sink);

        let mut records = Vec::new();
        for (path, name) in walker.walk(&root, token) {
            let Some(category) = classifier.classify(&name) else {
                continue;
            };

            let size = fs::metadata(&path).ok().map(|meta| meta.len());
            let (stem, extension) = split_name(&name);
            let record = FileRecord {
                path,
                stem,
                extension,
                size,
                category,
            };

            sink.file_found(
                &record.stem,
                &record.extension,
                &format_size(record.size),
                &record.path,
            );
            records.push(record);

            if token.is_cancelled() {
                break;
            }
        }

        let cancelled = token.is_cancelled();
        if cancelled {
            sink.status("Scan cancelled");
        } else {
            sink.status(&format!("Scan complete, {} files matched", records.len()));
        }
        sink.scan_complete(records.len());

        ScanResult { records, cancelled }
    }
}

/// Splits a filename into stem and lower-cased extension.
fn split_name(name: &str) -> (String, String) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (name[..idx].to_string(), name[idx..].to_lowercase()),
        _ => (name.to_string(), String::new()),
    }
}

/// Formats a byte count the way the scan results present sizes.
///
/// # Examples
///
/// ```
/// use sortaway::scanner::format_size;
///
/// assert_eq!(format_size(Some(512)), "512 B");
/// assert_eq!(format_size(Some(2048)), "2.00 KB");
/// assert_eq!(format_size(None), "unknown");
/// ```
pub fn format_size(size: Option<u64>) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    let Some(bytes) = size else {
        return "unknown".to_string();
    };

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_size_thresholds() {
        assert_eq!(format_size(Some(0)), "0 B");
        assert_eq!(format_size(Some(1023)), "1023 B");
        assert_eq!(format_size(Some(1024)), "1.00 KB");
        assert_eq!(format_size(Some(2048)), "2.00 KB");
        assert_eq!(format_size(Some(5 * 1024 * 1024)), "5.00 MB");
        assert_eq!(format_size(Some(3 * 1024 * 1024 * 1024)), "3.00 GB");
        assert_eq!(format_size(None), "unknown");
    }

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("photo.JPG"),
            ("photo".to_string(), ".jpg".to_string())
        );
        assert_eq!(
            split_name("archive.tar.gz"),
            ("archive.tar".to_string(), ".gz".to_string())
        );
        assert_eq!(split_name("README"), ("README".to_string(), String::new()));
    }

    #[test]
    fn test_scan_collects_matching_records() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("photo.jpg"), vec![0u8; 2048]).expect("write");
        fs::write(temp.path().join("notes.py"), "print()").expect("write");
        fs::write(temp.path().join("archive.zip"), "zip").expect("write");

        let scanner = Scanner::new(ScanConfig::new(temp.path()));
        let result = scanner.scan(&CancelToken::new(), &NullSink);

        assert!(!result.cancelled);
        assert_eq!(result.len(), 2);

        let mut names: Vec<&str> = result
            .records
            .iter()
            .map(|record| record.stem.as_str())
            .collect();
        names.sort();
        assert_eq!(names, vec!["archive", "photo"]);

        let photo = result
            .records
            .iter()
            .find(|record| record.stem == "photo")
            .expect("photo record");
        assert_eq!(photo.extension, ".jpg");
        assert_eq!(photo.size, Some(2048));
        assert_eq!(photo.category, Category::Image);
        assert_eq!(format_size(photo.size), "2.00 KB");
    }

    #[test]
    fn test_scan_with_cancelled_token_returns_empty_partial() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("photo.jpg"), "x").expect("write");

        let token = CancelToken::new();
        token.cancel();

        let scanner = Scanner::new(ScanConfig::new(temp.path()));
        let result = scanner.scan(&token, &NullSink);

        assert!(result.cancelled);
        assert!(result.is_empty());
    }

    #[test]
    fn test_distinct_categories_preserve_first_appearance() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("a.jpg"), "x").expect("write");
        fs::write(temp.path().join("b.jpg"), "x").expect("write");
        fs::write(temp.path().join("c.zip"), "x").expect("write");

        let scanner = Scanner::new(ScanConfig::new(temp.path()));
        let result = scanner.scan(&CancelToken::new(), &NullSink);

        let categories = result.distinct_categories();
        assert_eq!(categories.len(), 2);
        assert!(categories.contains(&Category::Image));
        assert!(categories.contains(&Category::Archive));
    }
}
