//! Transfer engine: relocates scanned files into a timestamped batch.
//!
//! Each run creates one batch directory under the destination root, named
//! `backup_YYYYMMDD_HHMMSS`, so repeated runs never collide. Files are
//! copied or moved into it (optionally under per-category subfolders) with
//! collision-safe renaming. Only the batch-directory creation is fatal;
//! every per-file error is counted and logged, and the loop continues. A
//! `manifest.json` describing the batch is written at the end as a record
//! of what landed where.

use crate::classify::Category;
use crate::events::{CancelToken, EventSink};
use crate::scanner::ScanResult;
use chrono::{Local, Utc};
use serde_json::json;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the record file written into each batch directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Whether sources are duplicated or relocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Duplicate the file, leaving the source intact.
    Copy,
    /// Relocate the file, removing it from the source.
    Move,
}

impl TransferMode {
    fn verb(&self) -> &'static str {
        match self {
            TransferMode::Copy => "Copied",
            TransferMode::Move => "Moved",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TransferMode::Copy => "copy",
            TransferMode::Move => "move",
        }
    }
}

/// Errors that abort a transfer before or while setting it up.
///
/// Per-file failures are not errors at this level; they are counted in the
/// [`TransferOutcome`].
#[derive(Debug)]
pub enum TransferError {
    /// The batch directory could not be created under the destination.
    BatchDirFailed { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferError::BatchDirFailed { path, source } => {
                write!(
                    f,
                    "Failed to create batch directory {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for TransferError {}

/// Aggregated result of one transfer run.
#[derive(Debug)]
pub struct TransferOutcome {
    /// Files transferred successfully.
    pub transferred: usize,
    /// Files that failed; each failure was logged as it happened.
    pub failed: usize,
    /// True when the run stopped early at the user's request.
    pub cancelled: bool,
    /// The batch directory this run created.
    pub batch_dir: PathBuf,
}

/// Executes transfers of a completed scan into a destination root.
pub struct TransferEngine {
    destination: PathBuf,
    mode: TransferMode,
    organize_by_type: bool,
}

impl TransferEngine {
    pub fn new(destination: impl Into<PathBuf>, mode: TransferMode, organize_by_type: bool) -> Self {
        Self {
            destination: destination.into(),
            mode,
            organize_by_type,
        }
    }

    /// Runs the transfer loop over the scan result, in record order.
    ///
    /// The cancel token is checked before each file; files already
    /// transferred stay where they are and the outcome reports the run as
    /// cancelled. Per-file failures never abort the batch.
    pub fn run(
        &self,
        scan: &ScanResult,
        token: &CancelToken,
        sink: &dyn EventSink,
    ) -> Result<TransferOutcome, TransferError> {
        let batch_dir = self
            .destination
            .join(format!("backup_{}", Local::now().format("%Y%m%d_%H%M%S")));
        fs::create_dir_all(&batch_dir).map_err(|e| TransferError::BatchDirFailed {
            path: batch_dir.clone(),
            source: e,
        })?;
        sink.log(&format!("Created batch directory {}", batch_dir.display()));

        if self.organize_by_type {
            self.create_category_dirs(&batch_dir, &scan.distinct_categories(), sink);
        }

        sink.status(&format!(
            "Transferring {} files to {}",
            scan.len(),
            batch_dir.display()
        ));

        let total = scan.len();
        let mut transferred = 0;
        let mut failed = 0;
        let mut cancelled = false;
        let mut manifest_entries = Vec::new();

        for (index, record) in scan.records.iter().enumerate() {
            if token.is_cancelled() {
                cancelled = true;
                break;
            }

            let target_dir = if self.organize_by_type {
                batch_dir.join(record.category.dir_name())
            } else {
                batch_dir.clone()
            };

            let Some(file_name) = record.path.file_name().map(|n| n.to_string_lossy()) else {
                failed += 1;
                sink.log(&format!(
                    "Failed: {} (no file name component)",
                    record.path.display()
                ));
                continue;
            };

            let target = collision_free_path(&target_dir, &file_name);
            match transfer_file(self.mode, &record.path, &target) {
                Ok(()) => {
                    transferred += 1;
                    manifest_entries.push(json!({
                        "source": record.path.to_string_lossy(),
                        "target": target.to_string_lossy(),
                        "category": record.category.display_name(),
                    }));

                    let shown = target.strip_prefix(&self.destination).unwrap_or(&target);
                    sink.log(&format!("{}: {} -> {}", self.mode.verb(), file_name, shown.display()));

                    let percent = ((index + 1) * 100 / total) as u8;
                    sink.progress(percent);
                    sink.status(&format!(
                        "Processing... {}/{} ({}%)",
                        index + 1,
                        total,
                        percent
                    ));
                }
                Err(e) => {
                    failed += 1;
                    sink.log(&format!("Failed: {} ({})", record.path.display(), e));
                }
            }
        }

        self.write_manifest(&batch_dir, manifest_entries, failed, sink);

        if cancelled {
            sink.status(&format!(
                "Transfer cancelled, {} transferred, {} failed",
                transferred, failed
            ));
            sink.transfer_cancelled();
        } else {
            sink.status(&format!(
                "Transfer complete, {} transferred, {} failed",
                transferred, failed
            ));
            sink.transfer_complete(transferred, failed);
        }

        Ok(TransferOutcome {
            transferred,
            failed,
            cancelled,
            batch_dir,
        })
    }

    /// Pre-creates one subdirectory per category present in the scan.
    ///
    /// A failure here is not fatal: the files headed for that directory
    /// fail individually later and are counted there.
    fn create_category_dirs(&self, batch_dir: &Path, categories: &[Category], sink: &dyn EventSink) {
        for category in categories {
            let dir = batch_dir.join(category.dir_name());
            if let Err(e) = fs::create_dir_all(&dir) {
                sink.log(&format!(
                    "Warning: could not create {}: {}",
                    dir.display(),
                    e
                ));
            }
        }
    }

    /// Writes the batch manifest. A failure is a warning, never fatal.
    fn write_manifest(
        &self,
        batch_dir: &Path,
        entries: Vec<serde_json::Value>,
        failed: usize,
        sink: &dyn EventSink,
    ) {
        let manifest = json!({
            "created": Utc::now().to_rfc3339(),
            "mode": self.mode.label(),
            "organized_by_type": self.organize_by_type,
            "transferred": entries,
            "failed_count": failed,
        });

        let path = batch_dir.join(MANIFEST_FILE);
        let result = serde_json::to_string_pretty(&manifest)
            .map_err(|e| e.to_string())
            .and_then(|text| fs::write(&path, text).map_err(|e| e.to_string()));
        if let Err(e) = result {
            sink.log(&format!("Warning: could not write batch manifest: {}", e));
        }
    }
}

/// Finds a free name for `file_name` inside `target_dir`.
///
/// The first collision gets `_1` appended before the extension, the next
/// `_2`, and so on, skipping names that already exist. Resolution is local
/// to the target directory and deterministic.
fn collision_free_path(target_dir: &Path, file_name: &str) -> PathBuf {
    let candidate = target_dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], &file_name[idx..]),
        _ => (file_name, ""),
    };

    let mut counter = 1;
    loop {
        let candidate = target_dir.join(format!("{}_{}{}", stem, counter, ext));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Executes a single file transfer.
///
/// A move tries an atomic rename first and falls back to copy-then-delete
/// when the rename fails (typically across volumes).
fn transfer_file(mode: TransferMode, source: &Path, target: &Path) -> io::Result<()> {
    match mode {
        TransferMode::Copy => fs::copy(source, target).map(|_| ()),
        TransferMode::Move => match fs::rename(source, target) {
            Ok(()) => Ok(()),
            Err(_) => {
                fs::copy(source, target)?;
                fs::remove_file(source)
            }
        },
    }
}
