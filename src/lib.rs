//! sortaway - scan and relocate common user files by category
//!
//! This library scans a directory tree for common user files (images, music,
//! video, documents, spreadsheets, presentations, archives, plus ad-hoc
//! extensions), skipping system, program, and code files as well as known
//! noisy directories, and transfers the matches into a timestamped batch
//! folder under a destination root. Scans and transfers run on a background
//! worker, report progress through an injected event sink, and honor a
//! cooperative cancellation token.

pub mod classify;
pub mod cli;
pub mod config;
pub mod events;
pub mod output;
pub mod scanner;
pub mod transfer;
pub mod walker;
pub mod worker;

pub use classify::{Category, Classifier};
pub use config::{CompiledSkipRules, ConfigError, RulesConfig, ScanConfig, SkipRules};
pub use events::{CancelToken, ChannelSink, Event, EventSink, NullSink};
pub use scanner::{FileRecord, ScanResult, Scanner, format_size};
pub use transfer::{TransferEngine, TransferError, TransferMode, TransferOutcome};
pub use walker::TreeWalker;
pub use worker::{ScanJob, TransferJob, spawn_scan, spawn_transfer};

pub use cli::{Cli, run};
