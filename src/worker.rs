//! Background execution of scans and transfers.
//!
//! Exactly one worker runs at a time: the host spawns a scan, drains its
//! events, joins it, and only then may spawn a transfer over the result.
//! Workers own their inputs and communicate back exclusively through the
//! event channel; the foreground never blocks them and they never touch
//! foreground state.

use crate::config::{ConfigError, ScanConfig};
use crate::events::{CancelToken, ChannelSink, Event};
use crate::scanner::{ScanResult, Scanner};
use crate::transfer::{TransferEngine, TransferError, TransferMode, TransferOutcome};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// A scan running on a background thread.
///
/// Drain [`ScanJob::events`] until the channel closes, then call
/// [`ScanJob::join`] for the owned result.
pub struct ScanJob {
    pub events: Receiver<Event>,
    handle: JoinHandle<ScanResult>,
}

impl ScanJob {
    /// Waits for the worker and returns its result.
    pub fn join(self) -> thread::Result<ScanResult> {
        self.handle.join()
    }
}

/// Spawns a scan worker after validating the configuration.
///
/// Validation failures surface here, before any thread starts.
pub fn spawn_scan(config: ScanConfig, token: CancelToken) -> Result<ScanJob, ConfigError> {
    config.validate()?;

    let (tx, events) = mpsc::channel();
    let handle = thread::spawn(move || {
        let sink = ChannelSink::new(tx);
        Scanner::new(config).scan(&token, &sink)
    });

    Ok(ScanJob { events, handle })
}

/// A transfer running on a background thread.
pub struct TransferJob {
    pub events: Receiver<Event>,
    handle: JoinHandle<Result<TransferOutcome, TransferError>>,
}

impl TransferJob {
    /// Waits for the worker and returns its outcome.
    pub fn join(self) -> thread::Result<Result<TransferOutcome, TransferError>> {
        self.handle.join()
    }
}

/// Spawns a transfer worker over a completed (or cancelled) scan.
pub fn spawn_transfer(
    scan: ScanResult,
    destination: PathBuf,
    mode: TransferMode,
    organize_by_type: bool,
    token: CancelToken,
) -> TransferJob {
    let (tx, events) = mpsc::channel();
    let handle = thread::spawn(move || {
        let sink = ChannelSink::new(tx);
        TransferEngine::new(destination, mode, organize_by_type).run(&scan, &token, &sink)
    });

    TransferJob { events, handle }
}
