//! Progress and status events emitted by the scan and transfer workers.
//!
//! The workers never touch the presentation layer directly. They talk to an
//! [`EventSink`], and the host decides what a sink does: the CLI prints
//! colored lines, tests collect events, and [`ChannelSink`] forwards them
//! over a channel so a foreground thread can drain them without ever
//! blocking the worker.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

/// A single progress or status event.
///
/// Events carry owned data only, so they can cross thread boundaries
/// without borrowing from the worker's state.
#[derive(Debug, Clone)]
pub enum Event {
    /// A log line, stamped when it was emitted.
    Log {
        at: DateTime<Local>,
        message: String,
    },
    /// A short status text describing the current phase.
    Status(String),
    /// Overall completion, 0 to 100.
    Progress(u8),
    /// A file matched during scanning.
    FileFound {
        name: String,
        extension: String,
        size: String,
        path: PathBuf,
    },
    /// Scanning finished; `count` files matched.
    ScanComplete { count: usize },
    /// Transfer finished with per-file success and failure counts.
    TransferComplete { transferred: usize, failed: usize },
    /// Transfer stopped early at the user's request.
    TransferCancelled,
}

impl Event {
    /// Replays this event into a sink.
    ///
    /// Used by hosts that receive events over a channel and want to reuse a
    /// direct [`EventSink`] implementation for presentation.
    pub fn dispatch(&self, sink: &dyn EventSink) {
        match self {
            Event::Log { message, .. } => sink.log(message),
            Event::Status(text) => sink.status(text),
            Event::Progress(percent) => sink.progress(*percent),
            Event::FileFound {
                name,
                extension,
                size,
                path,
            } => sink.file_found(name, extension, size, path),
            Event::ScanComplete { count } => sink.scan_complete(*count),
            Event::TransferComplete {
                transferred,
                failed,
            } => sink.transfer_complete(*transferred, *failed),
            Event::TransferCancelled => sink.transfer_cancelled(),
        }
    }
}

/// Receives progress events from a running scan or transfer.
///
/// Implementations must be infallible from the worker's point of view: a
/// sink that cannot deliver an event drops it, it never propagates an error
/// back into the pipeline.
pub trait EventSink: Send + Sync {
    /// A log line describing one step of the operation.
    fn log(&self, message: &str);
    /// A short status text describing the current phase.
    fn status(&self, text: &str);
    /// Overall completion, 0 to 100.
    fn progress(&self, percent: u8);
    /// A matched file, with its formatted size.
    fn file_found(&self, name: &str, extension: &str, size: &str, path: &Path);
    /// Scanning finished with `count` matches.
    fn scan_complete(&self, count: usize);
    /// Transfer finished.
    fn transfer_complete(&self, transferred: usize, failed: usize);
    /// Transfer stopped early.
    fn transfer_cancelled(&self);
}

/// A sink that discards every event. Useful for tests and quiet runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn log(&self, _message: &str) {}
    fn status(&self, _text: &str) {}
    fn progress(&self, _percent: u8) {}
    fn file_found(&self, _name: &str, _extension: &str, _size: &str, _path: &Path) {}
    fn scan_complete(&self, _count: usize) {}
    fn transfer_complete(&self, _transferred: usize, _failed: usize) {}
    fn transfer_cancelled(&self) {}
}

/// Forwards events over an `mpsc` channel to the foreground.
///
/// Sends are fire-and-forget: once the receiver is gone the remaining
/// events are dropped, which lets a worker finish cleanly even if the
/// foreground stopped listening.
pub struct ChannelSink {
    tx: Sender<Event>,
}

impl ChannelSink {
    pub fn new(tx: Sender<Event>) -> Self {
        Self { tx }
    }

    fn post(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

impl EventSink for ChannelSink {
    fn log(&self, message: &str) {
        self.post(Event::Log {
            at: Local::now(),
            message: message.to_string(),
        });
    }

    fn status(&self, text: &str) {
        self.post(Event::Status(text.to_string()));
    }

    fn progress(&self, percent: u8) {
        self.post(Event::Progress(percent));
    }

    fn file_found(&self, name: &str, extension: &str, size: &str, path: &Path) {
        self.post(Event::FileFound {
            name: name.to_string(),
            extension: extension.to_string(),
            size: size.to_string(),
            path: path.to_path_buf(),
        });
    }

    fn scan_complete(&self, count: usize) {
        self.post(Event::ScanComplete { count });
    }

    fn transfer_complete(&self, transferred: usize, failed: usize) {
        self.post(Event::TransferComplete {
            transferred,
            failed,
        });
    }

    fn transfer_cancelled(&self) {
        self.post(Event::TransferCancelled);
    }
}

/// Cooperative cancellation flag shared between the foreground and a worker.
///
/// Workers poll the token at file and directory boundaries; setting it never
/// interrupts an in-flight file operation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
