//! Recursive directory traversal with pruning.
//!
//! The walker yields candidate files lazily and never descends into pruned
//! subtrees: system/cache directories (case-insensitive substring match on
//! the directory name) and anything under the destination root. It also
//! carries the messaging-export special case: a source path that looks like
//! a WeChat/Weixin export is narrowed to its `msg` subdirectory before the
//! main walk, because those trees bury the user's media under a known
//! layout. The narrowing can be switched off per session
//! ([`crate::config::ScanConfig::messaging_redirect`]).

use crate::config::ScanConfig;
use crate::events::{CancelToken, EventSink};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Path markers identifying a messaging-app export tree.
const MESSAGING_MARKERS: &[&str] = &["wechat", "weixin"];

/// The subdirectory holding the actual message media in such exports.
const MESSAGING_SUBDIR: &str = "msg";

/// Walks a source tree, applying the session's skip rules.
pub struct TreeWalker<'a> {
    config: &'a ScanConfig,
}

impl<'a> TreeWalker<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self { config }
    }

    /// Resolves the effective walk root, applying the messaging-export
    /// narrowing when it is enabled and the source path carries a marker.
    ///
    /// The pre-scan is a one-time cost before the main walk. When no `msg`
    /// directory exists the full tree is used and a log line says so.
    pub fn resolve_root(&self, sink: &dyn EventSink) -> PathBuf {
        let source = &self.config.source;
        if !self.config.messaging_redirect || !is_messaging_export(source) {
            return source.clone();
        }

        let found = WalkDir::new(source)
            .into_iter()
            .filter_map(Result::ok)
            .find(|entry| {
                entry.file_type().is_dir()
                    && entry
                        .file_name()
                        .to_string_lossy()
                        .eq_ignore_ascii_case(MESSAGING_SUBDIR)
            });

        match found {
            Some(entry) => {
                let root = entry.into_path();
                sink.log(&format!(
                    "Messaging export detected, narrowing scan to {}",
                    root.display()
                ));
                root
            }
            None => {
                sink.log("Messaging export detected but no msg directory found, scanning the full tree");
                source.clone()
            }
        }
    }

    /// Returns a lazy sequence of `(path, filename)` pairs for every file
    /// under `root` that survives directory pruning.
    ///
    /// The sequence ends early, without error, once `token` is cancelled;
    /// the token is checked at every entry boundary. Unreadable entries are
    /// silently skipped.
    pub fn walk<'w>(
        &'w self,
        root: &Path,
        token: &'w CancelToken,
    ) -> impl Iterator<Item = (PathBuf, String)> + 'w {
        WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| self.keep_entry(entry))
            .take_while(move |_| !token.is_cancelled())
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                (entry.into_path(), name)
            })
    }

    /// Decides whether an entry (and for directories, its whole subtree)
    /// stays in the walk. The walk root itself is always kept; the skip
    /// lists apply to what is found below it.
    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        if let Some(dest) = &self.config.destination
            && entry.path().starts_with(dest)
        {
            return false;
        }

        if entry.file_type().is_dir() {
            let name = entry.file_name().to_string_lossy();
            if self.config.rules.skips_dir(&name) {
                return false;
            }
        }

        true
    }
}

/// Returns true if the path string carries a messaging-export marker.
fn is_messaging_export(path: &Path) -> bool {
    let lower = path.to_string_lossy().to_lowercase();
    MESSAGING_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}
