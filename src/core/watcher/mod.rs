//! # Folder Watcher Module
//!
//! Monitors a drop folder for photos arriving in real-time.
//!
//! ## Features
//! - Reports files created in, or renamed into, the watched folder
//! - Filters to the supported image formats, ignores directories
//! - Waits for a file to stop changing before handing it on (see [`settle`])
//!
//! ## Example
//! ```rust,ignore
//! use photo_ingest::core::watcher::{FolderWatcher, WatcherConfig, WatcherEvent};
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let mut watcher = FolderWatcher::new(WatcherConfig::default(), ImageFilter::new(), move |e| {
//!     let _ = tx.send(e);
//! })?;
//! watcher.watch("/Users/me/Drop")?;
//!
//! for event in rx {
//!     if let WatcherEvent::PhotoArrived(path) = event {
//!         println!("New: {:?}", path);
//!     }
//! }
//! ```

pub mod settle;

pub use settle::{wait_until_settled, SettleOutcome};

use crate::core::scanner::ImageFilter;
use crate::error::WatchError;
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the folder watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// How long size and mtime must stay unchanged before a file is read
    pub settle: Duration,
    /// How often to re-check a file that is still settling
    pub poll_interval: Duration,
    /// Give up waiting for a file to settle after this long
    pub max_wait: Duration,
    /// Whether to watch subdirectories recursively
    pub recursive: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(250),
            max_wait: Duration::from_secs(30),
            recursive: false,
        }
    }
}

/// Events emitted by the watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WatcherEvent {
    /// A supported photo appeared in the watched folder
    PhotoArrived(PathBuf),
    /// The notification backend reported an error
    Error(String),
}

/// Watches folders for arriving photos
pub struct FolderWatcher {
    watcher: RecommendedWatcher,
    config: WatcherConfig,
}

impl FolderWatcher {
    /// Create a new folder watcher that forwards events to `event_handler`.
    ///
    /// The handler runs on the notification backend's thread and should only
    /// enqueue.
    pub fn new<F>(
        config: WatcherConfig,
        filter: ImageFilter,
        event_handler: F,
    ) -> Result<Self, WatchError>
    where
        F: Fn(WatcherEvent) + Send + 'static,
    {
        let watcher = notify::recommended_watcher(move |result: Result<Event, notify::Error>| {
            match result {
                Ok(event) => {
                    if let Some(watcher_event) = Self::process_event(event, &filter) {
                        event_handler(watcher_event);
                    }
                }
                Err(e) => {
                    event_handler(WatcherEvent::Error(e.to_string()));
                }
            }
        })
        .map_err(|e| WatchError::InitFailed(e.to_string()))?;

        Ok(Self { watcher, config })
    }

    /// Turn a raw notification into an arrival, if it is one
    fn process_event(event: Event, filter: &ImageFilter) -> Option<WatcherEvent> {
        let path = match event.kind {
            EventKind::Create(CreateKind::Folder) => return None,
            EventKind::Create(_) => event.paths.into_iter().next()?,
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                event.paths.into_iter().next()?
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                event.paths.into_iter().last()?
            }
            _ => return None,
        };

        if path.is_dir() || !filter.should_include(&path) {
            return None;
        }

        Some(WatcherEvent::PhotoArrived(path))
    }

    /// Start watching a directory
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<(), WatchError> {
        let path = path.as_ref().to_path_buf();

        if !path.is_dir() {
            return Err(WatchError::PathNotFound { path });
        }

        let mode = if self.config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        self.watcher
            .watch(&path, mode)
            .map_err(|e| WatchError::WatchFailed {
                path: path.clone(),
                reason: e.to_string(),
            })
    }

    /// Stop watching a directory
    pub fn unwatch(&mut self, path: impl AsRef<Path>) -> Result<(), WatchError> {
        let path = path.as_ref();

        self.watcher
            .unwatch(path)
            .map_err(|e| WatchError::UnwatchFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}
