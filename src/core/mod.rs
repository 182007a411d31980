//! # Core Module
//!
//! The UI-agnostic ingestion engine.
//!
//! ## Modules
//! - `scanner` - Decides which files count as photos
//! - `hasher` - Fingerprints file content
//! - `seen` - Remembers fingerprints already ingested
//! - `dedup` - Quarantines repeated content
//! - `metadata` - Resolves capture dates from EXIF or mtime
//! - `placement` - Collision-free moves and copies
//! - `organize` - Files photos under `YYYY/MM/DD`
//! - `watcher` - Notices photos arriving in a folder
//! - `pipeline` - Ties the stages together

pub mod dedup;
pub mod hasher;
pub mod metadata;
pub mod organize;
pub mod pipeline;
pub mod placement;
pub mod scanner;
pub mod seen;
pub mod watcher;

// Re-export commonly used types
pub use dedup::{DedupStatus, Deduplicator};
pub use hasher::{ContentHasher, Fingerprint};
pub use metadata::{resolve_capture_date, CaptureDate, DateSource};
pub use organize::{FileOrganizer, OperationMode};
pub use pipeline::{CoordinatorBuilder, IngestionCoordinator};
pub use scanner::ImageFilter;
pub use seen::{InMemorySeenSet, SeenStore};
pub use watcher::{FolderWatcher, WatcherConfig};
