//! # Pipeline Module
//!
//! Runs each incoming photo through the ingestion stages.
//!
//! ## Stages
//! 1. **Detect** - A watcher notification, or a directory listing in bulk mode
//! 2. **Settle** - Wait for the writer to finish (watch mode only)
//! 3. **Dedup check** - Quarantine content that was seen before
//! 4. **Organize** - Move unique photos into `YYYY/MM/DD`
//!
//! A failure at any stage ends processing of that one file and is reported as
//! [`IngestOutcome::Failed`](crate::events::IngestOutcome::Failed); the run
//! carries on with the next file.
//!
//! ## Concurrency
//! Files are handled one at a time on the calling thread. The notification
//! backend only enqueues, so the seen-set needs no locking.

mod coordinator;

pub use coordinator::{CoordinatorBuilder, IngestionCoordinator};
