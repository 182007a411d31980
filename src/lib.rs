//! # Photo Ingest
//!
//! Turns a drop folder of camera uploads into a tidy, duplicate-free archive.
//!
//! ## What it does
//! - Photos whose content was already ingested are moved to a quarantine folder
//! - Every other photo is moved into `destination/YYYY/MM/DD/` by capture date
//! - Nothing is ever overwritten: name clashes get a `_<n>` suffix
//!
//! ## Architecture
//! - `core` - The ingestion engine (no terminal or UI code)
//! - `events` - Typed progress reporting for any front end
//! - `config` - TOML settings with defaults
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use config::IngestConfig;
pub use error::{IngestError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Falls back to
/// `info` when `RUST_LOG` is not set. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
