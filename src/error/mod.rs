//! # Error Module
//!
//! Error types for the photo ingestion pipeline.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - every variant names the file or directory involved
//! - **Isolate per file** - the coordinator records these per item, they never stop a run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Date resolution error: {0}")]
    Date(#[from] DateError),

    #[error("Placement error: {0}")]
    Placement(#[from] PlacementError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Watcher error: {0}")]
    Watch(#[from] WatchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that occur while fingerprinting file content
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from capture date resolution.
///
/// Missing or corrupt metadata is not an error; only a file that cannot
/// even be stat'ed ends up here.
#[derive(Error, Debug)]
pub enum DateError {
    #[error("Cannot read modification time of {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors while placing a file into the destination or quarantine tree
#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("Source file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("File has no usable name: {path}")]
    MissingFileName { path: PathBuf },

    #[error("Failed to place {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to transfer {from} to {to}: {source}")]
    Transfer {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No free name for {name} in {dir} after {attempts} attempts")]
    CollisionExhausted {
        dir: PathBuf,
        name: String,
        attempts: usize,
    },
}

/// Errors that abort a directory scan as a whole
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while setting up filesystem monitoring
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {0}")]
    InitFailed(String),

    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("Failed to watch {path}: {reason}")]
    WatchFailed { path: PathBuf, reason: String },

    #[error("Failed to unwatch {path}: {reason}")]
    UnwatchFailed { path: PathBuf, reason: String },
}

/// Errors loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, IngestError>;

impl IngestError {
    /// True when the failure was the source file disappearing underneath us
    pub fn is_not_found(&self) -> bool {
        match self {
            IngestError::Placement(PlacementError::NotFound { .. }) => true,
            IngestError::Placement(PlacementError::Io { source, .. })
            | IngestError::Placement(PlacementError::Transfer { source, .. })
            | IngestError::Hash(HashError::Io { source, .. })
            | IngestError::Date(DateError::Unavailable { source, .. }) => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}
