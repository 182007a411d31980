//! # Dedup Module
//!
//! Exact-content duplicate detection with quarantine.
//!
//! The first file seen with a given fingerprint is `Unique` and stays where it
//! is. Every later file with the same content is moved into the quarantine
//! directory and reported as `Duplicate`. The quarantine tree itself is never
//! scanned, so repeated scans cannot re-quarantine their own output.
//!
//! ## Example
//! ```rust,ignore
//! use photo_ingest::core::dedup::Deduplicator;
//!
//! let mut dedup = Deduplicator::new("Quarantine");
//! let counts = dedup.scan_directory("/photos".as_ref())?;
//! println!("{} unique, {} duplicates", counts.unique, counts.duplicate);
//! ```

use crate::core::hasher::ContentHasher;
use crate::core::organize::OperationMode;
use crate::core::placement::{place_file, resolve_path, DEFAULT_MAX_NAME_PROBES};
use crate::core::seen::{InMemorySeenSet, SeenStore};
use crate::error::{IngestError, ScanError};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Classification of a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DedupStatus {
    /// First time this content was seen; the file was not touched
    Unique,
    /// Content seen before; the file now lives in quarantine
    Duplicate { quarantined_to: PathBuf },
    /// The file disappeared before it could be read
    Skipped,
}

/// A file that could not be classified during a scan
#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: IngestError,
}

/// Tallies from [`Deduplicator::scan_directory`]
#[derive(Debug, Default)]
pub struct ScanCounts {
    pub unique: usize,
    pub duplicate: usize,
    pub skipped: usize,
    /// Per-file errors; the walk carried on past each of these
    pub failures: Vec<ScanFailure>,
}

/// Owns the seen-set and the quarantine directory
pub struct Deduplicator {
    seen: Box<dyn SeenStore>,
    hasher: ContentHasher,
    quarantine_dir: PathBuf,
    max_name_probes: usize,
}

impl Deduplicator {
    /// Create a deduplicator with an empty in-memory seen-set
    pub fn new(quarantine_dir: impl Into<PathBuf>) -> Self {
        Self::with_store(quarantine_dir, Box::new(InMemorySeenSet::new()))
    }

    /// Create a deduplicator backed by a custom seen-set
    pub fn with_store(quarantine_dir: impl Into<PathBuf>, seen: Box<dyn SeenStore>) -> Self {
        Self {
            seen,
            hasher: ContentHasher::new(),
            quarantine_dir: quarantine_dir.into(),
            max_name_probes: DEFAULT_MAX_NAME_PROBES,
        }
    }

    /// Cap the `_<n>` suffix search inside quarantine
    pub fn with_max_name_probes(mut self, max_name_probes: usize) -> Self {
        self.max_name_probes = max_name_probes;
        self
    }

    /// Where duplicates are moved
    pub fn quarantine_dir(&self) -> &Path {
        &self.quarantine_dir
    }

    /// Number of distinct fingerprints seen so far
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Classify one file, quarantining it if its content was seen before
    pub fn process_file(&mut self, path: &Path) -> Result<DedupStatus, IngestError> {
        if !path.exists() {
            return Ok(DedupStatus::Skipped);
        }

        let fingerprint = match self.hasher.hash_file(path) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                let error = IngestError::from(e);
                if error.is_not_found() {
                    return Ok(DedupStatus::Skipped);
                }
                return Err(error);
            }
        };

        if self.seen.insert(fingerprint) {
            tracing::debug!(path = %path.display(), %fingerprint, "new content");
            return Ok(DedupStatus::Unique);
        }

        let quarantined_to = place_file(
            path,
            &self.quarantine_dir,
            OperationMode::Move,
            self.max_name_probes,
        )?;
        tracing::debug!(
            path = %path.display(),
            %fingerprint,
            quarantined_to = %quarantined_to.display(),
            "duplicate content"
        );

        Ok(DedupStatus::Duplicate { quarantined_to })
    }

    /// Recursively classify every regular file under `root`.
    ///
    /// Anything inside the quarantine tree is skipped, whether it is reached
    /// through its resolved location or a directory carrying its name.
    pub fn scan_directory(&mut self, root: &Path) -> Result<ScanCounts, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let guard = QuarantineGuard::new(&self.quarantine_dir, root);
        let mut counts = ScanCounts::default();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !guard.contains(entry.path()));

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    counts.failures.push(ScanFailure {
                        path: path.clone(),
                        error: ScanError::ReadDirectory {
                            path,
                            source: e.into(),
                        }
                        .into(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match self.process_file(entry.path()) {
                Ok(DedupStatus::Unique) => counts.unique += 1,
                Ok(DedupStatus::Duplicate { .. }) => counts.duplicate += 1,
                Ok(DedupStatus::Skipped) => counts.skipped += 1,
                Err(error) => {
                    tracing::warn!(path = %entry.path().display(), %error, "dedup failed");
                    counts.failures.push(ScanFailure {
                        path: entry.path().to_path_buf(),
                        error,
                    });
                }
            }
        }

        Ok(counts)
    }
}

/// Recognizes paths that belong to the quarantine tree
struct QuarantineGuard {
    resolved: PathBuf,
    name: Option<OsString>,
    scan_root: PathBuf,
}

impl QuarantineGuard {
    fn new(quarantine_dir: &Path, scan_root: &Path) -> Self {
        Self {
            resolved: resolve_path(quarantine_dir),
            name: quarantine_dir.file_name().map(|n| n.to_os_string()),
            scan_root: scan_root.to_path_buf(),
        }
    }

    fn contains(&self, path: &Path) -> bool {
        if resolve_path(path).starts_with(&self.resolved) {
            return true;
        }

        // Only components below the scan root count, so a scan root that
        // itself sits inside a folder with the same name is still walked.
        match (&self.name, path.strip_prefix(&self.scan_root)) {
            (Some(name), Ok(relative)) => relative
                .components()
                .any(|c| matches!(c, Component::Normal(part) if part == name.as_os_str())),
            _ => false,
        }
    }
}
