//! Per-file ingestion and the two entry points that feed it.

use crate::config::IngestConfig;
use crate::core::dedup::{DedupStatus, Deduplicator};
use crate::core::organize::{FileOrganizer, OperationMode};
use crate::core::placement::{resolve_path, DEFAULT_MAX_NAME_PROBES};
use crate::core::scanner::ImageFilter;
use crate::core::seen::SeenStore;
use crate::core::watcher::{self, wait_until_settled, FolderWatcher, SettleOutcome, WatcherConfig};
use crate::error::{IngestError, ScanError};
use crate::events::{
    BatchEvent, BatchSummary, Event, EventSender, IngestOutcome, IngestStage, WatcherEvent,
};
use crossbeam_channel::{select, Receiver, TryRecvError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Builder for an [`IngestionCoordinator`]
pub struct CoordinatorBuilder {
    destination: PathBuf,
    quarantine: PathBuf,
    filter: ImageFilter,
    watcher_config: WatcherConfig,
    max_name_probes: usize,
    seen: Option<Box<dyn SeenStore>>,
}

impl CoordinatorBuilder {
    /// Start from the default layout
    pub fn new() -> Self {
        let defaults = IngestConfig::default();
        Self {
            destination: defaults.destination,
            quarantine: defaults.quarantine,
            filter: ImageFilter::new(),
            watcher_config: WatcherConfig::default(),
            max_name_probes: DEFAULT_MAX_NAME_PROBES,
            seen: None,
        }
    }

    /// Root of the `YYYY/MM/DD` tree
    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Where duplicates are moved
    pub fn quarantine(mut self, quarantine: impl Into<PathBuf>) -> Self {
        self.quarantine = quarantine.into();
        self
    }

    /// Which files are accepted
    pub fn filter(mut self, filter: ImageFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Write-settle timings for watch mode
    pub fn watcher_config(mut self, config: WatcherConfig) -> Self {
        self.watcher_config = config;
        self
    }

    /// Cap the `_<n>` suffix search in both trees
    pub fn max_name_probes(mut self, max_name_probes: usize) -> Self {
        self.max_name_probes = max_name_probes;
        self
    }

    /// Use a custom seen-set instead of a fresh in-memory one
    pub fn seen_store(mut self, seen: Box<dyn SeenStore>) -> Self {
        self.seen = Some(seen);
        self
    }

    pub fn build(self) -> IngestionCoordinator {
        let dedup = match self.seen {
            Some(seen) => Deduplicator::with_store(&self.quarantine, seen),
            None => Deduplicator::new(&self.quarantine),
        }
        .with_max_name_probes(self.max_name_probes);

        IngestionCoordinator {
            guard: OutputGuard::new(&[self.destination.as_path(), self.quarantine.as_path()]),
            dedup,
            organizer: FileOrganizer::new().with_max_name_probes(self.max_name_probes),
            destination: self.destination,
            filter: self.filter,
            watcher_config: self.watcher_config,
        }
    }
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives each file through dedup and then organize
pub struct IngestionCoordinator {
    dedup: Deduplicator,
    organizer: FileOrganizer,
    destination: PathBuf,
    filter: ImageFilter,
    watcher_config: WatcherConfig,
    guard: OutputGuard,
}

impl IngestionCoordinator {
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    /// Build a coordinator from loaded settings
    pub fn from_config(config: &IngestConfig) -> Self {
        Self::builder()
            .destination(&config.destination)
            .quarantine(&config.quarantine)
            .filter(config.filter())
            .watcher_config(config.watcher_config())
            .max_name_probes(config.max_name_probes)
            .build()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn quarantine(&self) -> &Path {
        self.dedup.quarantine_dir()
    }

    /// Run one file through dedup and organize, with no settling.
    ///
    /// Never fails as a whole: errors become [`IngestOutcome::Failed`] and the
    /// file stays wherever the failing step left it.
    pub fn ingest_file(&mut self, path: &Path, events: &EventSender) -> IngestOutcome {
        tracing::debug!(
            path = %path.display(),
            format = ?self.filter.get_format(path),
            "ingesting"
        );

        let outcome = match self.dedup.process_file(path) {
            Ok(DedupStatus::Skipped) => IngestOutcome::Skipped {
                path: path.to_path_buf(),
            },
            Ok(DedupStatus::Duplicate { quarantined_to }) => IngestOutcome::Quarantined {
                source: path.to_path_buf(),
                destination: quarantined_to,
            },
            Ok(DedupStatus::Unique) => {
                match self
                    .organizer
                    .organize(path, &self.destination, OperationMode::Move)
                {
                    Ok(destination) => IngestOutcome::Organized {
                        source: path.to_path_buf(),
                        destination,
                    },
                    Err(e) => failed(path, IngestStage::Organize, &e),
                }
            }
            Err(e) => failed(path, IngestStage::DedupCheck, &e),
        };

        log_outcome(&outcome);
        events.send(Event::Ingest(outcome.clone()));
        outcome
    }

    /// Handle a watcher notification: settle, then ingest.
    ///
    /// Returns `None` when the path belongs to our own output trees.
    pub fn handle_arrival(&mut self, path: &Path, events: &EventSender) -> Option<IngestOutcome> {
        if self.guard.contains(path) {
            tracing::debug!(path = %path.display(), "ignoring arrival inside output tree");
            return None;
        }

        match wait_until_settled(path, &self.watcher_config) {
            SettleOutcome::Settled => {}
            SettleOutcome::Vanished => {
                tracing::debug!(path = %path.display(), "vanished while settling");
            }
            SettleOutcome::TimedOut => {
                tracing::warn!(
                    path = %path.display(),
                    max_wait_ms = self.watcher_config.max_wait.as_millis() as u64,
                    "file still changing, processing anyway"
                );
            }
        }

        Some(self.ingest_file(path, events))
    }

    /// Ingest every supported file directly inside `source`.
    ///
    /// Subdirectories are not entered. Files are handled in name order.
    pub fn organize_directory(
        &mut self,
        source: &Path,
        events: &EventSender,
    ) -> Result<BatchSummary, IngestError> {
        if !source.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: source.to_path_buf(),
            }
            .into());
        }

        let start_time = Instant::now();
        let files = self.collect_candidates(source)?;

        let mut summary = BatchSummary {
            id: uuid::Uuid::new_v4().to_string(),
            ..Default::default()
        };

        tracing::info!(
            batch = %summary.id,
            source = %source.display(),
            files = files.len(),
            "organizing directory"
        );
        events.send(Event::Batch(BatchEvent::Started {
            id: summary.id.clone(),
            source: source.to_path_buf(),
            total: files.len(),
        }));

        for path in &files {
            let outcome = self.ingest_file(path, events);
            summary.record(&outcome);
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        tracing::info!(
            batch = %summary.id,
            organized = summary.organized,
            quarantined = summary.quarantined,
            skipped = summary.skipped,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "batch complete"
        );
        events.send(Event::Batch(BatchEvent::Completed {
            summary: summary.clone(),
        }));

        Ok(summary)
    }

    fn collect_candidates(&self, source: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let entries = fs::read_dir(source).map_err(|e| ScanError::ReadDirectory {
            path: source.to_path_buf(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %source.display(), error = %e, "unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file && self.filter.should_include(&path) && !self.guard.contains(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Watch `source` and ingest arrivals until `shutdown` fires or disconnects.
    ///
    /// Notifications queue while a file is being handled; shutdown is only
    /// checked between files.
    pub fn watch(
        &mut self,
        source: &Path,
        shutdown: &Receiver<()>,
        events: &EventSender,
    ) -> Result<BatchSummary, IngestError> {
        let start_time = Instant::now();
        let (tx, rx) = crossbeam_channel::unbounded();

        let mut folder_watcher =
            FolderWatcher::new(self.watcher_config.clone(), self.filter.clone(), move |event| {
                let _ = tx.send(event);
            })?;
        folder_watcher.watch(source)?;

        let mut summary = BatchSummary {
            id: uuid::Uuid::new_v4().to_string(),
            ..Default::default()
        };

        tracing::info!(
            source = %source.display(),
            destination = %self.destination.display(),
            quarantine = %self.quarantine().display(),
            "watching for new photos"
        );
        events.send(Event::Watcher(WatcherEvent::Started {
            path: source.to_path_buf(),
        }));

        loop {
            match shutdown.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            select! {
                recv(shutdown) -> _ => break,
                recv(rx) -> notification => match notification {
                    Ok(watcher::WatcherEvent::PhotoArrived(path)) => {
                        events.send(Event::Watcher(WatcherEvent::PhotoDetected {
                            path: path.clone(),
                        }));
                        if let Some(outcome) = self.handle_arrival(&path, events) {
                            summary.record(&outcome);
                        }
                    }
                    Ok(watcher::WatcherEvent::Error(message)) => {
                        tracing::warn!(%message, "watcher backend error");
                        events.send(Event::Watcher(WatcherEvent::Error { message }));
                    }
                    Err(_) => break,
                },
            }
        }

        if let Err(e) = folder_watcher.unwatch(source) {
            tracing::debug!(error = %e, "unwatch failed during shutdown");
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        tracing::info!(
            source = %source.display(),
            organized = summary.organized,
            quarantined = summary.quarantined,
            failed = summary.failed,
            "stopped watching"
        );
        events.send(Event::Watcher(WatcherEvent::Stopped {
            path: source.to_path_buf(),
        }));

        Ok(summary)
    }
}

fn failed(path: &Path, stage: IngestStage, error: &IngestError) -> IngestOutcome {
    IngestOutcome::Failed {
        path: path.to_path_buf(),
        stage,
        message: error.to_string(),
    }
}

fn log_outcome(outcome: &IngestOutcome) {
    match outcome {
        IngestOutcome::Organized {
            source,
            destination,
        } => tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            "organized"
        ),
        IngestOutcome::Quarantined {
            source,
            destination,
        } => tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            "quarantined duplicate"
        ),
        IngestOutcome::Skipped { path } => {
            tracing::info!(path = %path.display(), "skipped, file no longer exists")
        }
        IngestOutcome::Failed {
            path,
            stage,
            message,
        } => tracing::error!(path = %path.display(), %stage, error = %message, "ingest failed"),
    }
}

/// Recognizes paths under the destination or quarantine roots
struct OutputGuard {
    roots: Vec<PathBuf>,
}

impl OutputGuard {
    fn new(roots: &[&Path]) -> Self {
        Self {
            roots: roots.iter().map(|root| resolve_path(root)).collect(),
        }
    }

    fn contains(&self, path: &Path) -> bool {
        // The file itself may already be gone, so resolve through its parent.
        let resolved = match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => resolve_path(parent).join(name),
            _ => resolve_path(path),
        };
        self.roots.iter().any(|root| resolved.starts_with(root))
    }
}
