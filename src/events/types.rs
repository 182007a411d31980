//! Event type definitions for ingestion reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the ingestion pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// The final outcome for one file
    Ingest(IngestOutcome),
    /// Folder watcher lifecycle
    Watcher(WatcherEvent),
    /// Bulk organize run lifecycle
    Batch(BatchEvent),
}

/// Where in the per-file pipeline something happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    /// Fingerprinting and duplicate check
    DedupCheck,
    /// Moving into the destination tree
    Organize,
}

impl std::fmt::Display for IngestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestStage::DedupCheck => write!(f, "dedup-check"),
            IngestStage::Organize => write!(f, "organize"),
        }
    }
}

/// Terminal state of one file's trip through the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestOutcome {
    /// Unique content, now in the destination tree
    Organized {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Seen before, now in the quarantine tree
    Quarantined {
        source: PathBuf,
        destination: PathBuf,
    },
    /// The file vanished before it could be handled
    Skipped { path: PathBuf },
    /// Processing stopped; the file is wherever the failing step left it
    Failed {
        path: PathBuf,
        stage: IngestStage,
        message: String,
    },
}

impl IngestOutcome {
    /// The file this outcome is about, at its original location
    pub fn source(&self) -> &PathBuf {
        match self {
            IngestOutcome::Organized { source, .. } | IngestOutcome::Quarantined { source, .. } => {
                source
            }
            IngestOutcome::Skipped { path } | IngestOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, IngestOutcome::Failed { .. })
    }
}

/// Events from the folder watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WatcherEvent {
    /// Watcher started monitoring a folder
    Started { path: PathBuf },
    /// Watcher stopped monitoring a folder
    Stopped { path: PathBuf },
    /// A new photo was detected and queued
    PhotoDetected { path: PathBuf },
    /// An error occurred in the notification backend
    Error { message: String },
}

/// Events for a one-shot bulk run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// Bulk run started with this many candidate files
    Started {
        id: String,
        source: PathBuf,
        total: usize,
    },
    /// Bulk run finished
    Completed { summary: BatchSummary },
}

/// Tallies for a bulk run or a watch session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Correlates the summary with its `Started` event
    pub id: String,
    pub organized: usize,
    pub quarantined: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl BatchSummary {
    /// Count one outcome
    pub fn record(&mut self, outcome: &IngestOutcome) {
        match outcome {
            IngestOutcome::Organized { .. } => self.organized += 1,
            IngestOutcome::Quarantined { .. } => self.quarantined += 1,
            IngestOutcome::Skipped { .. } => self.skipped += 1,
            IngestOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Files that reached any terminal state
    pub fn total(&self) -> usize {
        self.organized + self.quarantined + self.skipped + self.failed
    }
}
