//! Date-partitioned placement of single files.

use super::types::OperationMode;
use crate::core::metadata::resolve_capture_date;
use crate::core::placement::{place_file, DEFAULT_MAX_NAME_PROBES};
use crate::error::{IngestError, PlacementError};
use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};

/// Relative `YYYY/MM/DD` folder for a date
pub fn day_folder(date: NaiveDate) -> PathBuf {
    PathBuf::from(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{:02}", date.day()))
}

/// Files photos under `root/YYYY/MM/DD/`
#[derive(Debug, Clone)]
pub struct FileOrganizer {
    max_name_probes: usize,
}

impl FileOrganizer {
    pub fn new() -> Self {
        Self {
            max_name_probes: DEFAULT_MAX_NAME_PROBES,
        }
    }

    /// Cap the `_<n>` suffix search
    pub fn with_max_name_probes(mut self, max_name_probes: usize) -> Self {
        self.max_name_probes = max_name_probes;
        self
    }

    /// Place `path` into the destination tree and return its final path.
    ///
    /// Fails with `NotFound` before touching the destination if the source is
    /// already gone. On any later failure the source stays where it was.
    pub fn organize(
        &self,
        path: &Path,
        destination_root: &Path,
        mode: OperationMode,
    ) -> Result<PathBuf, IngestError> {
        if !path.exists() {
            return Err(PlacementError::NotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let date = resolve_capture_date(path)?;
        let target_dir = destination_root.join(day_folder(date.taken.date()));

        tracing::debug!(
            path = %path.display(),
            taken = %date.taken,
            source = %date.source,
            "resolved capture date"
        );

        let placed = place_file(path, &target_dir, mode, self.max_name_probes)?;
        Ok(placed)
    }
}

impl Default for FileOrganizer {
    fn default() -> Self {
        Self::new()
    }
}
