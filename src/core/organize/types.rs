//! Types for the organize module.

use serde::{Deserialize, Serialize};

/// Operation mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Move files to destination (rename, or copy+delete across filesystems)
    #[default]
    Move,
    /// Copy files to destination (keep originals, preserve mtime)
    Copy,
}

impl std::fmt::Display for OperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationMode::Move => write!(f, "move"),
            OperationMode::Copy => write!(f, "copy"),
        }
    }
}
