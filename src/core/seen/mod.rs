//! # Seen Module
//!
//! Tracks which fingerprints the process has already accepted.
//!
//! The deduplicator talks to this through [`SeenStore`] so the in-memory set
//! can be swapped for something that survives a restart. Only the in-memory
//! backend exists today: a restart forgets everything, and a file identical to
//! one organized in an earlier run is treated as new.

mod memory;

pub use memory::InMemorySeenSet;

use crate::core::hasher::Fingerprint;

/// Backend for the set of previously seen fingerprints
pub trait SeenStore: Send {
    /// Record a fingerprint.
    ///
    /// Returns `true` if it was not present before. Check and insert happen as
    /// one step; a backend shared between workers must keep it that way so that
    /// exactly one arrival of any content wins.
    fn insert(&mut self, fingerprint: Fingerprint) -> bool;

    /// Whether a fingerprint has been recorded
    fn contains(&self, fingerprint: &Fingerprint) -> bool;

    /// Number of distinct fingerprints recorded
    fn len(&self) -> usize;

    /// True if nothing has been recorded yet
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
