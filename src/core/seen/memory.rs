//! In-memory seen-set backend.

use super::SeenStore;
use crate::core::hasher::Fingerprint;
use std::collections::HashSet;

/// Process-lifetime fingerprint set
#[derive(Debug, Default)]
pub struct InMemorySeenSet {
    fingerprints: HashSet<Fingerprint>,
}

impl InMemorySeenSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeenStore for InMemorySeenSet {
    fn insert(&mut self, fingerprint: Fingerprint) -> bool {
        self.fingerprints.insert(fingerprint)
    }

    fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    fn len(&self) -> usize {
        self.fingerprints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_is_new() {
        let mut seen = InMemorySeenSet::new();
        assert!(seen.is_empty());
        assert!(seen.insert(Fingerprint::from_raw(1)));
        assert!(seen.contains(&Fingerprint::from_raw(1)));
    }

    #[test]
    fn second_insert_is_not_new() {
        let mut seen = InMemorySeenSet::new();
        seen.insert(Fingerprint::from_raw(7));
        assert!(!seen.insert(Fingerprint::from_raw(7)));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn distinct_fingerprints_are_counted() {
        let mut seen = InMemorySeenSet::new();
        seen.insert(Fingerprint::from_raw(1));
        seen.insert(Fingerprint::from_raw(2));
        assert_eq!(seen.len(), 2);
        assert!(!seen.contains(&Fingerprint::from_raw(3)));
    }
}
