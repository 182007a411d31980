//! # Hasher Module
//!
//! Computes content fingerprints for duplicate detection.
//!
//! ## How It Works
//! 1. Open the file and read it in fixed 64 KiB blocks
//! 2. Feed each block into a streaming xxh3-128 state
//! 3. The final 128-bit digest is the file's [`Fingerprint`]
//!
//! Memory use is one block regardless of file size. The digest depends on
//! the bytes only, never on the name, location or timestamps. xxh3 is not
//! collision resistant against an adversary; it is meant to catch accidental
//! re-imports of the same photo.
//!
//! ## Example
//! ```rust,ignore
//! use photo_ingest::core::hasher::ContentHasher;
//!
//! let fingerprint = ContentHasher::new().hash_file(&path)?;
//! println!("{}", fingerprint);
//! ```

use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

/// Default read block size (64 KiB)
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Content-derived identity of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(u128);

impl Fingerprint {
    /// Wrap a raw digest value
    pub fn from_raw(value: u128) -> Self {
        Self(value)
    }

    /// Raw digest value
    pub fn as_u128(&self) -> u128 {
        self.0
    }

    /// Digest as a 32-character lowercase hex string
    pub fn to_hex(&self) -> String {
        format!("{:032x}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Streams files through xxh3-128
#[derive(Debug, Clone)]
pub struct ContentHasher {
    block_size: usize,
}

impl ContentHasher {
    /// Create a hasher with the default block size
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Override the read block size (clamped to at least one byte)
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Fingerprint a file on disk
    pub fn hash_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let io_err = |source| HashError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(io_err)?;
        self.hash_reader(&mut file).map_err(io_err)
    }

    /// Fingerprint any byte stream
    pub fn hash_reader<R: Read>(&self, reader: &mut R) -> std::io::Result<Fingerprint> {
        let mut state = Xxh3::new();
        let mut buffer = vec![0u8; self.block_size];

        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            state.update(&buffer[..read]);
        }

        Ok(Fingerprint(state.digest128()))
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}
