//! Content-addressed load cache
//!
//! Memoizes the full transform keyed by the SHA-256 of the input file
//! bytes. Re-loading identical content reuses the prior result; any byte
//! change is a miss. The cache is an owned value held by the caller, so
//! the core carries no process-wide state.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::aggregate::LoadOutcome;
use crate::error::Result;
use crate::loader::TableFormat;

/// Memoization cache for report loads
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<String, LoadOutcome>,
    hits: usize,
}

impl LoadCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a report through the cache.
    ///
    /// Reads the file, hashes its content, and either returns the memoized
    /// outcome or runs the transform and stores it.
    ///
    /// # Errors
    ///
    /// Propagates any load, schema, or value error from the transform. A
    /// failed load stores nothing.
    pub fn load(&mut self, path: &Path) -> Result<&LoadOutcome> {
        let bytes = std::fs::read(path)?;
        let format = TableFormat::from_path(path);
        let key = content_key(&bytes);

        match self.entries.entry(key) {
            Entry::Occupied(slot) => {
                self.hits += 1;
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => {
                let outcome = crate::load_and_aggregate_bytes(&bytes, format)?;
                Ok(slot.insert(outcome))
            }
        }
    }

    /// Number of distinct inputs cached
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of loads answered from the cache
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.hits
    }
}

/// Hex SHA-256 of the input bytes, the cache key
#[must_use]
pub fn content_key(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
