//! The chain engine: a lock-guarded entry sequence backed by one file.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::debug;

use crate::link::GENESIS_HASH;
use crate::persist::{ensure_parent_dir, load_entries, save_entries};
use crate::types::{ChainStats, Entry, Metadata, Page};
use crate::verify::{verify_entries, Verification};

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed chain document {}: {source}", .path.display())]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("entry index {index} out of range (chain has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Append-only, hash-linked log backed by a single JSON document.
///
/// All reads share one `RwLock`; `append` holds it exclusively for the whole
/// operation, including the disk write, so appends are serialized in lock
/// acquisition order and timestamps never go backwards relative to position
/// (barring clock adjustments).
///
/// Only one engine may point at a given path at a time. There is no
/// cross-process locking.
#[derive(Debug)]
pub struct ChainEngine {
    path: PathBuf,
    entries: RwLock<Vec<Entry>>,
}

impl ChainEngine {
    /// Open the chain stored at `path`, or start an empty one if the file
    /// does not exist yet. The parent directory is created when missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ChainError> {
        let path = path.as_ref().to_path_buf();
        ensure_parent_dir(&path).map_err(|source| ChainError::Io {
            path: path.clone(),
            source,
        })?;
        let entries = load_entries(&path)?;
        debug!(path = %path.display(), entries = entries.len(), "opened chain");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a new entry and persist the whole chain.
    ///
    /// The timestamp and both hashes are assigned here. The signature is not
    /// checked; callers that want that policy should run
    /// [`verify_signature`](crate::verify_signature) first.
    ///
    /// If persisting fails the entry is removed from memory again and the
    /// error is returned, so a failed append leaves no trace.
    pub fn append(
        &self,
        message: &str,
        signature: &str,
        pubkey: &str,
        metadata: Metadata,
    ) -> Result<Entry, ChainError> {
        let mut entries = self.write();

        let prev_hash = entries
            .last()
            .map_or(GENESIS_HASH, |last| last.current_hash.as_str())
            .to_string();
        let entry = Entry::sealed(Utc::now(), message, signature, pubkey, &prev_hash, metadata);

        entries.push(entry.clone());
        if let Err(err) = save_entries(&self.path, &entries) {
            entries.pop();
            return Err(err);
        }

        debug!(
            index = entries.len() - 1,
            hash = %entry.current_hash,
            "appended entry"
        );
        Ok(entry)
    }

    /// Check every hash and link in the chain, collecting all problems.
    ///
    /// Tampering is reported in the returned [`Verification`], never as an
    /// error. Signatures are not checked.
    pub fn verify(&self) -> Verification {
        let entries = self.read();
        let verification = verify_entries(&entries);
        debug!(
            entries = verification.entries_verified,
            issues = verification.issues.len(),
            "verified chain"
        );
        verification
    }

    /// Get the entry at `index`.
    pub fn get_entry(&self, index: usize) -> Result<Entry, ChainError> {
        let entries = self.read();
        entries
            .get(index)
            .cloned()
            .ok_or(ChainError::IndexOutOfRange {
                index,
                len: entries.len(),
            })
    }

    /// Entries whose timestamp lies within `[start, end]`, in chain order.
    pub fn entries_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Entry> {
        self.read()
            .iter()
            .filter(|entry| entry.timestamp >= start && entry.timestamp <= end)
            .cloned()
            .collect()
    }

    /// A window of at most `limit` entries starting at `offset`.
    ///
    /// An offset past the end yields an empty page.
    pub fn entries_page(&self, offset: usize, limit: usize) -> Page {
        let entries = self.read();
        let total = entries.len();
        let start = offset.min(total);
        let end = start.saturating_add(limit).min(total);
        Page {
            entries: entries[start..end].to_vec(),
            total,
            offset,
            limit,
        }
    }

    /// Snapshot of the whole sequence.
    pub fn entries(&self) -> Vec<Entry> {
        self.read().clone()
    }

    /// Hash of the newest entry, or the genesis sentinel for an empty chain.
    pub fn last_hash(&self) -> String {
        last_hash_of(&self.read())
    }

    /// Number of entries in the chain.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Entry count, newest hash and the first/last timestamps.
    pub fn stats(&self) -> ChainStats {
        let entries = self.read();
        ChainStats {
            total_entries: entries.len(),
            last_hash: last_hash_of(&entries),
            first_timestamp: entries.first().map(|entry| entry.timestamp),
            last_timestamp: entries.last().map(|entry| entry.timestamp),
        }
    }

    /// The entries as a pretty-printed JSON array, without the document
    /// wrapper.
    pub fn export_json(&self) -> Result<String, ChainError> {
        let entries = self.read();
        Ok(serde_json::to_string_pretty(&*entries)?)
    }

    /// Rewrite the backing document from the in-memory sequence.
    pub fn save(&self) -> Result<(), ChainError> {
        let entries = self.write();
        save_entries(&self.path, &entries)
    }

    // Mutations are a single push or pop, so a poisoned lock still guards a
    // consistent sequence.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn last_hash_of(entries: &[Entry]) -> String {
    entries
        .last()
        .map_or_else(|| GENESIS_HASH.to_string(), |entry| entry.current_hash.clone())
}
