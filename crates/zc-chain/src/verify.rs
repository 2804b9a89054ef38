//! Chain verification.

use serde::Serialize;
use std::fmt;

use crate::link::{compute_entry_hash, GENESIS_HASH};
use crate::signature::verify_entry_signature;
use crate::types::Entry;

/// A structural problem found while walking a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainIssue {
    /// Stored `current_hash` differs from the recomputed digest.
    HashMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    /// `prev_hash` does not match the preceding entry's `current_hash`.
    BrokenLink {
        index: usize,
        expected: String,
        actual: String,
    },
    /// The first entry's `prev_hash` is not the genesis sentinel.
    InvalidGenesis { actual: String },
}

impl ChainIssue {
    /// Position of the offending entry.
    pub fn index(&self) -> usize {
        match self {
            Self::HashMismatch { index, .. } | Self::BrokenLink { index, .. } => *index,
            Self::InvalidGenesis { .. } => 0,
        }
    }
}

impl fmt::Display for ChainIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HashMismatch { index, .. } => write!(f, "hash mismatch at {index}"),
            Self::BrokenLink { index, .. } => write!(f, "broken link at {index}"),
            Self::InvalidGenesis { .. } => write!(f, "invalid genesis"),
        }
    }
}

/// Outcome of a full-chain verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// `true` exactly when `issues` is empty.
    pub valid: bool,
    pub entries_verified: usize,
    /// Every problem found, in index order.
    pub issues: Vec<ChainIssue>,
}

impl Verification {
    /// Human-readable problem descriptions, in index order.
    pub fn problems(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

/// Verify hashes and links of an entry sequence.
///
/// For each entry the hash is recomputed first, then the link to its
/// predecessor (or the genesis sentinel for index 0) is checked. The walk
/// never stops early, so one corrupted entry cannot hide later ones.
pub fn verify_entries(entries: &[Entry]) -> Verification {
    let mut issues = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let expected = compute_entry_hash(entry);
        if entry.current_hash != expected {
            issues.push(ChainIssue::HashMismatch {
                index,
                expected,
                actual: entry.current_hash.clone(),
            });
        }

        match index.checked_sub(1).map(|prev| &entries[prev]) {
            Some(prev) => {
                if entry.prev_hash != prev.current_hash {
                    issues.push(ChainIssue::BrokenLink {
                        index,
                        expected: prev.current_hash.clone(),
                        actual: entry.prev_hash.clone(),
                    });
                }
            }
            None => {
                if entry.prev_hash != GENESIS_HASH {
                    issues.push(ChainIssue::InvalidGenesis {
                        actual: entry.prev_hash.clone(),
                    });
                }
            }
        }
    }

    Verification {
        valid: issues.is_empty(),
        entries_verified: entries.len(),
        issues,
    }
}

/// Indices of entries whose signature does not verify against their own
/// `pubkey` and `message`.
///
/// This is independent of hash verification; a chain can be structurally
/// intact while carrying unsigned or forged entries.
pub fn verify_chain_signatures(entries: &[Entry]) -> Vec<usize> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| !verify_entry_signature(entry))
        .map(|(index, _)| index)
        .collect()
}
