//! Hash linking: the canonical form of an entry and its SHA-256 digest.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::types::{format_timestamp, Entry};

/// `prev_hash` of the first entry in every chain.
pub const GENESIS_HASH: &str = "0";

/// Joins canonical fields. Fields are not escaped, so a `|` inside a field
/// can shift boundaries; existing chains depend on this exact form.
pub const FIELD_SEPARATOR: &str = "|";

/// Build the string that is hashed for an entry.
///
/// Field order: timestamp, message, signature, pubkey, prev_hash.
pub fn canonical_form(
    timestamp: &DateTime<Utc>,
    message: &str,
    signature: &str,
    pubkey: &str,
    prev_hash: &str,
) -> String {
    let timestamp = format_timestamp(timestamp);
    let fields = [
        timestamp.as_str(),
        message,
        signature,
        pubkey,
        prev_hash,
    ];
    fields.join(FIELD_SEPARATOR)
}

/// Compute the link digest for a set of entry fields, as lowercase hex.
pub fn link_hash(
    timestamp: &DateTime<Utc>,
    message: &str,
    signature: &str,
    pubkey: &str,
    prev_hash: &str,
) -> String {
    let canonical = canonical_form(timestamp, message, signature, pubkey, prev_hash);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recompute the digest an entry should carry in `current_hash`.
///
/// `metadata` and the stored `current_hash` are ignored.
pub fn compute_entry_hash(entry: &Entry) -> String {
    link_hash(
        &entry.timestamp,
        &entry.message,
        &entry.signature,
        &entry.pubkey,
        &entry.prev_hash,
    )
}
