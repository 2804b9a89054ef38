//! Log chain data structures.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::link::compute_entry_hash;

/// Caller-supplied auxiliary data attached to an entry.
///
/// Keys are unique and kept sorted; values are arbitrary JSON. Metadata never
/// takes part in hash computation.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A single record in the log chain.
///
/// Once appended, an entry is never modified by the engine. Any later change to
/// the hashed fields (everything except `metadata`) is detectable by
/// recomputing `current_hash`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Append time, assigned by the engine under the write lock.
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,

    /// Opaque payload; never interpreted.
    pub message: String,

    /// Hex-encoded signature over `message`, as supplied by the caller.
    pub signature: String,

    /// Hex-encoded public key of the signer.
    pub pubkey: String,

    /// `current_hash` of the preceding entry, or `"0"` for the genesis entry.
    pub prev_hash: String,

    /// SHA-256 over the canonical fields and `prev_hash`, lowercase hex.
    pub current_hash: String,

    /// Auxiliary key/value data, omitted from the document when empty.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub metadata: Metadata,
}

impl Entry {
    /// Build an entry and compute its `current_hash` from the given fields.
    pub fn sealed(
        timestamp: DateTime<Utc>,
        message: &str,
        signature: &str,
        pubkey: &str,
        prev_hash: &str,
        metadata: Metadata,
    ) -> Self {
        let mut entry = Entry {
            timestamp,
            message: message.to_string(),
            signature: signature.to_string(),
            pubkey: pubkey.to_string(),
            prev_hash: prev_hash.to_string(),
            current_hash: String::new(),
            metadata,
        };
        entry.current_hash = compute_entry_hash(&entry);
        entry
    }

    /// Whether the stored hash matches a fresh recomputation.
    pub fn hash_is_valid(&self) -> bool {
        self.current_hash == compute_entry_hash(self)
    }
}

/// Summary counters for a chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainStats {
    pub total_entries: usize,
    pub last_hash: String,
    #[serde(
        default,
        with = "timestamp_format::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_timestamp: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "timestamp_format::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_timestamp: Option<DateTime<Utc>>,
}

/// One window of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub entries: Vec<Entry>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Render a timestamp the way existing chain files store it.
///
/// RFC 3339 in UTC with a `Z` suffix. The fraction carries up to nine digits
/// with trailing zeros removed, and is dropped entirely on a whole second
/// (`2024-01-02T03:04:05.12Z`, `2024-01-02T03:04:05Z`). This text feeds the
/// hash, so it must not change.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let seconds = ts.to_rfc3339_opts(SecondsFormat::Secs, true);
    let nanos = ts.timestamp_subsec_nanos() % 1_000_000_000;
    if nanos == 0 {
        return seconds;
    }
    let fraction = format!("{nanos:09}");
    let base = seconds.trim_end_matches('Z');
    format!("{base}.{}Z", fraction.trim_end_matches('0'))
}

/// Parse an RFC 3339 timestamp (any offset, any fraction length) into UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Metadata, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Metadata>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde adapter for the chain's timestamp text.
pub(crate) mod timestamp_format {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::{format_timestamp, parse_timestamp};
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => serializer.serialize_some(&format_timestamp(ts)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| parse_timestamp(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
