//! Tamper-evident log chain with Ed25519 signature helpers.
//!
//! Entries are hash-linked: each `current_hash` is a SHA-256 digest over the
//! entry's timestamp, message, signature, public key and the previous entry's
//! hash. Editing any earlier entry therefore shows up when the chain is
//! re-verified. The whole chain is persisted as one JSON document.
//!
//! # Example
//!
//! ```no_run
//! use zc_chain::{keygen, sign_message, ChainEngine, Metadata};
//!
//! let chain = ChainEngine::open("/tmp/zc-example/chain.json").unwrap();
//! let (private_key, public_key) = keygen();
//!
//! let message = "service started";
//! let signature = sign_message(&private_key, message.as_bytes());
//! let entry = chain
//!     .append(message, &signature, &hex::encode(public_key), Metadata::new())
//!     .unwrap();
//! assert_eq!(entry.prev_hash, "0");
//!
//! let report = chain.verify();
//! assert!(report.valid, "problems: {:?}", report.problems());
//! ```

mod chain;
mod link;
mod persist;
mod signature;
mod types;
mod verify;

pub use chain::{ChainEngine, ChainError};
pub use link::{canonical_form, compute_entry_hash, link_hash, FIELD_SEPARATOR, GENESIS_HASH};
pub use persist::{load_entries, save_entries};
pub use signature::{keygen, public_key_for, sign_message, verify_entry_signature, verify_signature};
pub use types::{format_timestamp, parse_timestamp, ChainStats, Entry, Metadata, Page};
pub use verify::{verify_chain_signatures, verify_entries, ChainIssue, Verification};
