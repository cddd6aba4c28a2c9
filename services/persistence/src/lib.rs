//! Local Flag Persistence
//!
//! The only state the demo keeps across sessions: the chosen interface
//! language and whether the (simulated) wallet is connected.
//!
//! - `store`: `KeyValueStore` trait with in-memory and JSON-file backends
//! - `preferences`: typed accessors for the two persisted keys
//!
//! File writes are atomic (temp file + rename) and carry a SHA-256 over
//! the entries so a truncated or hand-edited file is detected on load.

pub mod preferences;
pub mod store;

pub use preferences::{Language, Preferences, CONNECTED_KEY, LANGUAGE_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
