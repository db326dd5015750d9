//! Persistent key-value storage and the API key store built on it.
//!
//! - [`kv`]: the [`kv::KeyValueStore`] trait with JSON-file and in-memory
//!   backends
//! - [`keys`]: [`keys::KeyStore`], the list of saved API keys plus the
//!   selected-key pointer and the legacy single-key slot

pub mod keys;
pub mod kv;

pub use keys::KeyStore;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
