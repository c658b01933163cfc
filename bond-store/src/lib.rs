//! BondRail store adapter
//!
//! Narrow binary key-value boundary consumed by the bonding ledger.
//!
//! # Architecture
//!
//! - **Flat keyspace**: callers own their key prefixes; the store sees bytes
//! - **Ordered iteration**: prefix scans yield entries ascending by key bytes
//! - **Read-your-writes**: a write is visible to every later read in the
//!   same tick; atomic visibility across ticks is the embedder's concern
//!
//! Two adapters ship with the trait: [`MemoryStore`] for tests and
//! deterministic simulation, and [`RocksStore`] for durable deployments.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod error;
pub mod memory;
pub mod rocks;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use rocks::{RocksConfig, RocksStore};

/// A single key-value pair yielded by iteration.
pub type KvEntry = (Vec<u8>, Vec<u8>);

/// Binary key-value store with ordered prefix iteration.
///
/// All operations are synchronous; the surrounding system supplies
/// transactional snapshot semantics per tick.
pub trait Store {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any existing value.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Delete the value stored under `key`. Deleting a missing key is a no-op.
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Lazily iterate all entries whose key starts with `prefix`,
    /// ascending by key bytes. Each call starts a fresh scan.
    fn iterate_prefix<'a>(
        &'a self,
        prefix: &[u8],
    ) -> Result<Box<dyn Iterator<Item = Result<KvEntry>> + 'a>>;
}
