//! Versioned bucket storage for cached responses.
//!
//! A bucket is a named key-value store mapping request identity to the
//! most recently stored response for that identity. Buckets are named
//! after version tags; the agent keeps exactly one current bucket and
//! evicts the rest during activation.
//!
//! Storage is reached through the [`BucketStore`] trait so embedding
//! hosts (and tests) can swap backends. Two adapters are provided:
//!
//! - [`MemoryStore`]: a HashMap behind a tokio RwLock, no persistence
//! - [`SqliteStore`]: tokio-rusqlite with WAL mode and schema migrations

pub mod entry;
pub mod key;
pub mod memory;
pub mod migrations;
pub mod sqlite;

use async_trait::async_trait;

pub use crate::Error;
pub use entry::StoredResponse;
pub use key::RequestKey;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Cache storage interface consumed by the agent.
///
/// All operations are atomic at the single-entry level; concurrent
/// writers to the same identity race last-write-wins. Entries are
/// best-effort snapshots, not authoritative state.
#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Open a bucket, creating it if absent. Idempotent.
    async fn open_bucket(&self, name: &str) -> Result<(), Error>;

    /// All bucket names currently known to the store.
    async fn list_buckets(&self) -> Result<Vec<String>, Error>;

    /// Delete a bucket and every entry in it.
    ///
    /// Returns whether the bucket existed.
    async fn delete_bucket(&self, name: &str) -> Result<bool, Error>;

    /// Insert or overwrite the entry for a request identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BucketMissing`] if the bucket has not been opened.
    async fn put(&self, bucket: &str, request: &RequestKey, response: StoredResponse) -> Result<(), Error>;

    /// Look up the stored response for a request identity.
    ///
    /// Returns `None` on a miss or when the bucket does not exist.
    async fn match_entry(&self, bucket: &str, request: &RequestKey) -> Result<Option<StoredResponse>, Error>;

    /// Number of entries in a bucket (0 if the bucket does not exist).
    async fn count_entries(&self, bucket: &str) -> Result<u64, Error>;
}
