//! Durable store interface used by the record repository (reads, writes, time index).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for durable store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable-store errors (transport/command/deadline).
///
/// Note:
/// - Callers recover from these locally (memory fallback on read and write),
///   so this type stays independent from `AppError`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    BackendConnection(String),
    #[error("store command error: {0}")]
    BackendCommand(String),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

/// A permanent key-value store with sorted-set indexing.
///
/// String-based on purpose:
/// - records are stored as JSON strings
/// - the time index maps a bucket key (member) to its Unix timestamp (score)
///
/// Implementations are shared as `Arc<dyn DurableStore>`.
#[async_trait]
pub trait DurableStore: Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Connectivity check used at startup.
    async fn ping(&self) -> StoreResult<()>;

    // Set a value. `ttl = None` means permanent.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()>;

    // Set a permanent value only if the key does not exist.
    //
    // Returns:
    // - `Ok(true)`  if the key was set
    // - `Ok(false)` if the key already exists (value left untouched)
    async fn set_if_absent(&self, key: &str, value: &str) -> StoreResult<bool>;

    // Get UTF-8 string value.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    // Add (or re-score) a member of a sorted-set index.
    async fn index_add(&self, index: &str, member: &str, score: f64) -> StoreResult<()>;

    // Members whose score lies in `[min, max]`, in index order (ascending score).
    async fn index_range_by_score(&self, index: &str, min: f64, max: f64)
    -> StoreResult<Vec<String>>;
}
