/*
 * Responsibility
 * - JSON records <-> durable store (get / set / set-if-absent)
 * - time index maintenance (bucket key -> start-of-bucket timestamp)
 * - every durable call is bounded by a deadline; an elapsed deadline is a StoreError
 * - a failed index update after a successful write is RepoError::Index
 */
use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    repos::{error::RepoError, namespace::Namespace, records::Record},
    services::store::{DurableStore, StoreError},
};

#[derive(Clone)]
pub struct RecordRepo {
    store: Arc<dyn DurableStore>,
    timeout: Duration,
}

impl RecordRepo {
    pub fn new(store: Arc<dyn DurableStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(self.store.ping()).await
    }

    pub async fn get<R: Record>(&self, ns: Namespace, bucket: &str) -> Result<Option<R>, RepoError> {
        let key = ns.record_key(bucket);

        let Some(json) = self.bounded(self.store.get(&key)).await? else {
            return Ok(None);
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| RepoError::Corrupt { key, source })
    }

    /// Overwrite the record, then index it.
    pub async fn put<R: Record>(&self, ns: Namespace, record: &R, score: i64) -> Result<(), RepoError> {
        let bucket = record.bucket_key();
        let key = ns.record_key(bucket);
        let json = serde_json::to_string(record).map_err(RepoError::Serialize)?;

        // No TTL: records are permanent.
        self.bounded(self.store.set(&key, &json, None)).await?;
        self.reindex(ns, bucket, score).await?;

        tracing::debug!(%key, "record stored");
        Ok(())
    }

    /// Store the record unless the key already exists, then index it.
    ///
    /// Returns whether this call created the record.
    pub async fn put_if_absent<R: Record>(
        &self,
        ns: Namespace,
        record: &R,
        score: i64,
    ) -> Result<bool, RepoError> {
        let bucket = record.bucket_key();
        let key = ns.record_key(bucket);
        let json = serde_json::to_string(record).map_err(RepoError::Serialize)?;

        let created = self.bounded(self.store.set_if_absent(&key, &json)).await?;
        // ZADD is idempotent, so an existing record keeps (or regains) its index entry.
        self.reindex(ns, bucket, score).await?;

        tracing::debug!(%key, created, "record stored if absent");
        Ok(created)
    }

    /// Add (or re-add) `bucket` to the namespace time index.
    pub async fn reindex(&self, ns: Namespace, bucket: &str, score: i64) -> Result<(), RepoError> {
        let index = ns.index_name();
        self.bounded(self.store.index_add(&index, bucket, score as f64))
            .await
            .map_err(|source| RepoError::Index { index, source })
    }

    /// Bucket keys indexed in `[min, max]` (Unix seconds, inclusive), index order.
    pub async fn indexed_between(
        &self,
        ns: Namespace,
        min: i64,
        max: i64,
    ) -> Result<Vec<String>, RepoError> {
        let index = ns.index_name();
        let buckets = self
            .bounded(
                self.store
                    .index_range_by_score(&index, min as f64, max as f64),
            )
            .await?;
        Ok(buckets)
    }
}
