/*
 * Responsibility
 * - cache-aside read over an ordered candidate list
 *   1. durable store (authoritative)
 *   2. in-memory fallback; a hit there is returned right away and copied back
 *      to the durable store in the background
 * - the first candidate found in either store wins
 */
use thiserror::Error;

use crate::{
    repos::{error::RepoError, namespace::Namespace, record_repo::RecordRepo, records::Record},
    services::{fallback::FallbackStores, keys::KeyDeriver, repair::RepairDispatcher},
};

#[derive(Debug, Error)]
pub enum FetchError {
    /// Durable data that does not deserialize is surfaced, not treated as a miss.
    #[error("corrupt record {key}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone)]
pub struct CacheAsideFetcher {
    repo: RecordRepo,
    memory: FallbackStores,
    keys: KeyDeriver,
    repairs: RepairDispatcher,
}

impl CacheAsideFetcher {
    pub fn new(
        repo: RecordRepo,
        memory: FallbackStores,
        keys: KeyDeriver,
        repairs: RepairDispatcher,
    ) -> Self {
        Self {
            repo,
            memory,
            keys,
            repairs,
        }
    }

    /// First record found for `candidates`, tried in order.
    ///
    /// `Ok(None)` when no candidate exists in either store. Durable-store
    /// failures only end the candidate being tried.
    pub async fn fetch<R: Record>(
        &self,
        candidates: &[String],
        ns: Namespace,
    ) -> Result<Option<R>, FetchError> {
        let memory = self.memory.domain(ns.domain());

        for bucket in candidates {
            match self.repo.get::<R>(ns, bucket).await {
                Ok(Some(record)) => return Ok(Some(record)),
                Ok(None) => {}
                Err(RepoError::Corrupt { key, source }) => {
                    tracing::error!(%key, error = %source, "stored record does not deserialize");
                    return Err(FetchError::Corrupt { key, source });
                }
                Err(err) => {
                    tracing::warn!(bucket = %bucket, ?ns, error = ?err, "durable read failed, trying memory");
                }
            }

            if let Some(record) = memory.load(bucket).and_then(R::from_stored) {
                tracing::debug!(bucket = %bucket, ?ns, "served from memory fallback");
                self.schedule_repair(ns, &record);
                return Ok(Some(record));
            }
        }

        tracing::debug!(?candidates, ?ns, "no candidate found");
        Ok(None)
    }

    fn schedule_repair<R: Record>(&self, ns: Namespace, record: &R) {
        let bucket = record.bucket_key();
        let score = match self.keys.parse_key(bucket) {
            Ok(score) => score,
            Err(err) => {
                // Unindexable keys stay memory-only.
                tracing::warn!(bucket = %bucket, error = %err, "skip repair");
                return;
            }
        };

        let repo = self.repo.clone();
        let record = record.clone();
        self.repairs.submit(ns.record_key(bucket), async move {
            repo.put(ns, &record, score).await
        });
    }
}
