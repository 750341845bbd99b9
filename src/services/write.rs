/*
 * Responsibility
 * - record writes: durable store + time index, memory fallback when the durable store fails
 * - IfAbsent: first write wins (existing durable or memory entries are kept)
 * - Force: overwrite durable and memory regardless of what exists
 * - record written but index update failed: index re-added in the background
 * - callers are not told whether an IfAbsent write was kept or dropped
 */
use std::time::Duration;

use thiserror::Error;

use crate::{
    repos::{error::RepoError, namespace::Namespace, record_repo::RecordRepo, records::Record},
    services::{
        fallback::FallbackStores,
        keys::{KeyDeriver, KeyError, granularity_of},
        repair::RepairDispatcher,
    },
};

const REINDEX_ATTEMPTS: u32 = 5;
const REINDEX_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    IfAbsent,
    Force,
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    InvalidKey(#[from] KeyError),
}

#[derive(Clone)]
pub struct RecordWriter {
    repo: RecordRepo,
    memory: FallbackStores,
    keys: KeyDeriver,
    repairs: RepairDispatcher,
}

impl RecordWriter {
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

    /// Durable-store failures are absorbed here; only a malformed bucket key
    /// (or one of the wrong width for `ns`) fails.
    pub async fn write<R: Record>(
        &self,
        record: R,
        ns: Namespace,
        mode: WriteMode,
    ) -> Result<(), WriteError> {
        let bucket = record.bucket_key().to_string();
        let score = self.keys.parse_key(&bucket)?;
        if granularity_of(&bucket) != ns.granularity() {
            return Err(KeyError::Granularity {
                key: bucket,
                expected: ns.granularity(),
            }
            .into());
        }
        let memory = self.memory.domain(ns.domain());

        match mode {
            WriteMode::IfAbsent => {
                let persisted = self.repo.put_if_absent(ns, &record, score).await;
                match persisted {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::debug!(bucket = %bucket, ?ns, "record exists, write dropped");
                    }
                    Err(err @ RepoError::Index { .. }) => {
                        tracing::warn!(bucket = %bucket, ?ns, error = ?err, "record stored, index update failed");
                        self.schedule_reindex(ns, bucket, score);
                    }
                    Err(err) => {
                        tracing::warn!(bucket = %bucket, ?ns, error = ?err, "durable write failed, using memory");
                        if memory.store_if_absent(bucket.clone(), record.into_stored()) {
                            tracing::info!(bucket = %bucket, ?ns, "record kept in memory fallback");
                        }
                    }
                }
            }
            WriteMode::Force => {
                let persisted = self.repo.put(ns, &record, score).await;
                memory.store(bucket.clone(), record.into_stored());
                tracing::info!(bucket = %bucket, ?ns, "record overwritten");
                match persisted {
                    Ok(()) => {}
                    Err(err @ RepoError::Index { .. }) => {
                        tracing::warn!(bucket = %bucket, ?ns, error = ?err, "record stored, index update failed");
                        self.schedule_reindex(ns, bucket, score);
                    }
                    Err(err) => {
                        tracing::warn!(bucket = %bucket, ?ns, error = ?err, "forced durable write failed");
                    }
                }
            }
        }

        Ok(())
    }

    /// Re-add the index entry of a durable record, retrying with backoff.
    ///
    /// Reads find the record in the durable store and never repair it, so
    /// this is the only path that restores its index entry.
    fn schedule_reindex(&self, ns: Namespace, bucket: String, score: i64) {
        let repo = self.repo.clone();
        self.repairs.submit(ns.record_key(&bucket), async move {
            let mut delay = REINDEX_BACKOFF;
            let mut attempt = 1;
            loop {
                match repo.reindex(ns, &bucket, score).await {
                    Ok(()) => return Ok(()),
                    Err(err) if attempt >= REINDEX_ATTEMPTS => return Err(err),
                    Err(err) => {
                        tracing::debug!(bucket = %bucket, attempt, error = ?err, "index re-add failed, retrying");
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                        attempt += 1;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::{
        repos::records::{DailyRecord, FortuneRecord, MonthlyRecord, Region, default_daily_record},
        services::{store::DurableStore, testkit::Harness},
    };

    fn with_count(count: f64) -> DailyRecord {
        let mut rec = default_daily_record();
        rec.totals.total_count = count;
        rec
    }

    fn day(key: &str) -> Vec<String> {
        vec![key.to_string()]
    }

    #[tokio::test]
    async fn if_absent_is_first_write_wins() {
        let h = Harness::new();
        let ns = Namespace::Daily(Region::Shanghai);

        h.writer.write(with_count(744.0), ns, WriteMode::IfAbsent).await.unwrap();
        h.writer.write(with_count(1.0), ns, WriteMode::IfAbsent).await.unwrap();

        let got = h.fetcher.fetch::<DailyRecord>(&day("2025-04-08"), ns).await.unwrap();
        assert_eq!(got, Some(with_count(744.0)));
        // Durable success never touches memory.
        assert!(h.memory.domain(ns.domain()).is_empty());
    }

    #[tokio::test]
    async fn written_records_are_indexed_and_fetchable() {
        let h = Harness::new();
        let ns = Namespace::Monthly(Region::Beijing);
        let rec = MonthlyRecord {
            month: "2025-03".into(),
            totals: default_daily_record().totals,
        };

        h.writer.write(rec.clone(), ns, WriteMode::IfAbsent).await.unwrap();

        let got = h.fetcher.fetch::<MonthlyRecord>(&day("2025-03"), ns).await.unwrap();
        assert_eq!(got, Some(rec));
        let indexed = h
            .store
            .inner
            .index_range_by_score("house:months:beijing", 0.0, f64::MAX)
            .await
            .unwrap();
        assert_eq!(indexed, vec!["2025-03"]);
    }

    #[tokio::test]
    async fn force_replaces_existing_record() {
        let h = Harness::new();
        let ns = Namespace::Daily(Region::Beijing);
        h.memory.seed(ns.domain(), with_count(5.0));
        h.writer.write(with_count(5.0), ns, WriteMode::IfAbsent).await.unwrap();

        h.writer.write(with_count(744.0), ns, WriteMode::Force).await.unwrap();

        let got = h.fetcher.fetch::<DailyRecord>(&day("2025-04-08"), ns).await.unwrap();
        assert_eq!(got, Some(with_count(744.0)));
        let in_memory = h
            .memory
            .domain(ns.domain())
            .load("2025-04-08")
            .and_then(DailyRecord::from_stored);
        assert_eq!(in_memory, Some(with_count(744.0)));
    }

    #[tokio::test]
    async fn durable_failure_falls_back_to_memory_and_heals_on_read() {
        let h = Harness::new();
        let ns = Namespace::Daily(Region::Beijing);
        h.store.fail_set.store(true, Ordering::SeqCst);

        h.writer.write(with_count(744.0), ns, WriteMode::IfAbsent).await.unwrap();
        assert!(h.memory.domain(ns.domain()).contains("2025-04-08"));
        assert!(h.store.inner.get("house:daily:beijing:2025-04-08").await.unwrap().is_none());

        // Store recovers; the next read is served from memory and repairs durable.
        h.store.fail_set.store(false, Ordering::SeqCst);
        let got = h.fetcher.fetch::<DailyRecord>(&day("2025-04-08"), ns).await.unwrap();
        assert_eq!(got, Some(with_count(744.0)));
        assert_eq!(h.repairs.settled().await.succeeded, 1);
        assert!(h.store.inner.get("house:daily:beijing:2025-04-08").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn memory_fallback_keeps_first_value() {
        let h = Harness::new();
        let ns = Namespace::Daily(Region::Beijing);
        h.store.fail_set.store(true, Ordering::SeqCst);

        h.writer.write(with_count(744.0), ns, WriteMode::IfAbsent).await.unwrap();
        h.writer.write(with_count(1.0), ns, WriteMode::IfAbsent).await.unwrap();

        let kept = h
            .memory
            .domain(ns.domain())
            .load("2025-04-08")
            .and_then(DailyRecord::from_stored);
        assert_eq!(kept, Some(with_count(744.0)));
    }

    #[tokio::test]
    async fn index_failure_is_healed_in_the_background() {
        let h = Harness::new();
        let ns = Namespace::Fortune;
        h.store.fail_index.store(true, Ordering::SeqCst);
        let poem = FortuneRecord {
            day: "2025-04-08".into(),
            title: "登鹳雀楼".into(),
            author: "王之涣".into(),
            content: vec!["白日依山尽".into(), "黄河入海流".into()],
        };

        h.writer.write(poem.clone(), ns, WriteMode::IfAbsent).await.unwrap();

        // Durable holds the record, so memory stays untouched.
        assert!(h.store.inner.get("fortune:day:2025-04-08").await.unwrap().is_some());
        assert!(!h.memory.domain(ns.domain()).contains("2025-04-08"));

        h.store.fail_index.store(false, Ordering::SeqCst);
        let stats = h.repairs.settled().await;
        assert_eq!((stats.submitted, stats.succeeded), (1, 1));

        let week = h.periods.fetch_period::<FortuneRecord>(7, ns).await.unwrap();
        assert_eq!(week, vec![poem]);
    }

    #[tokio::test]
    async fn forced_index_failure_is_healed_too() {
        let h = Harness::new();
        let ns = Namespace::Daily(Region::Shanghai);
        h.store.fail_index.store(true, Ordering::SeqCst);

        h.writer.write(with_count(744.0), ns, WriteMode::Force).await.unwrap();
        h.store.fail_index.store(false, Ordering::SeqCst);

        assert_eq!(h.repairs.settled().await.succeeded, 1);
        let indexed = h
            .store
            .inner
            .index_range_by_score("house:days:shanghai", 0.0, f64::MAX)
            .await
            .unwrap();
        assert_eq!(indexed, vec!["2025-04-08"]);
    }

    #[tokio::test]
    async fn force_overwrites_memory_when_durable_is_down() {
        let h = Harness::new();
        let ns = Namespace::Daily(Region::Beijing);
        h.memory.seed(ns.domain(), with_count(5.0));
        h.store.fail_set.store(true, Ordering::SeqCst);

        h.writer.write(with_count(744.0), ns, WriteMode::Force).await.unwrap();

        let in_memory = h
            .memory
            .domain(ns.domain())
            .load("2025-04-08")
            .and_then(DailyRecord::from_stored);
        assert_eq!(in_memory, Some(with_count(744.0)));
        assert!(h.store.inner.get("house:daily:beijing:2025-04-08").await.unwrap().is_none());
        assert_eq!(h.repairs.stats().submitted, 0);
    }

    #[tokio::test]
    async fn hour_keys_stay_out_of_the_daily_period() {
        let h = Harness::new();
        let daily = Namespace::Daily(Region::Beijing);
        let mut hour = with_count(3.0);
        hour.day = "2025-04-07-10".into();

        let err = h
            .writer
            .write(hour.clone(), daily, WriteMode::IfAbsent)
            .await
            .unwrap_err();
        assert!(matches!(err, WriteError::InvalidKey(KeyError::Granularity { .. })));

        h.writer
            .write(hour, Namespace::Hourly(Region::Beijing), WriteMode::IfAbsent)
            .await
            .unwrap();
        h.writer.write(with_count(744.0), daily, WriteMode::IfAbsent).await.unwrap();

        let got = h.periods.fetch_period::<DailyRecord>(1, daily).await.unwrap();
        assert_eq!(got, vec![with_count(744.0)]);
    }

    #[tokio::test]
    async fn malformed_bucket_key_is_rejected() {
        let h = Harness::new();
        let mut rec = default_daily_record();
        rec.day = "yesterday".into();

        let err = h
            .writer
            .write(rec, Namespace::Daily(Region::Beijing), WriteMode::Force)
            .await
            .unwrap_err();

        assert!(matches!(err, WriteError::InvalidKey(KeyError::Invalid(_))));
        assert_eq!(h.store.set_calls(), 0);
    }
}
