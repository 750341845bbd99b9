/*
 * Responsibility
 * - "last N days" reads (N in 1 / 7 / 30) over the namespace time index
 * - window is [now - (N + 1) days, now], one extra day of lookback slack
 * - at most N records; per-key failures are skipped, not fatal
 */
use thiserror::Error;

use crate::{
    repos::{error::RepoError, namespace::Namespace, record_repo::RecordRepo, records::Record},
    services::keys::KeyDeriver,
};

pub const ALLOWED_PERIODS: [i64; 3] = [1, 7, 30];

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum PeriodError {
    #[error("invalid period: {0} (must be 1, 7, or 30)")]
    InvalidPeriod(i64),
    #[error("time index unavailable")]
    Index(#[source] RepoError),
}

pub fn validate_period(period_days: i64) -> Result<(), PeriodError> {
    if ALLOWED_PERIODS.contains(&period_days) {
        Ok(())
    } else {
        Err(PeriodError::InvalidPeriod(period_days))
    }
}

#[derive(Clone)]
pub struct PeriodFetcher {
    repo: RecordRepo,
    keys: KeyDeriver,
}

impl PeriodFetcher {
    pub fn new(repo: RecordRepo, keys: KeyDeriver) -> Self {
        Self { repo, keys }
    }

    /// Records indexed within the last `period_days` (+1) days.
    ///
    /// The index is truncated to `period_days` entries in index order before
    /// the records are fetched, so with more matches than requested the
    /// result is not guaranteed to be the most recent ones.
    pub async fn fetch_period<R: Record>(
        &self,
        period_days: i64,
        ns: Namespace,
    ) -> Result<Vec<R>, PeriodError> {
        validate_period(period_days)?;

        let now = self.keys.now_timestamp();
        let since = now - (period_days + 1) * SECONDS_PER_DAY;

        let mut buckets = self
            .repo
            .indexed_between(ns, since, now)
            .await
            .map_err(|err| {
                tracing::error!(?ns, period_days, error = ?err, "time index query failed");
                PeriodError::Index(err)
            })?;
        buckets.truncate(period_days as usize);

        let mut records = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            match self.repo.get::<R>(ns, bucket).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    tracing::warn!(bucket = %bucket, ?ns, "indexed record missing");
                }
                Err(err) => {
                    tracing::error!(bucket = %bucket, ?ns, error = ?err, "skip record");
                }
            }
        }

        Ok(records)
    }
}
