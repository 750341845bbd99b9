//! Background dispatcher for durable-store repairs.
//!
//! A memory hit during a cache-aside read is copied back into the durable
//! store without the request waiting for it. Jobs go through a bounded queue
//! and run under a concurrency limit; when the queue is full the repair is
//! dropped (the next read of the same key submits it again).
//!
//! Repairs are not deduplicated: two concurrent reads of the same missing key
//! may both write it, which is harmless since the value is identical.
use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use tokio::sync::{Semaphore, mpsc};

use crate::repos::error::RepoError;

type RepairWork = Pin<Box<dyn Future<Output = Result<(), RepoError>> + Send + 'static>>;

struct RepairJob {
    key: String,
    work: RepairWork,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Completion log of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairStats {
    pub submitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub dropped: u64,
}

impl RepairStats {
    pub fn finished(&self) -> u64 {
        self.succeeded + self.failed + self.dropped
    }
}

#[derive(Clone)]
pub struct RepairDispatcher {
    tx: mpsc::Sender<RepairJob>,
    counters: Arc<Counters>,
}

impl RepairDispatcher {
    /// Start the worker on the current tokio runtime.
    pub fn start(queue_capacity: usize, concurrency: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let counters = Arc::new(Counters::default());

        tokio::spawn(run_worker(rx, concurrency.max(1), counters.clone()));

        Self { tx, counters }
    }

    /// Queue a repair. Never blocks and never fails the caller.
    pub fn submit<F>(&self, key: impl Into<String>, work: F)
    where
        F: Future<Output = Result<(), RepoError>> + Send + 'static,
    {
        let job = RepairJob {
            key: key.into(),
            work: Box::pin(work),
        };
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);

        if let Err(err) = self.tx.try_send(job) {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            let (reason, job) = match err {
                mpsc::error::TrySendError::Full(job) => ("queue full", job),
                mpsc::error::TrySendError::Closed(job) => ("dispatcher stopped", job),
            };
            tracing::warn!(key = %job.key, reason, "repair dropped");
        }
    }

    pub fn stats(&self) -> RepairStats {
        RepairStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }

    /// Wait until every submitted repair has finished.
    #[cfg(test)]
    pub async fn settled(&self) -> RepairStats {
        let wait = async {
            loop {
                let stats = self.stats();
                if stats.finished() == stats.submitted {
                    return stats;
                }
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(std::time::Duration::from_secs(5), wait)
            .await
            .expect("repairs settle")
    }
}

async fn run_worker(mut rx: mpsc::Receiver<RepairJob>, concurrency: usize, counters: Arc<Counters>) {
    let limit = Arc::new(Semaphore::new(concurrency));

    while let Some(job) = rx.recv().await {
        let Ok(permit) = limit.clone().acquire_owned().await else {
            break;
        };
        let counters = counters.clone();

        tokio::spawn(async move {
            let _permit = permit;
            match job.work.await {
                Ok(()) => {
                    counters.succeeded.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(key = %job.key, "repair written to durable store");
                }
                Err(err) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(key = %job.key, error = ?err, "repair failed");
                }
            }
        });
    }
}
