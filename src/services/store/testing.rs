//! Failure-injecting store wrapper for unit tests.
use async_trait::async_trait;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::services::store::{
    client::{DurableStore, StoreError, StoreResult},
    memory::InProcessStore,
};

#[derive(Default)]
pub struct FlakyStore {
    pub inner: InProcessStore,
    pub fail_get: AtomicBool,
    pub fail_set: AtomicBool,
    pub fail_index: AtomicBool,
    pub set_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    fn check(flag: &AtomicBool) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::BackendConnection("injected failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DurableStore for FlakyStore {
    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_set)?;
        self.inner.set(key, value, ttl).await
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> StoreResult<bool> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_set)?;
        self.inner.set_if_absent(key, value).await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Self::check(&self.fail_get)?;
        self.inner.get(key).await
    }

    async fn index_add(&self, index: &str, member: &str, score: f64) -> StoreResult<()> {
        Self::check(&self.fail_index)?;
        self.inner.index_add(index, member, score).await
    }

    async fn index_range_by_score(
        &self,
        index: &str,
        min: f64,
        max: f64,
    ) -> StoreResult<Vec<String>> {
        Self::check(&self.fail_index)?;
        self.inner.index_range_by_score(index, min, max).await
    }
}
