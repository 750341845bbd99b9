use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::Duration,
};

use crate::services::store::client::{DurableStore, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    data: HashMap<String, String>,
    indexes: HashMap<String, HashMap<String, f64>>,
}

/// In-process durable store (`STORE_BACKEND=memory`, tests).
///
/// Same contract as the Valkey backend. TTLs are accepted but not enforced;
/// every write through this service is permanent anyway.
#[derive(Clone, Default)]
pub struct InProcessStore {
    inner: Arc<RwLock<Inner>>,
}

impl InProcessStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::BackendCommand("in-process store lock poisoned".into())
}

#[async_trait]
impl DurableStore for InProcessStore {
    fn backend_name(&self) -> &'static str {
        "in-process"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> StoreResult<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.data.contains_key(key) {
            return Ok(false);
        }
        inner.data.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.data.get(key).cloned())
    }

    async fn index_add(&self, index: &str, member: &str, score: f64) -> StoreResult<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner
            .indexes
            .entry(index.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn index_range_by_score(
        &self,
        index: &str,
        min: f64,
        max: f64,
    ) -> StoreResult<Vec<String>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let Some(set) = inner.indexes.get(index) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<(&String, f64)> = set
            .iter()
            .filter(|(_, score)| **score >= min && **score <= max)
            .map(|(member, score)| (member, *score))
            .collect();
        // Sorted-set order: by score, then lexicographically by member.
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        Ok(hits.into_iter().map(|(member, _)| member.clone()).collect())
    }
}
