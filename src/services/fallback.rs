//! In-memory fallback stores, one per domain (Beijing, Shanghai, Fortune).
//!
//! Secondary source for cache-aside reads and the write target when the
//! durable store is down. No eviction: entries live for the process lifetime.
use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};

use crate::repos::{
    namespace::Domain,
    records::{Record, StoredRecord},
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, StoredRecord>,
}

impl MemoryStore {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, key: &str) -> Option<StoredRecord> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn store(&self, key: impl Into<String>, value: StoredRecord) {
        self.entries.insert(key.into(), value);
    }

    /// Insert unless present. Returns whether the value was inserted.
    pub fn store_if_absent(&self, key: impl Into<String>, value: StoredRecord) -> bool {
        match self.entries.entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The per-domain stores, cheap to clone.
#[derive(Clone, Debug, Default)]
pub struct FallbackStores {
    beijing: Arc<MemoryStore>,
    shanghai: Arc<MemoryStore>,
    fortune: Arc<MemoryStore>,
}

impl FallbackStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain(&self, domain: Domain) -> &MemoryStore {
        match domain {
            Domain::Beijing => &self.beijing,
            Domain::Shanghai => &self.shanghai,
            Domain::Fortune => &self.fortune,
        }
    }

    /// Seed a record into its domain, keeping any existing entry.
    pub fn seed<R: Record>(&self, domain: Domain, record: R) {
        let key = record.bucket_key().to_string();
        self.domain(domain).store_if_absent(key, record.into_stored());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::records::{DailyRecord, default_daily_record};

    #[test]
    fn domains_are_independent() {
        let stores = FallbackStores::new();
        stores.seed(Domain::Beijing, default_daily_record());

        assert!(stores.domain(Domain::Beijing).contains("2025-04-08"));
        assert!(!stores.domain(Domain::Shanghai).contains("2025-04-08"));
        assert!(stores.domain(Domain::Fortune).is_empty());
    }

    #[test]
    fn store_if_absent_keeps_first_value() {
        let store = MemoryStore::new();
        let first = default_daily_record();
        let mut second = default_daily_record();
        second.totals.total_count = 1.0;

        assert!(store.store_if_absent("2025-04-08", first.clone().into_stored()));
        assert!(!store.store_if_absent("2025-04-08", second.clone().into_stored()));
        assert_eq!(
            store.load("2025-04-08").and_then(DailyRecord::from_stored),
            Some(first)
        );

        store.store("2025-04-08", second.clone().into_stored());
        assert_eq!(
            store.load("2025-04-08").and_then(DailyRecord::from_stored),
            Some(second)
        );
        assert_eq!(store.len(), 1);
    }
}
