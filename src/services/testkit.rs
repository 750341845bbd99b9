//! Engines wired over a failure-injecting store and a frozen clock.
use std::{sync::Arc, time::Duration};

use chrono::FixedOffset;

use crate::{
    repos::record_repo::RecordRepo,
    services::{
        clock::FixedClock, fallback::FallbackStores, fetch::CacheAsideFetcher, keys::KeyDeriver,
        period::PeriodFetcher, repair::RepairDispatcher, store::testing::FlakyStore,
        write::RecordWriter,
    },
};

pub const NOW: &str = "2025-04-08T12:00:00+08:00";

pub struct Harness {
    pub store: Arc<FlakyStore>,
    pub repo: RecordRepo,
    pub memory: FallbackStores,
    pub keys: KeyDeriver,
    pub repairs: RepairDispatcher,
    pub fetcher: CacheAsideFetcher,
    pub periods: PeriodFetcher,
    pub writer: RecordWriter,
}

impl Harness {
    pub fn new() -> Self {
        let store = FlakyStore::new();
        let repo = RecordRepo::new(store.clone(), Duration::from_secs(1));
        let memory = FallbackStores::new();
        let keys = KeyDeriver::new(
            Arc::new(FixedClock::at(NOW)),
            FixedOffset::east_opt(8 * 3600).expect("valid offset"),
        );
        let repairs = RepairDispatcher::start(16, 4);

        Self {
            fetcher: CacheAsideFetcher::new(
                repo.clone(),
                memory.clone(),
                keys.clone(),
                repairs.clone(),
            ),
            periods: PeriodFetcher::new(repo.clone(), keys.clone()),
            writer: RecordWriter::new(
                repo.clone(),
                memory.clone(),
                keys.clone(),
                repairs.clone(),
            ),
            store,
            repo,
            memory,
            keys,
            repairs,
        }
    }
}
