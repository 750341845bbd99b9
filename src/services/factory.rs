/// Factory: build the record engines from application `Config`.
use std::{sync::Arc, time::Duration};

use crate::{
    config::{Config, StoreBackend},
    repos::{namespace::Domain, record_repo::RecordRepo, records::default_daily_record},
    services::{
        clock::SystemClock,
        fallback::FallbackStores,
        fetch::CacheAsideFetcher,
        keys::KeyDeriver,
        period::PeriodFetcher,
        repair::RepairDispatcher,
        store::{DurableStore, InProcessStore, StoreError, ValkeyStore},
        write::RecordWriter,
    },
};

pub struct Engines {
    pub keys: KeyDeriver,
    pub fetcher: Arc<CacheAsideFetcher>,
    pub periods: Arc<PeriodFetcher>,
    pub writer: Arc<RecordWriter>,
    pub repairs: RepairDispatcher,
}

async fn build_store(config: &Config) -> Result<Arc<dyn DurableStore>, StoreError> {
    let store: Arc<dyn DurableStore> = match config.store_backend {
        StoreBackend::Valkey => Arc::new(ValkeyStore::new(&config.redis_url).await?),
        StoreBackend::Memory => Arc::new(InProcessStore::new()),
    };
    Ok(store)
}

/// Must run inside the tokio runtime (the repair worker is spawned here).
pub async fn build_engines(config: &Config) -> Result<Engines, StoreError> {
    let store = build_store(config).await?;
    let repo = RecordRepo::new(store, Duration::from_millis(config.store_timeout_ms));

    // Fail fast when the durable store is unreachable at startup.
    repo.ping().await?;
    tracing::info!(backend = repo.backend_name(), "durable store ready");

    let memory = FallbackStores::new();
    if config.seed_defaults {
        memory.seed(Domain::Beijing, default_daily_record());
    }

    let keys = KeyDeriver::new(Arc::new(SystemClock), config.utc_offset);
    let repairs = RepairDispatcher::start(config.repair_queue_capacity, config.repair_concurrency);

    Ok(Engines {
        fetcher: Arc::new(CacheAsideFetcher::new(
            repo.clone(),
            memory.clone(),
            keys.clone(),
            repairs.clone(),
        )),
        periods: Arc::new(PeriodFetcher::new(repo.clone(), keys.clone())),
        writer: Arc::new(RecordWriter::new(
            repo,
            memory,
            keys.clone(),
            repairs.clone(),
        )),
        keys,
        repairs,
    })
}
