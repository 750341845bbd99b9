/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: fetcher / periods / writer engines, key deriver, force-write secret
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{
    Engines, fetch::CacheAsideFetcher, keys::KeyDeriver, period::PeriodFetcher,
    secret::ForceWriteSecret, write::RecordWriter,
};

#[derive(Clone)]
pub struct AppState {
    pub keys: KeyDeriver,
    pub fetcher: Arc<CacheAsideFetcher>,
    pub periods: Arc<PeriodFetcher>,
    pub writer: Arc<RecordWriter>,
    pub force_secret: ForceWriteSecret,
}

impl AppState {
    pub fn new(engines: &Engines, force_secret: ForceWriteSecret) -> Self {
        Self {
            keys: engines.keys.clone(),
            fetcher: engines.fetcher.clone(),
            periods: engines.periods.clone(),
            writer: engines.writer.clone(),
            force_secret,
        }
    }
}
