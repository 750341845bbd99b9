use async_trait::async_trait;
use std::time::Duration;

use crate::services::store::client::{DurableStore, StoreError, StoreResult};

/// Valkey/Redis-backed durable store.
///
/// Records are plain string keys without expiration, the time index is a
/// sorted set (ZADD / ZRANGEBYSCORE).
#[derive(Clone)]
pub struct ValkeyStore {
    manager: redis::aio::ConnectionManager,
}

impl ValkeyStore {
    // Create a Valkey store from a URL like `redis://localhost:6379`
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::BackendConnection(e.to_string()))?;

        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| StoreError::BackendConnection(e.to_string()))?;

        Ok(Self { manager })
    }
}

fn command_error(e: redis::RedisError) -> StoreError {
    StoreError::BackendCommand(e.to_string())
}

#[async_trait]
impl DurableStore for ValkeyStore {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.manager.clone();

        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::BackendConnection(e.to_string()))?;

        Ok(())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        let mut conn = self.manager.clone();

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            // EX expects integer seconds. We clamp to at least 1 sec.
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }

        let _: () = cmd.query_async(&mut conn).await.map_err(command_error)?;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> StoreResult<bool> {
        // `SET key value NX` returns `OK` if set, Nil if the key exists.
        let mut conn = self.manager.clone();

        let resp: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;

        Ok(resp.is_some())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.manager.clone();

        let resp: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;

        Ok(resp)
    }

    async fn index_add(&self, index: &str, member: &str, score: f64) -> StoreResult<()> {
        let mut conn = self.manager.clone();

        // ZADD returns the number of new members; re-scoring an existing one returns 0.
        let _added: i64 = redis::cmd("ZADD")
            .arg(index)
            .arg(score)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;

        Ok(())
    }

    async fn index_range_by_score(
        &self,
        index: &str,
        min: f64,
        max: f64,
    ) -> StoreResult<Vec<String>> {
        let mut conn = self.manager.clone();

        let members: Vec<String> = redis::cmd("ZRANGEBYSCORE")
            .arg(index)
            .arg(min)
            .arg(max)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;

        Ok(members)
    }
}
