/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, REDIS_URL, FORCE_WRITE_SECRET など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::FixedOffset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Valkey,
    Memory,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,

    pub store_backend: StoreBackend,
    pub redis_url: String,
    pub store_timeout_ms: u64,

    pub repair_queue_capacity: usize,
    pub repair_concurrency: usize,

    pub force_write_secret: String,

    pub utc_offset: FixedOffset,
    pub seed_defaults: bool,
}

fn parsed_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parsed_or("PORT", 8080)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout_secs = parsed_or("REQUEST_TIMEOUT_SECS", 30u64)?;
        let body_limit_bytes = parsed_or("BODY_LIMIT_BYTES", 64 * 1024usize)?;

        let store_backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "valkey".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "valkey" | "redis" => StoreBackend::Valkey,
            "memory" => StoreBackend::Memory,
            _ => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let store_timeout_ms = parsed_or("STORE_TIMEOUT_MS", 2000u64)?;
        if store_timeout_ms == 0 {
            return Err(ConfigError::Invalid("STORE_TIMEOUT_MS"));
        }

        let repair_queue_capacity = parsed_or("REPAIR_QUEUE_CAPACITY", 256usize)?;
        let repair_concurrency = parsed_or("REPAIR_CONCURRENCY", 8usize)?;

        let force_write_secret = std::env::var("FORCE_WRITE_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("FORCE_WRITE_SECRET"))?;

        let utc_offset_hours = parsed_or("UTC_OFFSET_HOURS", 8i32)?;
        let utc_offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::Invalid("UTC_OFFSET_HOURS"))?;

        let seed_defaults = parsed_or("SEED_DEFAULTS", true)?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout_secs,
            body_limit_bytes,
            store_backend,
            redis_url,
            store_timeout_ms,
            repair_queue_capacity,
            repair_concurrency,
            force_write_secret,
            utc_offset,
            seed_defaults,
        })
    }
}
