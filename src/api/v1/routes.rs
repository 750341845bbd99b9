/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /houses/{region}/..., /fortune/...
 * - force 系は shared secret (?key=) を handler 側で確認する
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{fortune, health::health, houses};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/houses/{region}/daily",
            get(houses::get_daily).post(houses::add_daily),
        )
        .route("/houses/{region}/daily/force", post(houses::force_daily))
        .route("/houses/{region}/hourly", get(houses::get_hourly))
        .route(
            "/houses/{region}/monthly",
            get(houses::get_monthly).post(houses::add_monthly),
        )
        .route("/houses/{region}/period", get(houses::get_period))
        .route(
            "/fortune/daily",
            get(fortune::get_daily).post(fortune::add_daily),
        )
        .route("/fortune/daily/force", post(fortune::force_daily))
        .route("/fortune/period", get(fortune::get_period))
}
