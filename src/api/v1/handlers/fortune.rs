/*
 * Responsibility
 * - /fortune/... handler (poem of the day; region なし)
 */
use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    api::v1::{
        dto::{
            queries::{ForceQuery, PeriodQuery},
            records::validate_fortune,
        },
        extractors::Payload,
    },
    error::AppError,
    repos::{namespace::Namespace, records::FortuneRecord},
    services::write::WriteMode,
    state::AppState,
};

// today, yesterday
const DAILY_LOOKBACK: usize = 2;

pub async fn get_daily(State(state): State<AppState>) -> Result<Json<FortuneRecord>, AppError> {
    let candidates = state.keys.recent_days(DAILY_LOOKBACK);

    let poem = state
        .fetcher
        .fetch::<FortuneRecord>(&candidates, Namespace::Fortune)
        .await?
        .ok_or_else(|| {
            tracing::warn!(?candidates, "fortune not found");
            AppError::NotFound
        })?;

    Ok(Json(poem))
}

pub async fn get_period(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<FortuneRecord>>, AppError> {
    let days = query
        .validate()
        .map_err(|msg| AppError::bad_request("INVALID_PERIOD", msg))?;

    let poems = state
        .periods
        .fetch_period::<FortuneRecord>(days, Namespace::Fortune)
        .await?;

    Ok(Json(poems))
}

pub async fn add_daily(
    State(state): State<AppState>,
    Payload(poem): Payload<FortuneRecord>,
) -> Result<Json<FortuneRecord>, AppError> {
    validate_fortune(&poem).map_err(|msg| AppError::bad_request("INVALID_BODY", msg))?;

    state
        .writer
        .write(poem.clone(), Namespace::Fortune, WriteMode::IfAbsent)
        .await?;

    Ok(Json(poem))
}

pub async fn force_daily(
    State(state): State<AppState>,
    Query(query): Query<ForceQuery>,
    Payload(poem): Payload<FortuneRecord>,
) -> Result<Json<FortuneRecord>, AppError> {
    if !state.force_secret.matches(query.key.as_deref()) {
        tracing::warn!("fortune force write rejected");
        return Err(AppError::bad_request("INVALID_KEY", "invalid key"));
    }
    validate_fortune(&poem).map_err(|msg| AppError::bad_request("INVALID_BODY", msg))?;

    state
        .writer
        .write(poem.clone(), Namespace::Fortune, WriteMode::Force)
        .await?;

    Ok(Json(poem))
}
