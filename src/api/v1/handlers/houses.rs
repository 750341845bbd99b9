/*
 * Responsibility
 * - /houses/{region}/... handler
 * - query / body を検証 → candidate list を作って engine 呼び出し → JSON
 * - 該当なしは 404 {"msg": "data not found"}
 */
use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    api::v1::{
        dto::{
            queries::{ForceQuery, PeriodQuery},
            records::{validate_daily, validate_monthly},
        },
        extractors::{Payload, RegionPath},
    },
    error::AppError,
    repos::{
        namespace::Namespace,
        records::{DailyRecord, MonthlyRecord, Region},
    },
    services::{
        keys::{Granularity, granularity_of},
        write::WriteMode,
    },
    state::AppState,
};

// today, yesterday, the day before
const DAILY_LOOKBACK: usize = 3;
const HOURLY_LOOKBACK: usize = 3;
const MONTHLY_LOOKBACK: usize = 3;

/// Daily and hourly records share a body shape; the key width picks the namespace.
fn daily_or_hourly(region: Region, record: &DailyRecord) -> Namespace {
    match granularity_of(&record.day) {
        Granularity::Hour => Namespace::Hourly(region),
        _ => Namespace::Daily(region),
    }
}

pub async fn get_daily(
    State(state): State<AppState>,
    RegionPath(region): RegionPath,
) -> Result<Json<DailyRecord>, AppError> {
    let candidates = state.keys.recent_days(DAILY_LOOKBACK);

    let record = state
        .fetcher
        .fetch::<DailyRecord>(&candidates, Namespace::Daily(region))
        .await?
        .ok_or_else(|| {
            tracing::warn!(%region, ?candidates, "daily data not found");
            AppError::NotFound
        })?;

    Ok(Json(record))
}

pub async fn get_hourly(
    State(state): State<AppState>,
    RegionPath(region): RegionPath,
) -> Result<Json<DailyRecord>, AppError> {
    let candidates = state.keys.recent_hours(HOURLY_LOOKBACK);

    let record = state
        .fetcher
        .fetch::<DailyRecord>(&candidates, Namespace::Hourly(region))
        .await?
        .ok_or_else(|| {
            tracing::warn!(%region, ?candidates, "hourly data not found");
            AppError::NotFound
        })?;

    Ok(Json(record))
}

pub async fn get_monthly(
    State(state): State<AppState>,
    RegionPath(region): RegionPath,
) -> Result<Json<MonthlyRecord>, AppError> {
    let candidates = state.keys.recent_months(MONTHLY_LOOKBACK).map_err(|e| {
        tracing::error!(error = %e, "month candidates");
        AppError::Internal
    })?;

    let record = state
        .fetcher
        .fetch::<MonthlyRecord>(&candidates, Namespace::Monthly(region))
        .await?
        .ok_or_else(|| {
            tracing::warn!(%region, ?candidates, "monthly data not found");
            AppError::NotFound
        })?;

    Ok(Json(record))
}

pub async fn get_period(
    State(state): State<AppState>,
    RegionPath(region): RegionPath,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<DailyRecord>>, AppError> {
    let days = query
        .validate()
        .map_err(|msg| AppError::bad_request("INVALID_PERIOD", msg))?;

    let records = state
        .periods
        .fetch_period::<DailyRecord>(days, Namespace::Daily(region))
        .await?;

    Ok(Json(records))
}

pub async fn add_daily(
    State(state): State<AppState>,
    RegionPath(region): RegionPath,
    Payload(record): Payload<DailyRecord>,
) -> Result<Json<DailyRecord>, AppError> {
    validate_daily(&record).map_err(|msg| AppError::bad_request("INVALID_BODY", msg))?;

    state
        .writer
        .write(record.clone(), daily_or_hourly(region, &record), WriteMode::IfAbsent)
        .await?;

    Ok(Json(record))
}

pub async fn add_monthly(
    State(state): State<AppState>,
    RegionPath(region): RegionPath,
    Payload(record): Payload<MonthlyRecord>,
) -> Result<Json<MonthlyRecord>, AppError> {
    validate_monthly(&record).map_err(|msg| AppError::bad_request("INVALID_BODY", msg))?;

    state
        .writer
        .write(record.clone(), Namespace::Monthly(region), WriteMode::IfAbsent)
        .await?;

    Ok(Json(record))
}

pub async fn force_daily(
    State(state): State<AppState>,
    RegionPath(region): RegionPath,
    Query(query): Query<ForceQuery>,
    Payload(record): Payload<DailyRecord>,
) -> Result<Json<DailyRecord>, AppError> {
    if !state.force_secret.matches(query.key.as_deref()) {
        tracing::warn!(%region, "force write rejected");
        return Err(AppError::bad_request("INVALID_KEY", "invalid key"));
    }
    validate_daily(&record).map_err(|msg| AppError::bad_request("INVALID_BODY", msg))?;

    state
        .writer
        .write(record.clone(), daily_or_hourly(region, &record), WriteMode::Force)
        .await?;

    Ok(Json(record))
}
