/*
 * Responsibility
 * - POST body (record shape) の形式チェック
 * - bucket key の形式は write engine 側で parse して確認する
 */
use crate::repos::records::{DailyRecord, FortuneRecord, MonthlyRecord, Totals};

fn validate_totals(totals: &Totals) -> Result<(), &'static str> {
    let required = [
        totals.total_count,
        totals.total_area,
        totals.house_count,
        totals.house_area,
    ];
    let optional = [totals.house_price, totals.total_price];

    let all_valid = required
        .into_iter()
        .chain(optional.into_iter().flatten())
        .all(|v| v.is_finite() && v >= 0.0);

    if all_valid {
        Ok(())
    } else {
        Err("totals must be finite, non-negative numbers")
    }
}

pub fn validate_daily(record: &DailyRecord) -> Result<(), &'static str> {
    if record.day.trim().is_empty() {
        return Err("day is required");
    }
    validate_totals(&record.totals)
}

pub fn validate_monthly(record: &MonthlyRecord) -> Result<(), &'static str> {
    if record.month.trim().is_empty() {
        return Err("month is required");
    }
    validate_totals(&record.totals)
}

pub fn validate_fortune(record: &FortuneRecord) -> Result<(), &'static str> {
    if record.day.trim().is_empty() {
        return Err("day is required");
    }
    if record.title.trim().is_empty() {
        return Err("title is required");
    }
    if record.content.is_empty() {
        return Err("content must have at least one line");
    }
    Ok(())
}
