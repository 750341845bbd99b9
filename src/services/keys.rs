/*
 * Responsibility
 * - relative offset (hours / months) -> bucket key (`YYYY-MM-DD`, `YYYY-MM-DD-HH`, `YYYY-MM`)
 * - bucket key -> Unix timestamp (time index score)
 * - most-recent-first candidate lists for lookback reads
 *
 * Keys are rendered in one fixed UTC offset so that a bucket key and its
 * score always agree.
 */
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::services::clock::Clock;

const DAY_FORMAT: &str = "%Y-%m-%d";
const HOUR_FORMAT: &str = "%Y-%m-%d-%H";
const MONTH_FORMAT: &str = "%Y-%m";

const HOUR_KEY_LEN: usize = 13;
const MONTH_KEY_LEN: usize = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid bucket key: {0:?}")]
    Invalid(String),
    #[error("month offset out of range: {0}")]
    OutOfRange(i32),
    #[error("bucket key {key:?} is not a {expected:?} key")]
    Granularity { key: String, expected: Granularity },
}

/// Bucket width of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Hour,
    Day,
    Month,
}

/// Picked by length: 13 chars is an hour key, 7 chars a month key, anything
/// else is treated as a day key.
pub fn granularity_of(key: &str) -> Granularity {
    match key.len() {
        HOUR_KEY_LEN => Granularity::Hour,
        MONTH_KEY_LEN => Granularity::Month,
        _ => Granularity::Day,
    }
}

#[derive(Clone)]
pub struct KeyDeriver {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl KeyDeriver {
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self { clock, offset }
    }

    fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.offset)
    }

    pub fn now_timestamp(&self) -> i64 {
        self.clock.now().timestamp()
    }

    /// Day key for "now minus `offset_hours` hours".
    pub fn day_key(&self, offset_hours: i64) -> String {
        (self.now() - Duration::hours(offset_hours))
            .format(DAY_FORMAT)
            .to_string()
    }

    /// Hour key for "now minus `offset_hours` hours".
    pub fn hour_key(&self, offset_hours: i64) -> String {
        (self.now() - Duration::hours(offset_hours))
            .format(HOUR_FORMAT)
            .to_string()
    }

    /// Month key relative to the current month (`-1` is last month).
    ///
    /// A non-zero offset goes to the first day of the target month, adds one
    /// month and steps back one day, then formats that last day of the target
    /// month.
    pub fn month_key(&self, offset_months: i32) -> Result<String, KeyError> {
        let now = self.now();
        if offset_months == 0 {
            return Ok(now.format(MONTH_FORMAT).to_string());
        }

        let out_of_range = || KeyError::OutOfRange(offset_months);
        let first =
            NaiveDate::from_ymd_opt(now.year(), now.month(), 1).ok_or_else(out_of_range)?;

        let shift = Months::new(offset_months.unsigned_abs());
        let target_first = if offset_months > 0 {
            first.checked_add_months(shift)
        } else {
            first.checked_sub_months(shift)
        }
        .ok_or_else(out_of_range)?;

        let last_day = target_first
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .ok_or_else(out_of_range)?;

        Ok(last_day.format(MONTH_FORMAT).to_string())
    }

    /// Start-of-bucket Unix timestamp for a bucket key, format per [`granularity_of`].
    pub fn parse_key(&self, key: &str) -> Result<i64, KeyError> {
        let invalid = || KeyError::Invalid(key.to_string());

        let naive: NaiveDateTime = match granularity_of(key) {
            Granularity::Hour => {
                NaiveDateTime::parse_from_str(&format!("{key}:00"), &format!("{HOUR_FORMAT}:%M"))
                    .map_err(|_| invalid())?
            }
            Granularity::Month => NaiveDate::parse_from_str(&format!("{key}-01"), DAY_FORMAT)
                .map_err(|_| invalid())?
                .and_hms_opt(0, 0, 0)
                .ok_or_else(invalid)?,
            Granularity::Day => NaiveDate::parse_from_str(key, DAY_FORMAT)
                .map_err(|_| invalid())?
                .and_hms_opt(0, 0, 0)
                .ok_or_else(invalid)?,
        };

        naive
            .and_local_timezone(self.offset)
            .single()
            .map(|t| t.timestamp())
            .ok_or_else(invalid)
    }

    /// Today, yesterday, ... (`n` day keys, most recent first).
    pub fn recent_days(&self, n: usize) -> Vec<String> {
        (0..n as i64).map(|i| self.day_key(i * 24)).collect()
    }

    /// This hour and the `n - 1` hours before it.
    pub fn recent_hours(&self, n: usize) -> Vec<String> {
        (0..n as i64).map(|i| self.hour_key(i)).collect()
    }

    /// This month and the `n - 1` months before it.
    pub fn recent_months(&self, n: usize) -> Result<Vec<String>, KeyError> {
        (0..n as i32).map(|i| self.month_key(-i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::FixedClock;

    fn deriver_at(rfc3339: &str) -> KeyDeriver {
        KeyDeriver::new(
            Arc::new(FixedClock::at(rfc3339)),
            FixedOffset::east_opt(8 * 3600).unwrap(),
        )
    }

    #[test]
    fn day_and_hour_keys_follow_the_offset() {
        let keys = deriver_at("2025-04-08T01:30:00+08:00");

        assert_eq!(keys.day_key(0), "2025-04-08");
        assert_eq!(keys.day_key(24), "2025-04-07");
        assert_eq!(keys.day_key(2), "2025-04-07");
        assert_eq!(keys.hour_key(0), "2025-04-08-01");
        assert_eq!(keys.hour_key(2), "2025-04-07-23");
        // Negative offsets look ahead.
        assert_eq!(keys.hour_key(-1), "2025-04-08-02");
    }

    #[test]
    fn keys_use_configured_offset_not_utc() {
        // 2025-04-07T20:00Z is already the 8th in UTC+8.
        let keys = deriver_at("2025-04-07T20:00:00Z");
        assert_eq!(keys.day_key(0), "2025-04-08");
    }

    #[test]
    fn month_key_zero_is_current_month() {
        assert_eq!(deriver_at("2025-03-31T12:00:00+08:00").month_key(0).unwrap(), "2025-03");
        assert_eq!(deriver_at("2024-12-01T00:00:00+08:00").month_key(0).unwrap(), "2024-12");
    }

    #[test]
    fn month_key_handles_rollover_and_month_lengths() {
        // March 31st -> February (28 days), same year.
        assert_eq!(deriver_at("2025-03-31T12:00:00+08:00").month_key(-1).unwrap(), "2025-02");
        // Leap year.
        assert_eq!(deriver_at("2024-03-30T12:00:00+08:00").month_key(-1).unwrap(), "2024-02");
        // January -> previous December.
        assert_eq!(deriver_at("2025-01-15T12:00:00+08:00").month_key(-1).unwrap(), "2024-12");
        assert_eq!(deriver_at("2025-01-15T12:00:00+08:00").month_key(-2).unwrap(), "2024-11");
        // Forward across the year end.
        assert_eq!(deriver_at("2025-12-31T12:00:00+08:00").month_key(1).unwrap(), "2026-01");
    }

    #[test]
    fn recent_candidates_are_most_recent_first() {
        let keys = deriver_at("2025-01-01T00:30:00+08:00");

        assert_eq!(
            keys.recent_days(3),
            vec!["2025-01-01", "2024-12-31", "2024-12-30"]
        );
        assert_eq!(
            keys.recent_hours(2),
            vec!["2025-01-01-00", "2024-12-31-23"]
        );
        assert_eq!(
            keys.recent_months(3).unwrap(),
            vec!["2025-01", "2024-12", "2024-11"]
        );
    }

    #[test]
    fn parse_key_picks_format_by_length() {
        let keys = deriver_at("2025-04-08T00:00:00+08:00");

        // 2025-04-08T00:00:00+08:00
        assert_eq!(keys.parse_key("2025-04-08").unwrap(), 1_744_041_600);
        assert_eq!(keys.parse_key("2025-04-08-13").unwrap(), 1_744_041_600 + 13 * 3600);
        // 2025-04-01T00:00:00+08:00
        assert_eq!(keys.parse_key("2025-04").unwrap(), 1_743_436_800);
    }

    #[test]
    fn granularity_follows_key_shape() {
        assert_eq!(granularity_of("2025-04-08-13"), Granularity::Hour);
        assert_eq!(granularity_of("2025-04-08"), Granularity::Day);
        assert_eq!(granularity_of("2025-04"), Granularity::Month);
    }

    #[test]
    fn parse_key_rejects_garbage() {
        let keys = deriver_at("2025-04-08T00:00:00+08:00");

        for bad in ["", "today", "2025-13-01", "2025-04-08-25", "2025/04/08", "2025-04-08T1"] {
            assert_eq!(
                keys.parse_key(bad),
                Err(KeyError::Invalid(bad.to_string())),
                "{bad}"
            );
        }
    }
}
