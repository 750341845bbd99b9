/*
 * Responsibility
 * - query string DTO (?days=, ?key=)
 * - 形式チェックは validate() で行う
 */
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub days: Option<String>,
}

impl PeriodQuery {
    /// Parsed `days`. Membership in 1 / 7 / 30 is checked by the period engine.
    pub fn validate(&self) -> Result<i64, &'static str> {
        let Some(days) = self.days.as_deref().map(str::trim) else {
            return Err("days is required");
        };
        days.parse::<i64>().map_err(|_| "days must be an integer")
    }
}

#[derive(Debug, Deserialize)]
pub struct ForceQuery {
    pub key: Option<String>,
}
