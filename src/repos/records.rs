/*
 * Responsibility
 * - stored record shapes (daily / monthly house totals, fortune poem)
 * - Region (city partition) and the key each record is bucketed under
 */
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Beijing,
    Shanghai,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Beijing => "beijing",
            Region::Shanghai => "shanghai",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown region: {0}")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beijing" | "bj" => Ok(Region::Beijing),
            "shanghai" | "sh" => Ok(Region::Shanghai),
            _ => Err(UnknownRegion(s.to_string())),
        }
    }
}

/// House totals for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_count: f64,
    pub total_area: f64,
    pub house_count: f64,
    pub house_area: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// `YYYY-MM-DD` or `YYYY-MM-DD-HH`
    pub day: String,
    #[serde(rename = "daily_data")]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// `YYYY-MM`
    pub month: String,
    #[serde(rename = "month_data")]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FortuneRecord {
    pub day: String,
    pub title: String,
    pub author: String,
    pub content: Vec<String>,
}

/// What the in-memory fallback store holds.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRecord {
    Daily(DailyRecord),
    Monthly(MonthlyRecord),
    Fortune(FortuneRecord),
}

/// A record that can be stored under a bucket key.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn bucket_key(&self) -> &str;
    fn into_stored(self) -> StoredRecord;
    fn from_stored(stored: StoredRecord) -> Option<Self>;
}

impl Record for DailyRecord {
    fn bucket_key(&self) -> &str {
        &self.day
    }

    fn into_stored(self) -> StoredRecord {
        StoredRecord::Daily(self)
    }

    fn from_stored(stored: StoredRecord) -> Option<Self> {
        match stored {
            StoredRecord::Daily(r) => Some(r),
            _ => None,
        }
    }
}

impl Record for MonthlyRecord {
    fn bucket_key(&self) -> &str {
        &self.month
    }

    fn into_stored(self) -> StoredRecord {
        StoredRecord::Monthly(self)
    }

    fn from_stored(stored: StoredRecord) -> Option<Self> {
        match stored {
            StoredRecord::Monthly(r) => Some(r),
            _ => None,
        }
    }
}

impl Record for FortuneRecord {
    fn bucket_key(&self) -> &str {
        &self.day
    }

    fn into_stored(self) -> StoredRecord {
        StoredRecord::Fortune(self)
    }

    fn from_stored(stored: StoredRecord) -> Option<Self> {
        match stored {
            StoredRecord::Fortune(r) => Some(r),
            _ => None,
        }
    }
}

/// Historical Beijing daily totals served before any write arrives.
pub fn default_daily_record() -> DailyRecord {
    DailyRecord {
        day: "2025-04-08".to_string(),
        totals: Totals {
            total_count: 744.0,
            total_area: 64840.0,
            house_count: 619.0,
            house_area: 58754.18,
            house_price: None,
            total_price: None,
        },
    }
}
