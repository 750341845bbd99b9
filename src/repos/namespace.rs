/*
 * Responsibility
 * - (kind, region) -> durable record key / time index name / fallback domain
 */
use crate::{
    repos::records::Region,
    services::keys::Granularity,
};

const HOUSE_DAILY_PREFIX: &str = "house:daily";
const HOUSE_HOURLY_PREFIX: &str = "house:hourly";
const HOUSE_MONTHLY_PREFIX: &str = "house:monthly";
const HOUSE_DAYS_INDEX: &str = "house:days";
const HOUSE_HOURS_INDEX: &str = "house:hours";
const HOUSE_MONTHS_INDEX: &str = "house:months";
const FORTUNE_DAY_PREFIX: &str = "fortune:day";
const FORTUNE_DAYS_INDEX: &str = "fortune:days";

/// In-memory fallback partition. Daily and monthly records of one city share a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Beijing,
    Shanghai,
    Fortune,
}

/// Record kind plus, for house data, the city it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Daily(Region),
    Hourly(Region),
    Monthly(Region),
    Fortune,
}

impl Namespace {
    pub fn region(&self) -> Option<Region> {
        match self {
            Namespace::Daily(r) | Namespace::Hourly(r) | Namespace::Monthly(r) => Some(*r),
            Namespace::Fortune => None,
        }
    }

    pub fn domain(&self) -> Domain {
        match self.region() {
            Some(Region::Beijing) => Domain::Beijing,
            Some(Region::Shanghai) => Domain::Shanghai,
            None => Domain::Fortune,
        }
    }

    /// Width of the bucket keys this namespace holds.
    pub fn granularity(&self) -> Granularity {
        match self {
            Namespace::Hourly(_) => Granularity::Hour,
            Namespace::Monthly(_) => Granularity::Month,
            Namespace::Daily(_) | Namespace::Fortune => Granularity::Day,
        }
    }

    /// Durable key of the record stored under `bucket`.
    pub fn record_key(&self, bucket: &str) -> String {
        match self {
            Namespace::Daily(r) => format!("{HOUSE_DAILY_PREFIX}:{r}:{bucket}"),
            Namespace::Hourly(r) => format!("{HOUSE_HOURLY_PREFIX}:{r}:{bucket}"),
            Namespace::Monthly(r) => format!("{HOUSE_MONTHLY_PREFIX}:{r}:{bucket}"),
            Namespace::Fortune => format!("{FORTUNE_DAY_PREFIX}:{bucket}"),
        }
    }

    /// Sorted-set index of the bucket keys written in this namespace.
    pub fn index_name(&self) -> String {
        match self {
            Namespace::Daily(r) => format!("{HOUSE_DAYS_INDEX}:{r}"),
            Namespace::Hourly(r) => format!("{HOUSE_HOURS_INDEX}:{r}"),
            Namespace::Monthly(r) => format!("{HOUSE_MONTHS_INDEX}:{r}"),
            Namespace::Fortune => FORTUNE_DAYS_INDEX.to_string(),
        }
    }
}
