use crate::shared::config::CONFIG;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Global time configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Zone used for local-time columns (DATE, TIME, TIMESTAMP). None = UTC
    pub timezone: Option<String>,
}

impl TimeConfig {
    /// Parse timezone string to chrono_tz::Tz
    pub fn parse_timezone(&self) -> Option<Tz> {
        self.timezone
            .as_ref()
            .and_then(|tz_str| tz_str.parse().ok())
    }

    /// Zone to encode local-time columns in, falling back to UTC.
    pub fn zone(&self) -> Tz {
        self.parse_timezone().unwrap_or(Tz::UTC)
    }

    /// Create from application configuration
    pub fn from_app_config() -> Self {
        CONFIG.time.clone().unwrap_or_default()
    }
}

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parses textual dates and timestamps into chrono values. Inputs without an
/// explicit offset are read as wall-clock time in the given zone.
pub struct TimeParser;

impl TimeParser {
    pub fn parse_instant(input: &str, zone: &Tz) -> Option<DateTime<Utc>> {
        let s = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        let naive = DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| Self::parse_date(s).map(|d| d.and_time(NaiveTime::MIN)))?;
        Self::resolve_local(&naive, zone)
    }

    pub fn parse_date(input: &str) -> Option<NaiveDate> {
        let s = input.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    }

    /// Maps a wall-clock time in `zone` to an instant. Ambiguous times (DST
    /// fall-back) resolve to the earlier instant; skipped times yield None.
    pub fn resolve_local(naive: &NaiveDateTime, zone: &Tz) -> Option<DateTime<Utc>> {
        zone.from_local_datetime(naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
