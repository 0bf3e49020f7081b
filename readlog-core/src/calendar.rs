//! Calendar-day arithmetic.
//!
//! A calendar day is the window `[00:00:00.000, 23:59:59.999]` in the zone
//! selected by [`DayBoundary`]. Timestamps are stored in UTC; the boundary
//! decides which day they belong to.

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

/// Which clock defines midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayBoundary {
    /// The server's local time zone
    #[default]
    Local,
    /// UTC midnight regardless of where the server runs
    Utc,
}

impl DayBoundary {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayBoundary::Local => "local",
            DayBoundary::Utc => "utc",
        }
    }

    /// The calendar day containing `ts`.
    pub fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        match self {
            DayBoundary::Local => ts.with_timezone(&Local).date_naive(),
            DayBoundary::Utc => ts.date_naive(),
        }
    }

    /// Today's date on this boundary's clock.
    pub fn today(&self) -> NaiveDate {
        self.day_of(Utc::now())
    }

    /// First instant of `day`.
    pub fn start_of(&self, day: NaiveDate) -> DateTime<Utc> {
        self.resolve(day.and_time(NaiveTime::MIN))
    }

    /// The `[start, end]` window of `day`, end inclusive at millisecond precision.
    pub fn window(&self, day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start_of(day);
        let next_start = match day.succ_opt() {
            Some(next) => self.start_of(next),
            None => start + Duration::days(1),
        };
        (start, next_start - Duration::milliseconds(1))
    }

    /// The window of the day containing `ts`.
    pub fn window_containing(&self, ts: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        self.window(self.day_of(ts))
    }

    /// Interpret a wall-clock reading on this boundary's clock.
    pub fn resolve(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        match self {
            DayBoundary::Utc => naive.and_utc(),
            DayBoundary::Local => match Local.from_local_datetime(&naive) {
                LocalResult::Single(dt) => dt.with_timezone(&Utc),
                LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
                // Skipped by a DST jump: the first valid instant after the gap.
                LocalResult::None => Local
                    .from_local_datetime(&(naive + Duration::hours(1)))
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|| naive.and_utc()),
            },
        }
    }
}

impl std::fmt::Display for DayBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DayBoundary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(DayBoundary::Local),
            "utc" => Ok(DayBoundary::Utc),
            _ => Err(format!("unknown day boundary: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_utc_window_bounds() {
        let (start, end) = DayBoundary::Utc.window(day(2025, 3, 9));
        assert_eq!(start.to_rfc3339(), "2025-03-09T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-03-09T23:59:59.999+00:00");
    }

    #[test]
    fn test_window_containing_includes_timestamp() {
        let ts = day(2025, 3, 9).and_hms_opt(23, 59, 59).unwrap().and_utc();
        let (start, end) = DayBoundary::Utc.window_containing(ts);
        assert!(start <= ts && ts <= end);
        assert_eq!(DayBoundary::Utc.day_of(ts), day(2025, 3, 9));
    }

    #[test]
    fn test_local_window_contains_local_noon() {
        let noon = DayBoundary::Local.resolve(day(2025, 6, 1).and_hms_opt(12, 0, 0).unwrap());
        let (start, end) = DayBoundary::Local.window_containing(noon);
        assert!(start <= noon && noon <= end);
        assert_eq!(DayBoundary::Local.day_of(start), day(2025, 6, 1));
        assert_eq!(DayBoundary::Local.day_of(end), day(2025, 6, 1));
    }

    #[test]
    fn test_parse_boundary() {
        assert_eq!("utc".parse::<DayBoundary>().unwrap(), DayBoundary::Utc);
        assert_eq!("local".parse::<DayBoundary>().unwrap(), DayBoundary::Local);
        assert!("lunar".parse::<DayBoundary>().is_err());
    }
}
