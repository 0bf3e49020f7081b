//! Input boundary for reading-log submissions and user registration.
//!
//! Raw input (JSON bodies, CLI flags) is deserialized into the `Raw*`
//! structs and validated into typed values before anything reaches the
//! upsert policy or the store. Every rejection is an
//! [`Error::InvalidInput`] carrying a message the user can act on.

use crate::calendar::DayBoundary;
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

/// Time of day used when a submission gives a date without a time.
pub const DEFAULT_TIME: &str = "10:30:00";

/// Fallback display name for users who register without one.
pub const ANONYMOUS_NAME: &str = "Anonymous User";

/// A reading-log submission as received.
///
/// Either `date_time` (RFC 3339) or `date` plus optional `time` must be
/// present. `met_target` is deliberately absent: it is always derived.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSubmission {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub reading_minutes: Option<i64>,
    #[serde(default)]
    pub reading_book: Option<String>,
    #[serde(default)]
    pub reading_topic: Option<String>,
    #[serde(default)]
    pub learning: Option<String>,
    #[serde(default)]
    pub questions: Option<String>,
}

/// A validated submission, ready for the upsert policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSubmission {
    pub user_id: String,
    pub date_time: DateTime<Utc>,
    pub reading_minutes: u32,
    pub reading_book: Option<String>,
    pub reading_topic: Option<String>,
    pub learning: Option<String>,
    pub questions: Option<String>,
}

impl RawSubmission {
    /// Parse a JSON body, rejecting unknown or mistyped fields.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| Error::InvalidInput(format!("malformed submission: {}", e)))
    }

    /// Validate into a [`LogSubmission`] owned by `user_id`.
    ///
    /// Wall-clock `date`/`time` pairs are read on `boundary`'s clock.
    pub fn validate(&self, user_id: &str, boundary: DayBoundary) -> Result<LogSubmission> {
        if user_id.trim().is_empty() {
            return Err(invalid("a signed-in user is required to submit a log"));
        }

        let reading_minutes = match self.reading_minutes {
            None => return Err(invalid("reading minutes are required")),
            Some(m) if m < 0 => return Err(invalid("reading minutes must be non-negative")),
            Some(m) => u32::try_from(m).map_err(|_| invalid("reading minutes are too large"))?,
        };

        let date_time = self.parse_date_time(boundary)?;

        Ok(LogSubmission {
            user_id: user_id.to_string(),
            date_time,
            reading_minutes,
            reading_book: clean_text(&self.reading_book),
            reading_topic: clean_text(&self.reading_topic),
            learning: clean_text(&self.learning),
            questions: clean_text(&self.questions),
        })
    }

    fn parse_date_time(&self, boundary: DayBoundary) -> Result<DateTime<Utc>> {
        let date_time = self.date_time.as_deref().map(str::trim);
        let date = self.date.as_deref().map(str::trim);
        let time = self.time.as_deref().map(str::trim);

        match (date_time, date, time) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(invalid(
                "give either date_time or date/time, not both",
            )),
            (Some(ts), None, None) => DateTime::parse_from_rfc3339(ts)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| {
                    invalid("date_time must be an RFC 3339 timestamp such as 2025-01-31T10:30:00Z")
                }),
            (None, Some(d), t) => {
                let day = parse_date(d)?;
                let time = parse_time(t.unwrap_or(DEFAULT_TIME))?;
                Ok(boundary.resolve(day.and_time(time)))
            }
            (None, None, Some(_)) => Err(invalid("a time was given without a date")),
            (None, None, None) => Err(invalid("a date is required")),
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| invalid(&format!("date must be YYYY-MM-DD, got '{}'", s)))
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| invalid(&format!("time must be HH:MM or HH:MM:SS, got '{}'", s)))
}

fn clean_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn invalid(msg: &str) -> Error {
    Error::InvalidInput(msg.to_string())
}

/// A registration request as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// A validated registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

impl RawUser {
    pub fn validate(&self) -> Result<NewUser> {
        let email = self
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| invalid("email is required"))?;

        let well_formed = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !email.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !well_formed {
            return Err(invalid(&format!(
                "email must look like name@example.com, got '{}'",
                email
            )));
        }

        let name = clean_text(&self.name).unwrap_or_else(|| ANONYMOUS_NAME.to_string());

        Ok(NewUser {
            name,
            email,
            is_admin: self.is_admin,
        })
    }
}
