//! Core domain types for readlog
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **User** | A participant; admins browse everyone's logs and are left off the leaderboard |
//! | **Reading log** | One reading session record, at most one per user per calendar day |
//! | **Target** | [`TARGET_MINUTES`] of reading; a log at or above it has `met_target` set |
//! | **Calendar day** | Midnight-to-midnight window on the configured [`DayBoundary`](crate::calendar::DayBoundary) |

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Daily reading target in minutes. Fixed policy, not user-editable.
pub const TARGET_MINUTES: u32 = 60;

/// Whether `minutes` of reading meets the daily target.
pub fn meets_target(minutes: u32) -> bool {
    minutes >= TARGET_MINUTES
}

// ============================================
// Users
// ============================================

/// A registered participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier (UUID v4)
    pub id: String,
    /// Display name
    pub name: String,
    /// Unique login email
    pub email: String,
    /// Admins see every participant and do not compete
    pub is_admin: bool,
    /// When the user registered
    pub created_at: DateTime<Utc>,
}

/// Identity of the caller, supplied by the session layer for each request.
///
/// Passed explicitly into every operation; nothing reads identity from
/// ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: String,
    pub is_admin: bool,
}

impl RequestContext {
    pub fn new(user_id: impl Into<String>, is_admin: bool) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin,
        }
    }

    /// Context for an already-resolved user.
    pub fn for_user(user: &User) -> Self {
        Self::new(user.id.clone(), user.is_admin)
    }

    /// Fail with `Unauthorized` unless the caller is an admin.
    pub fn require_admin(&self) -> crate::Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(crate::Error::Unauthorized(
                "admin access is required to browse participant logs".to_string(),
            ))
        }
    }
}

// ============================================
// Reading logs
// ============================================

/// Every writable field of a reading log.
///
/// `create_log` and `update_log` both take the full set; an update replaces
/// all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFields {
    pub date_time: DateTime<Utc>,
    pub reading_minutes: u32,
    pub met_target: bool,
    pub reading_book: Option<String>,
    pub reading_topic: Option<String>,
    pub learning: Option<String>,
    pub questions: Option<String>,
}

/// A stored reading session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingLogEntry {
    /// Store-assigned identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// When the session happened; only its calendar day matters for streaks
    pub date_time: DateTime<Utc>,
    pub reading_minutes: u32,
    /// Derived at write time from `reading_minutes`
    pub met_target: bool,
    pub reading_book: Option<String>,
    pub reading_topic: Option<String>,
    pub learning: Option<String>,
    pub questions: Option<String>,
}

impl ReadingLogEntry {
    /// Calendar-day status used by the streak calendar.
    pub fn day_status(&self, boundary: crate::calendar::DayBoundary) -> DayStatus {
        DayStatus {
            date: boundary.day_of(self.date_time),
            met_target: self.met_target,
        }
    }

    /// Chart point for the minutes time series.
    pub fn daily_minutes(&self, boundary: crate::calendar::DayBoundary) -> DailyMinutes {
        DailyMinutes {
            date: boundary.day_of(self.date_time),
            minutes: self.reading_minutes,
        }
    }
}

/// Whether a submission created a row or replaced that day's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Created,
    Updated,
}

impl UpsertAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertAction::Created => "created",
            UpsertAction::Updated => "updated",
        }
    }
}

impl std::fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a daily log submission.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertOutcome {
    pub action: UpsertAction,
    pub entry: ReadingLogEntry,
}

// ============================================
// Aggregation rows
// ============================================

/// Met/missed status of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatus {
    pub date: NaiveDate,
    pub met_target: bool,
}

/// Minutes read on one calendar day; a chart point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMinutes {
    pub date: NaiveDate,
    pub minutes: u32,
}

/// Total minutes for one user, as grouped by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMinutes {
    pub user_id: String,
    pub total_minutes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_threshold() {
        assert!(meets_target(60));
        assert!(meets_target(61));
        assert!(!meets_target(59));
        assert!(!meets_target(0));
    }

    #[test]
    fn test_require_admin() {
        assert!(RequestContext::new("a", true).require_admin().is_ok());
        assert!(matches!(
            RequestContext::new("u", false).require_admin(),
            Err(crate::Error::Unauthorized(_))
        ));
    }

    #[test]
    fn test_upsert_action_serializes_snake_case() {
        let json = serde_json::to_string(&UpsertAction::Updated).unwrap();
        assert_eq!(json, "\"updated\"");
    }
}
