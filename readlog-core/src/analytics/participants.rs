//! Admin views over every participant's logs.

use crate::error::{Error, Result};
use crate::store::LogStore;
use crate::types::{ReadingLogEntry, RequestContext, User};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Aggregate counts for one participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParticipantStats {
    pub total_logs: i64,
    pub total_minutes: i64,
    pub targets_met: i64,
    /// Share of logs that met the target, rounded half up; 0 with no logs
    pub target_percentage: u32,
}

impl ParticipantStats {
    pub fn from_counts(total_logs: i64, total_minutes: i64, targets_met: i64) -> Self {
        let target_percentage = if total_logs > 0 {
            ((targets_met * 200 + total_logs) / (total_logs * 2)) as u32
        } else {
            0
        };

        Self {
            total_logs,
            total_minutes,
            targets_met,
            target_percentage,
        }
    }

    pub fn from_logs(logs: &[ReadingLogEntry]) -> Self {
        Self::from_counts(
            logs.len() as i64,
            logs.iter().map(|l| i64::from(l.reading_minutes)).sum(),
            logs.iter().filter(|l| l.met_target).count() as i64,
        )
    }
}

/// One row of the admin participant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantRow {
    pub user: User,
    pub stats: ParticipantStats,
    pub last_logged_at: Option<DateTime<Utc>>,
}

/// Everything an admin sees for a single participant.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantReport {
    pub user: User,
    pub stats: ParticipantStats,
    /// Newest first
    pub logs: Vec<ReadingLogEntry>,
}

/// All non-admin participants. Admin only.
pub fn list_participants<S: LogStore>(
    store: &S,
    ctx: &RequestContext,
) -> Result<Vec<ParticipantRow>> {
    ctx.require_admin()?;
    store.list_participants()
}

/// One participant's full history and stats. Admin only.
pub fn participant_report<S: LogStore>(
    store: &S,
    ctx: &RequestContext,
    user_id: &str,
) -> Result<ParticipantReport> {
    ctx.require_admin()?;

    let user = store
        .get_user(user_id)?
        .ok_or_else(|| Error::NotFound(user_id.to_string()))?;

    let mut logs = store.find_logs_for_user(&user.id)?;
    logs.reverse();
    let stats = ParticipantStats::from_logs(&logs);

    tracing::debug!(
        admin_id = %ctx.user_id,
        user_id = %user.id,
        logs = logs.len(),
        "Built participant report"
    );

    Ok(ParticipantReport { user, stats, logs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(ParticipantStats::from_counts(0, 0, 0).target_percentage, 0);
        assert_eq!(ParticipantStats::from_counts(3, 0, 1).target_percentage, 33);
        assert_eq!(ParticipantStats::from_counts(3, 0, 2).target_percentage, 67);
        assert_eq!(ParticipantStats::from_counts(8, 0, 1).target_percentage, 13);
        assert_eq!(ParticipantStats::from_counts(4, 0, 4).target_percentage, 100);
    }
}
