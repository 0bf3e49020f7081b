//! Daily log upsert policy.
//!
//! A submission either creates the user's log for that calendar day or
//! replaces every field of the one already there. Resubmitting on the same
//! day converges to the latest values and never adds a second row.
//!
//! The read-then-write is not atomic by itself. Stores enforce one log per
//! `(user, day)` and report a losing insert as [`Error::Conflict`]; the
//! policy then re-reads the winning row and updates it.
//! [`Database::submit_daily_log`](crate::Database::submit_daily_log) also
//! wraps the whole policy in a write transaction.

use crate::calendar::DayBoundary;
use crate::error::{Error, Result};
use crate::store::LogStore;
use crate::submission::LogSubmission;
use crate::types::{meets_target, LogFields, UpsertAction, UpsertOutcome};

/// Create or replace the submitting user's log for the submission's day.
pub fn upsert_daily_log<S: LogStore>(
    store: &S,
    boundary: DayBoundary,
    submission: &LogSubmission,
) -> Result<UpsertOutcome> {
    let user_id = submission.user_id.as_str();
    let fields = LogFields {
        date_time: submission.date_time,
        reading_minutes: submission.reading_minutes,
        met_target: meets_target(submission.reading_minutes),
        reading_book: submission.reading_book.clone(),
        reading_topic: submission.reading_topic.clone(),
        learning: submission.learning.clone(),
        questions: submission.questions.clone(),
    };
    let (start, end) = boundary.window_containing(fields.date_time);

    if store.get_user(user_id)?.is_none() {
        return Err(Error::NotFound(user_id.to_string()));
    }

    if let Some(existing) = store.find_log_in_day_window(user_id, start, end)? {
        let entry = store.update_log(&existing.id, &fields)?;
        tracing::info!(
            user_id,
            log_id = %entry.id,
            minutes = entry.reading_minutes,
            met_target = entry.met_target,
            "Replaced daily reading log"
        );
        return Ok(UpsertOutcome {
            action: UpsertAction::Updated,
            entry,
        });
    }

    match store.create_log(user_id, &fields) {
        Ok(entry) => {
            tracing::info!(
                user_id,
                log_id = %entry.id,
                minutes = entry.reading_minutes,
                met_target = entry.met_target,
                "Created daily reading log"
            );
            Ok(UpsertOutcome {
                action: UpsertAction::Created,
                entry,
            })
        }
        Err(Error::Conflict(reason)) => {
            tracing::warn!(user_id, %reason, "Concurrent submission won the insert, updating it");
            let existing = store
                .find_log_in_day_window(user_id, start, end)?
                .ok_or(Error::Conflict(reason))?;
            let entry = store.update_log(&existing.id, &fields)?;
            Ok(UpsertOutcome {
                action: UpsertAction::Updated,
                entry,
            })
        }
        Err(e) => Err(e),
    }
}
