//! User dashboard analytics.
//!
//! Streak calendar, progress chart, and leaderboard slice for the signed-in
//! user. Each call reads fresh rows from the store; nothing is cached.

use super::leaderboard::{self, LeaderboardEntry};
use super::marathon::{marathon_progress, MarathonProgress};
use super::streaks::{summarize_streaks, StreakSummary};
use super::timeseries::{self, build_time_series};
use crate::calendar::DayBoundary;
use crate::config::MarathonConfig;
use crate::error::{Error, Result};
use crate::store::LogStore;
use crate::types::{DailyMinutes, DayStatus, ReadingLogEntry, RequestContext, User};
use chrono::NaiveDate;
use serde::Serialize;

/// Dashboard for one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserDashboard {
    pub user: User,
    /// Streaks and the met/missed calendar
    pub streaks: StreakSummary,
    /// Minutes per logged day, oldest first
    pub progress: Vec<DailyMinutes>,
    /// Sum of `progress`
    pub total_minutes: i64,
    /// Top of the leaderboard
    pub leaderboard: Vec<LeaderboardEntry>,
    /// The user's own row when it falls outside `leaderboard`
    pub own_entry: Option<LeaderboardEntry>,
    /// Progress through the running marathon, when one is configured
    pub marathon: Option<MarathonProgress>,
}

impl UserDashboard {
    /// Format total reading time for display (e.g., "12h 5m").
    pub fn format_total(&self) -> String {
        crate::format::format_minutes(self.total_minutes)
    }
}

/// Users see their own data; admins see anyone's.
fn authorize_view(ctx: &RequestContext, user_id: &str) -> Result<()> {
    if ctx.is_admin || ctx.user_id == user_id {
        Ok(())
    } else {
        Err(Error::Unauthorized(
            "you can only view your own reading logs".to_string(),
        ))
    }
}

fn load_user_logs<S: LogStore>(
    store: &S,
    ctx: &RequestContext,
    user_id: &str,
) -> Result<(User, Vec<ReadingLogEntry>)> {
    authorize_view(ctx, user_id)?;
    let user = store
        .get_user(user_id)?
        .ok_or_else(|| Error::NotFound(user_id.to_string()))?;
    let logs = store.find_logs_for_user(&user.id)?;
    Ok((user, logs))
}

fn streaks_from_logs(
    logs: &[ReadingLogEntry],
    boundary: DayBoundary,
    today: NaiveDate,
) -> StreakSummary {
    let days: Vec<DayStatus> = logs.iter().map(|l| l.day_status(boundary)).collect();
    summarize_streaks(&days, today)
}

fn progress_from_logs(logs: &[ReadingLogEntry], boundary: DayBoundary) -> Vec<DailyMinutes> {
    let points: Vec<DailyMinutes> = logs.iter().map(|l| l.daily_minutes(boundary)).collect();
    build_time_series(&points)
}

/// Streak summary for `user_id` as of `today`.
pub fn user_streaks<S: LogStore>(
    store: &S,
    ctx: &RequestContext,
    user_id: &str,
    boundary: DayBoundary,
    today: NaiveDate,
) -> Result<StreakSummary> {
    let (_, logs) = load_user_logs(store, ctx, user_id)?;
    Ok(streaks_from_logs(&logs, boundary, today))
}

/// Chart series for `user_id`.
pub fn user_progress<S: LogStore>(
    store: &S,
    ctx: &RequestContext,
    user_id: &str,
    boundary: DayBoundary,
) -> Result<Vec<DailyMinutes>> {
    let (_, logs) = load_user_logs(store, ctx, user_id)?;
    Ok(progress_from_logs(&logs, boundary))
}

/// Full leaderboard with the caller's row flagged.
pub fn full_leaderboard<S: LogStore>(
    store: &S,
    ctx: &RequestContext,
) -> Result<Vec<LeaderboardEntry>> {
    let rows = store.sum_minutes_grouped_by_user()?;
    let ids: Vec<String> = rows.iter().map(|r| r.user_id.clone()).collect();
    let names = store.find_user_names(&ids)?;
    Ok(leaderboard::build_leaderboard(&rows, &names, &ctx.user_id))
}

/// Everything the signed-in user's dashboard shows.
pub fn user_dashboard<S: LogStore>(
    store: &S,
    ctx: &RequestContext,
    boundary: DayBoundary,
    today: NaiveDate,
    top_n: usize,
    marathon: Option<&MarathonConfig>,
) -> Result<UserDashboard> {
    let (user, logs) = load_user_logs(store, ctx, &ctx.user_id)?;

    let streaks = streaks_from_logs(&logs, boundary, today);
    let progress = progress_from_logs(&logs, boundary);
    let total_minutes = timeseries::total_minutes(&progress);

    let board = full_leaderboard(store, ctx)?;
    let top = leaderboard::top(&board, top_n).to_vec();
    let own_entry = leaderboard::requesting_entry(&board)
        .filter(|e| e.rank > top.len())
        .cloned();

    tracing::debug!(
        user_id = %user.id,
        current_streak = streaks.current_streak,
        longest_streak = streaks.longest_streak,
        logs = logs.len(),
        "Built user dashboard"
    );

    Ok(UserDashboard {
        user,
        streaks,
        progress,
        total_minutes,
        leaderboard: top,
        own_entry,
        marathon: marathon.map(|m| marathon_progress(m, today)),
    })
}
