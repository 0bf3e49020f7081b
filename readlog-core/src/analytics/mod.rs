//! Analytics module for readlog
//!
//! Pure engines over log rows:
//! - [`streaks`]: current/longest streak and the met/missed day calendar
//! - [`leaderboard`]: per-user totals ranked highest first
//! - [`timeseries`]: minutes per day for progress charts
//! - [`marathon`]: progress through a configured reading marathon
//!
//! and the store-backed views built on them:
//! - [`dashboard`]: the signed-in user's dashboard
//! - [`participants`]: admin browsing of every participant

pub mod dashboard;
pub mod leaderboard;
pub mod marathon;
pub mod participants;
pub mod streaks;
pub mod timeseries;

pub use dashboard::{full_leaderboard, user_dashboard, user_progress, user_streaks, UserDashboard};
pub use leaderboard::{build_leaderboard, LeaderboardEntry, LeaderboardSummary};
pub use marathon::{marathon_progress, MarathonPhase, MarathonProgress};
pub use participants::{
    list_participants, participant_report, ParticipantReport, ParticipantRow, ParticipantStats,
};
pub use streaks::{build_day_status_map, compute_streaks, StreakCounts, StreakSummary};
pub use timeseries::build_time_series;
