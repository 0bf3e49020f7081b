//! Integration tests for the submission → store → analytics pipeline
//!
//! Each test opens a fresh SQLite file in a temp directory and drives it
//! through the public API, the way the CLI does.

use chrono::{Duration, NaiveDate};
use readlog_core::analytics::{
    full_leaderboard, list_participants, participant_report, user_dashboard, user_progress,
    user_streaks,
};
use readlog_core::{
    upsert_daily_log, Database, DayBoundary, Error, LogStore, NewUser, RawSubmission,
    RequestContext, UpsertAction, User,
};
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

struct TestEnv {
    _dir: TempDir,
    path: PathBuf,
    db: Database,
}

impl TestEnv {
    fn new() -> Self {
        readlog_core::logging::init_test();
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("readlog.db");
        let db = Self::connect(&path);
        db.migrate().expect("failed to migrate");
        Self {
            _dir: dir,
            path,
            db,
        }
    }

    /// A second, independent connection to the same database file.
    fn connect(path: &std::path::Path) -> Database {
        Database::open(path)
            .expect("failed to open database")
            .with_day_boundary(DayBoundary::Utc)
    }

    fn user(&self, name: &str, is_admin: bool) -> User {
        self.db
            .register_user(&NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                is_admin,
            })
            .expect("failed to register user")
    }

    fn submit(&self, user: &User, date: NaiveDate, time: &str, minutes: i64) -> UpsertAction {
        let submission = RawSubmission {
            date: Some(date.format("%Y-%m-%d").to_string()),
            time: Some(time.to_string()),
            reading_minutes: Some(minutes),
            reading_book: Some("The Republic".to_string()),
            ..Default::default()
        }
        .validate(&user.id, DayBoundary::Utc)
        .expect("submission should validate");

        self.db
            .submit_daily_log(&submission)
            .expect("submission should be stored")
            .action
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 20).unwrap()
}

fn ago(days: i64) -> NaiveDate {
    today() - Duration::days(days)
}

// ============================================
// Upsert policy
// ============================================

#[test]
fn test_same_day_resubmission_replaces_entry() {
    let env = TestEnv::new();
    let asha = env.user("Asha", false);

    assert_eq!(env.submit(&asha, today(), "08:00", 30), UpsertAction::Created);
    assert_eq!(env.submit(&asha, today(), "21:15", 95), UpsertAction::Updated);

    let logs = env.db.find_logs_for_user(&asha.id).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].reading_minutes, 95);
    assert!(logs[0].met_target);
    assert_eq!(logs[0].date_time.format("%H:%M").to_string(), "21:15");
}

#[test]
fn test_different_days_create_distinct_entries() {
    let env = TestEnv::new();
    let asha = env.user("Asha", false);

    assert_eq!(env.submit(&asha, ago(1), "10:30", 20), UpsertAction::Created);
    assert_eq!(env.submit(&asha, today(), "10:30", 20), UpsertAction::Created);

    let logs = env.db.find_logs_for_user(&asha.id).unwrap();
    assert_eq!(logs.len(), 2);
    assert_ne!(logs[0].id, logs[1].id);
}

#[test]
fn test_target_threshold_applied_at_write() {
    let env = TestEnv::new();
    let asha = env.user("Asha", false);

    env.submit(&asha, ago(1), "10:30", 60);
    env.submit(&asha, today(), "10:30", 59);

    let logs = env.db.find_logs_for_user(&asha.id).unwrap();
    assert!(logs[0].met_target, "60 minutes meets the target");
    assert!(!logs[1].met_target, "59 minutes does not");
}

#[test]
fn test_day_window_edges() {
    let env = TestEnv::new();
    let asha = env.user("Asha", false);

    assert_eq!(env.submit(&asha, today(), "00:00:00", 10), UpsertAction::Created);
    assert_eq!(env.submit(&asha, today(), "23:59:59", 20), UpsertAction::Updated);
    assert_eq!(
        env.submit(&asha, today() + Duration::days(1), "00:00:00", 30),
        UpsertAction::Created
    );
    assert_eq!(env.db.find_logs_for_user(&asha.id).unwrap().len(), 2);
}

#[test]
fn test_submission_for_unknown_user_is_not_found() {
    let env = TestEnv::new();
    let submission = RawSubmission {
        date: Some("2025-09-20".to_string()),
        reading_minutes: Some(30),
        ..Default::default()
    }
    .validate("no-such-user", DayBoundary::Utc)
    .unwrap();

    assert!(matches!(
        env.db.submit_daily_log(&submission),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_concurrent_same_day_submissions_leave_one_row() {
    const WRITERS: usize = 16;

    let env = TestEnv::new();
    let asha = env.user("Asha", false);
    let barrier = Arc::new(Barrier::new(WRITERS));

    // One connection per thread so SQLite, not the in-process mutex,
    // decides who wins. Odd threads skip the write transaction and go
    // through the bare policy, which must recover from the unique index.
    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let db = TestEnv::connect(&env.path);
            let barrier = Arc::clone(&barrier);
            let user_id = asha.id.clone();
            thread::spawn(move || {
                let submission = RawSubmission {
                    date: Some("2025-09-20".to_string()),
                    time: Some(format!("{:02}:00", 4 + i)),
                    reading_minutes: Some(10 * (i as i64 + 1)),
                    ..Default::default()
                }
                .validate(&user_id, DayBoundary::Utc)
                .unwrap();

                barrier.wait();
                let outcome = if i % 2 == 0 {
                    db.submit_daily_log(&submission)
                } else {
                    upsert_daily_log(&db, DayBoundary::Utc, &submission)
                };
                outcome.unwrap_or_else(|e| panic!("writer {i} failed: {e}")).action
            })
        })
        .collect();

    let actions: Vec<UpsertAction> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let created = actions
        .iter()
        .filter(|a| **a == UpsertAction::Created)
        .count();

    assert_eq!(created, 1, "actions: {:?}", actions);
    assert_eq!(actions.len() - created, WRITERS - 1);

    let logs = env.db.find_logs_for_user(&asha.id).unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].reading_minutes >= 10 && logs[0].reading_minutes <= 160);
}

// ============================================
// Analytics over stored logs
// ============================================

#[test]
fn test_streaks_from_stored_logs() {
    let env = TestEnv::new();
    let asha = env.user("Asha", false);
    let ctx = RequestContext::for_user(&asha);

    env.submit(&asha, ago(5), "10:30", 90);
    env.submit(&asha, ago(2), "10:30", 30); // below target
    env.submit(&asha, ago(1), "10:30", 60);
    env.submit(&asha, today(), "10:30", 61);

    let summary = user_streaks(&env.db, &ctx, &asha.id, DayBoundary::Utc, today()).unwrap();
    assert_eq!(summary.current_streak, 2);
    assert_eq!(summary.longest_streak, 2);
    assert_eq!(summary.day_status.len(), 4);
    assert_eq!(summary.day_status.get(&ago(2)), Some(&false));
    assert_eq!(summary.day_status.get(&ago(5)), Some(&true));

    let tomorrow = today() + Duration::days(1);
    let later = user_streaks(&env.db, &ctx, &asha.id, DayBoundary::Utc, tomorrow).unwrap();
    assert_eq!(later.current_streak, 0);
    assert_eq!(later.longest_streak, 2);
}

#[test]
fn test_progress_series_sorted_by_date() {
    let env = TestEnv::new();
    let asha = env.user("Asha", false);
    let ctx = RequestContext::for_user(&asha);

    env.submit(&asha, today(), "10:30", 15);
    env.submit(&asha, ago(3), "10:30", 45);
    env.submit(&asha, ago(1), "10:30", 70);

    let series = user_progress(&env.db, &ctx, &asha.id, DayBoundary::Utc).unwrap();
    let dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
    assert_eq!(dates, [ago(3), ago(1), today()]);
    assert_eq!(series[0].minutes, 45);
}

#[test]
fn test_leaderboard_excludes_admins_and_flags_caller() {
    let env = TestEnv::new();
    let asha = env.user("Asha", false);
    let bilal = env.user("Bilal", false);
    let chen = env.user("Chen", false);
    let admin = env.user("Admin", true);

    env.submit(&asha, today(), "10:30", 40);
    env.submit(&bilal, today(), "10:30", 200);
    env.submit(&bilal, ago(1), "10:30", 10);
    env.submit(&chen, today(), "10:30", 90);
    env.submit(&admin, today(), "10:30", 1000);

    let board = full_leaderboard(&env.db, &RequestContext::for_user(&asha)).unwrap();
    let names: Vec<&str> = board.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Bilal", "Chen", "Asha"]);
    assert_eq!(board[0].total_minutes, 210);
    for pair in board.windows(2) {
        assert!(pair[0].total_minutes >= pair[1].total_minutes);
        assert_eq!(pair[0].rank + 1, pair[1].rank);
    }
    assert!(board[2].is_requesting_user);
    assert!(board.iter().all(|e| e.user_id != admin.id));
}

#[test]
fn test_dashboard_shows_top_and_own_row() {
    let env = TestEnv::new();
    let users: Vec<User> = ["Asha", "Bilal", "Chen", "Dara"]
        .iter()
        .map(|n| env.user(n, false))
        .collect();

    for (i, user) in users.iter().enumerate() {
        env.submit(user, today(), "10:30", 100 - 20 * i as i64);
    }

    let dara = &users[3];
    let dara_ctx = RequestContext::for_user(dara);
    let dashboard =
        user_dashboard(&env.db, &dara_ctx, DayBoundary::Utc, today(), 3, None).unwrap();

    assert_eq!(dashboard.leaderboard.len(), 3);
    assert!(dashboard.leaderboard.iter().all(|e| !e.is_requesting_user));
    let own = dashboard.own_entry.as_ref().expect("own row outside the top 3");
    assert_eq!(own.rank, 4);
    assert_eq!(dashboard.total_minutes, 40);
    assert_eq!(dashboard.streaks.current_streak, 0);
    assert_eq!(dashboard.format_total(), "40m");

    let asha = &users[0];
    let asha_ctx = RequestContext::for_user(asha);
    let top_dashboard =
        user_dashboard(&env.db, &asha_ctx, DayBoundary::Utc, today(), 3, None).unwrap();
    assert!(top_dashboard.own_entry.is_none());
    assert!(top_dashboard.leaderboard[0].is_requesting_user);
    assert_eq!(top_dashboard.streaks.current_streak, 1);
}

#[test]
fn test_dashboard_for_missing_user_is_not_found() {
    let env = TestEnv::new();
    let ctx = RequestContext::new("deleted-user", false);
    assert!(matches!(
        user_dashboard(&env.db, &ctx, DayBoundary::Utc, today(), 3, None),
        Err(Error::NotFound(_))
    ));
}

// ============================================
// Admin browsing
// ============================================

#[test]
fn test_admin_views_require_admin() {
    let env = TestEnv::new();
    let asha = env.user("Asha", false);
    let bilal = env.user("Bilal", false);
    let ctx = RequestContext::for_user(&asha);

    assert!(matches!(
        list_participants(&env.db, &ctx),
        Err(Error::Unauthorized(_))
    ));
    assert!(matches!(
        participant_report(&env.db, &ctx, &bilal.id),
        Err(Error::Unauthorized(_))
    ));
    assert!(matches!(
        user_streaks(&env.db, &ctx, &bilal.id, DayBoundary::Utc, today()),
        Err(Error::Unauthorized(_))
    ));
}

#[test]
fn test_admin_participant_report() {
    let env = TestEnv::new();
    let admin = env.user("Admin", true);
    let asha = env.user("Asha", false);
    let ctx = RequestContext::for_user(&admin);

    env.submit(&asha, ago(2), "10:30", 60);
    env.submit(&asha, ago(1), "10:30", 20);
    env.submit(&asha, today(), "10:30", 75);

    let rows = list_participants(&env.db, &ctx).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user.id, asha.id);
    assert_eq!(rows[0].stats.total_minutes, 155);

    let report = participant_report(&env.db, &ctx, &asha.id).unwrap();
    assert_eq!(report.stats.total_logs, 3);
    assert_eq!(report.stats.targets_met, 2);
    assert_eq!(report.stats.target_percentage, 67);
    assert_eq!(report.logs[0].reading_minutes, 75, "newest first");

    // Admins may read any participant's streaks.
    let streaks = user_streaks(&env.db, &ctx, &asha.id, DayBoundary::Utc, today()).unwrap();
    assert_eq!(streaks.current_streak, 1);

    assert!(matches!(
        participant_report(&env.db, &ctx, "ghost"),
        Err(Error::NotFound(_))
    ));
}
