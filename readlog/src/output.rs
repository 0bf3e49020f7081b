//! Text and JSON rendering for each command.

use crate::Format;
use anyhow::Result;
use chrono::NaiveDate;
use readlog_core::analytics::leaderboard::{self, LeaderboardEntry};
use readlog_core::analytics::{
    MarathonPhase, MarathonProgress, ParticipantReport, ParticipantRow, StreakSummary,
    UserDashboard,
};
use readlog_core::format::{format_minutes, format_relative_day, format_relative_day_opt};
use readlog_core::{DailyMinutes, DayBoundary, UpsertOutcome, User, TARGET_MINUTES};
use serde::Serialize;

/// Days shown in the streak calendar.
const CALENDAR_DAYS: usize = 14;
/// Width of the longest chart bar.
const BAR_WIDTH: u32 = 40;
/// Chart rows shown on the dashboard.
const DASHBOARD_CHART_DAYS: usize = 7;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

pub fn user_added(format: Format, user: &User) -> Result<()> {
    if format == Format::Json {
        return print_json(user);
    }

    let role = if user.is_admin { " (admin)" } else { "" };
    println!("Registered {} <{}>{}", user.name, user.email, role);
    println!("  id: {}", user.id);
    Ok(())
}

pub fn logged(format: Format, outcome: &UpsertOutcome, boundary: DayBoundary) -> Result<()> {
    if format == Format::Json {
        return print_json(outcome);
    }

    let entry = &outcome.entry;
    let verb = match outcome.action {
        readlog_core::UpsertAction::Created => "Logged",
        readlog_core::UpsertAction::Updated => "Updated",
    };
    let target = if entry.met_target {
        "target met".to_string()
    } else {
        format!("below the {} minute target", TARGET_MINUTES)
    };
    println!(
        "{} {} for {} ({})",
        verb,
        format_minutes(i64::from(entry.reading_minutes)),
        boundary.day_of(entry.date_time),
        target
    );
    Ok(())
}

fn print_streak_lines(summary: &StreakSummary) {
    println!("Current streak: {}", plural(summary.current_streak, "day"));
    println!("Longest streak: {}", plural(summary.longest_streak, "day"));
    println!(
        "Target met on {} of {} logged days ({} below target)",
        summary.met_days(),
        summary.day_status.len(),
        summary.missed_days()
    );
}

pub fn streaks(format: Format, summary: &StreakSummary, today: NaiveDate) -> Result<()> {
    if format == Format::Json {
        return print_json(summary);
    }

    print_streak_lines(summary);
    if summary.day_status.is_empty() {
        println!("\nNo reading logged yet.");
        return Ok(());
    }

    println!();
    for (day, met) in summary.day_status.iter().rev().take(CALENDAR_DAYS) {
        let mark = if *met { "✓" } else { "·" };
        println!(
            "  {}  {}  {}",
            day,
            mark,
            format_relative_day(*day, today)
        );
    }
    Ok(())
}

/// Bar length for `minutes` on a chart whose longest bar is `max`.
fn bar_len(minutes: u32, max: u32) -> usize {
    (u64::from(minutes) * u64::from(BAR_WIDTH) / u64::from(max.max(1))) as usize
}

fn print_bars(series: &[DailyMinutes]) {
    let max = series.iter().map(|p| p.minutes).max().unwrap_or(0).max(1);
    for point in series {
        let len = bar_len(point.minutes, max);
        println!(
            "  {}  {:<width$}  {}",
            point.date,
            "#".repeat(len),
            format_minutes(i64::from(point.minutes)),
            width = BAR_WIDTH as usize
        );
    }
}

pub fn chart(format: Format, series: &[DailyMinutes]) -> Result<()> {
    if format == Format::Json {
        return print_json(series);
    }

    if series.is_empty() {
        println!("No reading logged yet.");
        return Ok(());
    }
    print_bars(series);
    Ok(())
}

fn print_board_row(entry: &LeaderboardEntry) {
    let rank = if entry.tied {
        format!("={}", entry.rank)
    } else {
        entry.rank.to_string()
    };
    let you = if entry.is_requesting_user { "  ← you" } else { "" };
    println!(
        "  {:>4}  {:<24}  {:>10}{}",
        rank,
        entry.name,
        format_minutes(entry.total_minutes),
        you
    );
}

pub fn leaderboard(format: Format, board: &[LeaderboardEntry], top: Option<usize>) -> Result<()> {
    let shown = match top {
        Some(n) => leaderboard::top(board, n),
        None => board,
    };

    if format == Format::Json {
        return print_json(shown);
    }

    if board.is_empty() {
        println!("Nobody has logged any reading yet.");
        return Ok(());
    }

    let summary = leaderboard::summarize(board);
    println!(
        "{} readers, {} in total, {} on average",
        summary.participants,
        format_minutes(summary.total_minutes),
        format_minutes(summary.average_minutes.round() as i64)
    );
    println!();
    for entry in shown {
        print_board_row(entry);
    }
    if let Some(own) = leaderboard::requesting_entry(board) {
        if own.rank > shown.len() {
            println!("  {:>4}", "…");
            print_board_row(own);
        }
    }
    Ok(())
}

pub fn dashboard(format: Format, dashboard: &UserDashboard, today: NaiveDate) -> Result<()> {
    if format == Format::Json {
        return print_json(dashboard);
    }

    println!("{} <{}>", dashboard.user.name, dashboard.user.email);
    println!("Total reading: {}", dashboard.format_total());
    print_streak_lines(&dashboard.streaks);

    println!("\nRecent days");
    if dashboard.progress.is_empty() {
        println!("  No reading logged yet.");
    } else {
        let start = dashboard.progress.len().saturating_sub(DASHBOARD_CHART_DAYS);
        print_bars(&dashboard.progress[start..]);
    }
    let last = dashboard.streaks.day_status.keys().next_back().copied();
    println!("  Last logged: {}", format_relative_day_opt(last, today));

    println!("\nLeaderboard");
    if dashboard.leaderboard.is_empty() {
        println!("  Nobody has logged any reading yet.");
    }
    for entry in &dashboard.leaderboard {
        print_board_row(entry);
    }
    if let Some(own) = &dashboard.own_entry {
        println!("  {:>4}", "…");
        print_board_row(own);
    }

    if let Some(marathon) = &dashboard.marathon {
        println!("\nMarathon ({} to {})", marathon.start, marathon.end);
        print_marathon(marathon);
    }
    Ok(())
}

fn print_marathon(marathon: &MarathonProgress) {
    match marathon.phase {
        MarathonPhase::Before => {
            let days = marathon.days_until_start.unwrap_or(0) as u32;
            println!("  Starts in {}", plural(days, "day"));
        }
        MarathonPhase::Active => {
            let filled = bar_len(marathon.percent, 100);
            println!(
                "  [{:<width$}] {}%",
                "#".repeat(filled),
                marathon.percent,
                width = BAR_WIDTH as usize
            );
        }
        MarathonPhase::Completed => {
            println!("  Complete. Check the final rankings.");
            return;
        }
    }

    match (&marathon.next_checkpoint, marathon.days_until_checkpoint) {
        (Some(checkpoint), Some(0)) => println!("  {} is today", checkpoint.name),
        (Some(checkpoint), Some(days)) => println!(
            "  Next test: {} on {} (in {})",
            checkpoint.name,
            checkpoint.date,
            plural(days as u32, "day")
        ),
        _ => println!("  All tests done"),
    }
}

pub fn participants(
    format: Format,
    rows: &[ParticipantRow],
    boundary: DayBoundary,
    today: NaiveDate,
) -> Result<()> {
    if format == Format::Json {
        return print_json(rows);
    }

    if rows.is_empty() {
        println!("No participants registered.");
        return Ok(());
    }

    println!(
        "  {:<20}  {:<28}  {:>5}  {:>9}  {:>5}  {}",
        "NAME", "EMAIL", "LOGS", "TOTAL", "MET", "LAST"
    );
    for row in rows {
        let last = row.last_logged_at.map(|ts| boundary.day_of(ts));
        println!(
            "  {:<20}  {:<28}  {:>5}  {:>9}  {:>4}%  {}",
            row.user.name,
            row.user.email,
            row.stats.total_logs,
            format_minutes(row.stats.total_minutes),
            row.stats.target_percentage,
            format_relative_day_opt(last, today)
        );
    }
    Ok(())
}

pub fn participant_report(
    format: Format,
    report: &ParticipantReport,
    boundary: DayBoundary,
) -> Result<()> {
    if format == Format::Json {
        return print_json(report);
    }

    let stats = &report.stats;
    println!("{} <{}>", report.user.name, report.user.email);
    println!(
        "{} logs, {} in total, target met {} times ({}%)",
        stats.total_logs,
        format_minutes(stats.total_minutes),
        stats.targets_met,
        stats.target_percentage
    );

    for log in &report.logs {
        let mark = if log.met_target { "✓" } else { "·" };
        println!(
            "\n  {}  {}  {}",
            boundary.day_of(log.date_time),
            mark,
            format_minutes(i64::from(log.reading_minutes))
        );
        let details = [
            ("Book", &log.reading_book),
            ("Topic", &log.reading_topic),
            ("Learned", &log.learning),
            ("Questions", &log.questions),
        ];
        for (label, value) in details {
            if let Some(text) = value {
                println!("    {}: {}", label, text);
            }
        }
    }
    Ok(())
}
