//! Streak engine.
//!
//! A streak is a maximal run of calendar-consecutive days on which the
//! reading target was met. Inputs are plain dates; callers bucket
//! timestamps into days with [`DayBoundary`](crate::calendar::DayBoundary)
//! before calling in.

use crate::types::DayStatus;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Current and longest streak lengths in days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakCounts {
    /// Run ending today; 0 when today is not a met day
    pub current_streak: u32,
    /// Longest run anywhere in the history
    pub longest_streak: u32,
}

/// Streaks plus the per-day met/missed lookup for calendar rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub day_status: BTreeMap<NaiveDate, bool>,
}

impl StreakSummary {
    /// Days in the lookup that met the target.
    pub fn met_days(&self) -> usize {
        self.day_status.values().filter(|met| **met).count()
    }

    /// Days in the lookup with a log below target.
    pub fn missed_days(&self) -> usize {
        self.day_status.len() - self.met_days()
    }
}

/// Compute streaks over the dates on which the target was met.
///
/// Order does not matter and duplicates are ignored.
pub fn compute_streaks(met_dates: &[NaiveDate], today: NaiveDate) -> StreakCounts {
    let mut dates = met_dates.to_vec();
    dates.sort_unstable();
    dates.dedup();

    let mut run = 0u32;
    let mut longest = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for &date in &dates {
        run = match prev {
            Some(p) if (date - p).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }

    let current = if prev == Some(today) { run } else { 0 };

    StreakCounts {
        current_streak: current,
        longest_streak: longest,
    }
}

/// Build the day → met lookup.
///
/// A day with several logs counts as met if any of them met the target.
pub fn build_day_status_map(days: &[DayStatus]) -> BTreeMap<NaiveDate, bool> {
    let mut map = BTreeMap::new();
    for day in days {
        let met = map.entry(day.date).or_insert(false);
        *met |= day.met_target;
    }
    map
}

/// Streaks and calendar lookup from one user's full day history.
pub fn summarize_streaks(days: &[DayStatus], today: NaiveDate) -> StreakSummary {
    let day_status = build_day_status_map(days);
    let met: Vec<NaiveDate> = day_status
        .iter()
        .filter(|(_, met)| **met)
        .map(|(date, _)| *date)
        .collect();
    let counts = compute_streaks(&met, today);

    StreakSummary {
        current_streak: counts.current_streak,
        longest_streak: counts.longest_streak,
        day_status,
    }
}
