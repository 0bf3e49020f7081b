//! Reading marathon progress.
//!
//! A marathon is a fixed window of days with checkpoint tests inside it.
//! Everything here is computed from the configured window and `today`.

use crate::config::{Checkpoint, MarathonConfig};
use chrono::NaiveDate;
use serde::Serialize;

/// Where `today` falls relative to the marathon window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarathonPhase {
    Before,
    Active,
    Completed,
}

/// Progress through the marathon as of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarathonProgress {
    pub phase: MarathonPhase,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Share of the window elapsed, clamped to 0..=100
    pub percent: u32,
    /// Days until `start`; only while the marathon has not begun
    pub days_until_start: Option<i64>,
    /// Earliest checkpoint on or after today
    pub next_checkpoint: Option<Checkpoint>,
    /// 0 when the checkpoint is today
    pub days_until_checkpoint: Option<i64>,
}

/// Progress through `marathon` as of `today`.
pub fn marathon_progress(marathon: &MarathonConfig, today: NaiveDate) -> MarathonProgress {
    let phase = if today < marathon.start {
        MarathonPhase::Before
    } else if today > marathon.end {
        MarathonPhase::Completed
    } else {
        MarathonPhase::Active
    };

    let span = (marathon.end - marathon.start).num_days().max(1);
    let elapsed = (today - marathon.start).num_days().clamp(0, span);
    let percent = (elapsed * 100 / span) as u32;

    let next_checkpoint = marathon
        .checkpoints
        .iter()
        .filter(|c| c.date >= today)
        .min_by_key(|c| c.date)
        .cloned();
    let days_until_checkpoint = next_checkpoint
        .as_ref()
        .map(|c| (c.date - today).num_days());

    MarathonProgress {
        phase,
        start: marathon.start,
        end: marathon.end,
        percent,
        days_until_start: (phase == MarathonPhase::Before)
            .then(|| (marathon.start - today).num_days()),
        next_checkpoint,
        days_until_checkpoint,
    }
}
