//! Per-day minutes series for progress charts.

use crate::types::DailyMinutes;

/// Order chart points by date, oldest first.
///
/// One point per input row; missing days are not zero-filled. Rows on the
/// same date keep their input order.
pub fn build_time_series(rows: &[DailyMinutes]) -> Vec<DailyMinutes> {
    let mut series = rows.to_vec();
    series.sort_by_key(|point| point.date);
    series
}

/// Sum of minutes across a series.
pub fn total_minutes(series: &[DailyMinutes]) -> i64 {
    series.iter().map(|p| i64::from(p.minutes)).sum()
}
