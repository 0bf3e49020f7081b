//! Formatting helpers shared by the CLI and reports.

use chrono::NaiveDate;

/// Format a minute count as hours and minutes (e.g., "2h 5m", "45m").
pub fn format_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Format a day relative to `today` (e.g., "today", "3d ago").
pub fn format_relative_day(day: NaiveDate, today: NaiveDate) -> String {
    match (today - day).num_days() {
        d if d < 0 => day.format("%b %d").to_string(),
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        d if d < 7 => format!("{}d ago", d),
        _ => day.format("%b %d").to_string(),
    }
}

/// Format an optional day relative to `today`, or an em dash if missing.
pub fn format_relative_day_opt(day: Option<NaiveDate>, today: NaiveDate) -> String {
    match day {
        Some(day) => format_relative_day(day, today),
        None => "—".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(60), "1h 0m");
        assert_eq!(format_minutes(125), "2h 5m");
    }

    #[test]
    fn test_format_relative_day() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let d = |day| NaiveDate::from_ymd_opt(2025, 7, day).unwrap();
        assert_eq!(format_relative_day(d(10), today), "today");
        assert_eq!(format_relative_day(d(9), today), "yesterday");
        assert_eq!(format_relative_day(d(6), today), "4d ago");
        assert_eq!(format_relative_day(d(1), today), "Jul 01");
        assert_eq!(format_relative_day(d(12), today), "Jul 12");
        assert_eq!(format_relative_day_opt(None, today), "—");
    }
}
