//! Leaderboard ranking over per-user minute totals.

use crate::types::UserMinutes;
use serde::Serialize;
use std::collections::HashMap;

/// Name shown for users missing from the name lookup.
pub const UNNAMED_USER: &str = "Unnamed User";

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position after sorting
    pub rank: usize,
    pub user_id: String,
    pub name: String,
    pub total_minutes: i64,
    /// Whether this row belongs to the caller
    pub is_requesting_user: bool,
    /// Another row has the same total; ranks stay sequential regardless
    pub tied: bool,
}

/// Headline numbers shown above the full leaderboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LeaderboardSummary {
    pub participants: usize,
    pub total_minutes: i64,
    pub average_minutes: f64,
}

/// Rank users by total minutes, highest first.
///
/// Equal totals keep their input order and still receive distinct,
/// sequential ranks; such rows are marked `tied`.
pub fn build_leaderboard(
    rows: &[UserMinutes],
    names: &HashMap<String, String>,
    requesting_user_id: &str,
) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&UserMinutes> = rows.iter().collect();
    sorted.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes));

    let mut entries: Vec<LeaderboardEntry> = sorted
        .into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i + 1,
            user_id: row.user_id.clone(),
            name: names
                .get(&row.user_id)
                .cloned()
                .unwrap_or_else(|| UNNAMED_USER.to_string()),
            total_minutes: row.total_minutes,
            is_requesting_user: row.user_id == requesting_user_id,
            tied: false,
        })
        .collect();

    for i in 1..entries.len() {
        if entries[i].total_minutes == entries[i - 1].total_minutes {
            entries[i].tied = true;
            entries[i - 1].tied = true;
        }
    }

    entries
}

/// The first `n` rows.
pub fn top(entries: &[LeaderboardEntry], n: usize) -> &[LeaderboardEntry] {
    &entries[..n.min(entries.len())]
}

/// The caller's own row, if they have logged anything.
pub fn requesting_entry(entries: &[LeaderboardEntry]) -> Option<&LeaderboardEntry> {
    entries.iter().find(|e| e.is_requesting_user)
}

/// Participant count, total and mean minutes.
pub fn summarize(entries: &[LeaderboardEntry]) -> LeaderboardSummary {
    let total_minutes: i64 = entries.iter().map(|e| e.total_minutes).sum();
    let average_minutes = if entries.is_empty() {
        0.0
    } else {
        total_minutes as f64 / entries.len() as f64
    };

    LeaderboardSummary {
        participants: entries.len(),
        total_minutes,
        average_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: &str, total_minutes: i64) -> UserMinutes {
        UserMinutes {
            user_id: user_id.to_string(),
            total_minutes,
        }
    }

    fn names() -> HashMap<String, String> {
        [("a", "Asha"), ("b", "Bilal"), ("c", "Chen")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_sorted_descending_with_sequential_ranks() {
        let rows = [row("a", 30), row("b", 300), row("c", 120)];
        let board = build_leaderboard(&rows, &names(), "c");

        let order: Vec<_> = board.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(order, ["b", "c", "a"]);
        assert_eq!(board.iter().map(|e| e.rank).collect::<Vec<_>>(), [1, 2, 3]);
        for pair in board.windows(2) {
            assert!(pair[0].total_minutes >= pair[1].total_minutes);
        }
        assert!(board[1].is_requesting_user);
        assert_eq!(board[1].name, "Chen");
        assert_eq!(requesting_entry(&board).map(|e| e.rank), Some(2));
    }

    #[test]
    fn test_ties_keep_input_order_and_are_flagged() {
        let rows = [row("a", 90), row("b", 90), row("c", 200)];
        let board = build_leaderboard(&rows, &names(), "x");

        assert_eq!(board[0].user_id, "c");
        assert!(!board[0].tied);
        assert_eq!((board[1].user_id.as_str(), board[1].rank), ("a", 2));
        assert_eq!((board[2].user_id.as_str(), board[2].rank), ("b", 3));
        assert!(board[1].tied && board[2].tied);
        assert!(requesting_entry(&board).is_none());
    }

    #[test]
    fn test_missing_name_falls_back() {
        let board = build_leaderboard(&[row("ghost", 5)], &HashMap::new(), "ghost");
        assert_eq!(board[0].name, UNNAMED_USER);
    }

    #[test]
    fn test_top_and_summary() {
        let rows = [row("a", 30), row("b", 300), row("c", 120)];
        let board = build_leaderboard(&rows, &names(), "a");

        assert_eq!(top(&board, 2).len(), 2);
        assert_eq!(top(&board, 10).len(), 3);

        let summary = summarize(&board);
        assert_eq!(summary.participants, 3);
        assert_eq!(summary.total_minutes, 450);
        assert_eq!(summary.average_minutes, 150.0);
        assert_eq!(summarize(&[]).average_minutes, 0.0);
    }
}
