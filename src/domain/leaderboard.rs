use crate::domain::duration::format_minutes;
use crate::domain::models::{LeaderboardEntry, SessionRecord};
use std::collections::HashMap;

/// Groups records by username and ranks the totals.
///
/// Entries are ordered by total minutes descending, then by name ascending so
/// the ranking does not depend on the order the store returned records in.
pub fn aggregate(records: &[SessionRecord]) -> Vec<LeaderboardEntry> {
    let mut totals: HashMap<&str, (u64, u64)> = HashMap::new();
    for record in records {
        let entry = totals.entry(record.username.as_str()).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(record.minutes());
        entry.1 = entry.1.saturating_add(u64::from(record.task_count));
    }

    let mut entries = totals
        .into_iter()
        .map(|(name, (total_minutes, total_tasks))| LeaderboardEntry {
            name: name.to_string(),
            total_minutes,
            display_time: format_minutes(total_minutes),
            total_tasks,
        })
        .collect::<Vec<_>>();
    entries.sort_by(|left, right| {
        right
            .total_minutes
            .cmp(&left.total_minutes)
            .then_with(|| left.name.cmp(&right.name))
    });
    entries
}
