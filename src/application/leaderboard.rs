use crate::domain::leaderboard::aggregate;
use crate::domain::models::{LeaderboardEntry, SessionRecord};
use crate::infrastructure::session_store::SessionStore;
use serde::Serialize;

pub const EMPTY_LEADERBOARD_MESSAGE: &str = "No data yet.";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Podium {
    Gold,
    Silver,
    Bronze,
    None,
}

impl Podium {
    fn for_rank(rank: usize) -> Self {
        match rank {
            1 => Self::Gold,
            2 => Self::Silver,
            3 => Self::Bronze,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub podium: Podium,
    pub name: String,
    pub total_minutes: u64,
    pub display_time: String,
    pub total_tasks: u64,
    pub tasks_label: String,
}

pub fn rank_rows(entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardRow> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| LeaderboardRow {
            rank: index + 1,
            podium: Podium::for_rank(index + 1),
            tasks_label: format!("{} tasks completed", entry.total_tasks),
            name: entry.name,
            total_minutes: entry.total_minutes,
            display_time: entry.display_time,
            total_tasks: entry.total_tasks,
        })
        .collect()
}

/// Pulls the whole store and recomputes the ranking. A failed fetch is logged
/// and yields the same empty ranking as an empty store.
pub async fn fetch_leaderboard<S>(store: &S) -> Vec<LeaderboardRow>
where
    S: SessionStore + ?Sized,
{
    let sessions = match store.fetch_all().await {
        Ok(sessions) => sessions,
        Err(error) => {
            tracing::warn!(error = %error, "leaderboard fetch failed; showing empty ranking");
            return Vec::new();
        }
    };

    let records = sessions
        .into_iter()
        .map(|stored| stored.record)
        .collect::<Vec<SessionRecord>>();
    tracing::debug!(records = records.len(), "aggregating leaderboard");
    rank_rows(aggregate(&records))
}
