use crate::domain::duration::parse_minutes;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_USERNAME: &str = "Unknown";

/// One uploaded unit of focus time or task completion. Immutable once
/// appended to the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub username: String,
    pub timestamp: String,
    pub duration_text: String,
    pub completed_tasks: Vec<String>,
    pub task_count: u32,
}

impl SessionRecord {
    pub fn minutes(&self) -> u64 {
        parse_minutes(&self.duration_text)
    }

    /// Checks the shape of records this process produces. Records read back
    /// from the store are never validated; aggregation tolerates anything.
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.username, "record.username")?;
        validate_non_empty(&self.duration_text, "record.duration_text")?;
        if self.completed_tasks.len() > 1 {
            return Err("record.completed_tasks must hold at most one task".to_string());
        }
        if self.task_count as usize != self.completed_tasks.len() {
            return Err("record.task_count must match record.completed_tasks".to_string());
        }
        if self.completed_tasks.iter().any(String::is_empty) {
            return Err("record.completed_tasks[] must not be empty".to_string());
        }
        Ok(())
    }
}

pub fn normalize_username(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN_USERNAME.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub total_minutes: u64,
    pub display_time: String,
    pub total_tasks: u64,
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}
