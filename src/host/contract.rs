//! Wire envelopes exchanged with the host shell over newline-delimited JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Commands the host shell can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "host.ping")]
    HostPing,
    #[serde(rename = "host.shutdown")]
    HostShutdown,
    #[serde(rename = "user.get")]
    UserGet,
    #[serde(rename = "user.set")]
    UserSet,
    #[serde(rename = "timer.start")]
    TimerStart,
    #[serde(rename = "timer.stop")]
    TimerStop,
    #[serde(rename = "timer.status")]
    TimerStatus,
    #[serde(rename = "task.add")]
    TaskAdd,
    #[serde(rename = "task.toggle")]
    TaskToggle,
    #[serde(rename = "task.toggle_text")]
    TaskToggleText,
    #[serde(rename = "task.delete")]
    TaskDelete,
    #[serde(rename = "task.delete_text")]
    TaskDeleteText,
    #[serde(rename = "task.list")]
    TaskList,
    #[serde(rename = "task.unfinished")]
    TaskUnfinished,
    #[serde(rename = "wheel.spin")]
    WheelSpin,
    #[serde(rename = "leaderboard.fetch")]
    LeaderboardFetch,
}

impl CommandName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HostPing => "host.ping",
            Self::HostShutdown => "host.shutdown",
            Self::UserGet => "user.get",
            Self::UserSet => "user.set",
            Self::TimerStart => "timer.start",
            Self::TimerStop => "timer.stop",
            Self::TimerStatus => "timer.status",
            Self::TaskAdd => "task.add",
            Self::TaskToggle => "task.toggle",
            Self::TaskToggleText => "task.toggle_text",
            Self::TaskDelete => "task.delete",
            Self::TaskDeleteText => "task.delete_text",
            Self::TaskList => "task.list",
            Self::TaskUnfinished => "task.unfinished",
            Self::WheelSpin => "wheel.spin",
            Self::LeaderboardFetch => "leaderboard.fetch",
        }
    }
}

/// A command from the host shell. `id` is echoed back on the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    #[serde(default)]
    pub id: Option<String>,
    pub command: CommandName,
    #[serde(default)]
    pub payload: Value,
}

impl CommandEnvelope {
    #[must_use]
    pub fn new(id: impl Into<String>, command: CommandName, payload: Value) -> Self {
        Self {
            id: Some(id.into()),
            command,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: Option<String>,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    #[must_use]
    pub fn ok(id: Option<String>, payload: Value) -> Self {
        Self {
            id,
            ok: true,
            payload,
            error: None,
        }
    }

    #[must_use]
    pub fn error(id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            id,
            ok: false,
            payload: Value::Null,
            error: Some(message.into()),
        }
    }
}
