//! Routes host commands onto the application command functions.

use crate::application::commands::{
    AppState, add_task_impl, delete_task_impl, delete_tasks_by_text_impl, fetch_leaderboard_impl,
    get_timer_state_impl, get_user_impl, list_tasks_impl, set_user_impl, spin_wheel_impl,
    start_timer_impl, stop_timer_impl, toggle_task_impl, toggle_tasks_by_text_impl,
    unfinished_tasks_impl,
};
use crate::host::contract::{CommandEnvelope, CommandName, ResponseEnvelope};
use crate::infrastructure::error::InfraError;
use serde::Serialize;
use serde_json::{Value, json};

pub async fn dispatch(state: &AppState, envelope: CommandEnvelope) -> ResponseEnvelope {
    let CommandEnvelope { id, command, payload } = envelope;
    tracing::debug!(command = command.as_str(), id = ?id, "dispatching host command");

    match route(state, command, &payload).await {
        Ok(payload) => ResponseEnvelope::ok(id, payload),
        Err(error) => ResponseEnvelope::error(id, state.command_error(command.as_str(), &error)),
    }
}

async fn route(state: &AppState, command: CommandName, payload: &Value) -> Result<Value, InfraError> {
    match command {
        CommandName::HostPing => Ok(json!("pong")),
        CommandName::HostShutdown => Ok(json!({ "shutting_down": true })),
        CommandName::UserGet => to_payload(get_user_impl(state)?),
        CommandName::UserSet => {
            let username = optional_str(payload, "username")?.unwrap_or_default();
            to_payload(set_user_impl(state, username)?)
        }
        CommandName::TimerStart => to_payload(start_timer_impl(state, minutes_input(payload)?)?),
        CommandName::TimerStop => to_payload(stop_timer_impl(state)?),
        CommandName::TimerStatus => to_payload(get_timer_state_impl(state)?),
        CommandName::TaskAdd => {
            let text = optional_str(payload, "text")?.unwrap_or_default();
            to_payload(add_task_impl(state, text)?)
        }
        CommandName::TaskToggle => {
            let task_id = required_str(payload, "id")?;
            to_payload(toggle_task_impl(state, task_id, required_bool(payload, "done")?)?)
        }
        CommandName::TaskToggleText => {
            let text = required_str(payload, "text")?;
            to_payload(toggle_tasks_by_text_impl(state, text, required_bool(payload, "done")?)?)
        }
        CommandName::TaskDelete => {
            let removed = delete_task_impl(state, required_str(payload, "id")?)?;
            Ok(json!({ "removed": removed }))
        }
        CommandName::TaskDeleteText => {
            let removed = delete_tasks_by_text_impl(state, required_str(payload, "text")?)?;
            Ok(json!({ "removed": removed }))
        }
        CommandName::TaskList => to_payload(list_tasks_impl(state)?),
        CommandName::TaskUnfinished => to_payload(unfinished_tasks_impl(state)?),
        CommandName::WheelSpin => to_payload(spin_wheel_impl(state).await?),
        CommandName::LeaderboardFetch => to_payload(fetch_leaderboard_impl(state).await?),
    }
}

fn to_payload<T: Serialize>(value: T) -> Result<Value, InfraError> {
    Ok(serde_json::to_value(value)?)
}

fn optional_str(payload: &Value, field: &str) -> Result<Option<String>, InfraError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(InfraError::InvalidInput(format!("{field} must be a string"))),
    }
}

fn required_str(payload: &Value, field: &str) -> Result<String, InfraError> {
    optional_str(payload, field)?
        .ok_or_else(|| InfraError::InvalidInput(format!("{field} is required")))
}

fn required_bool(payload: &Value, field: &str) -> Result<bool, InfraError> {
    payload
        .get(field)
        .and_then(Value::as_bool)
        .ok_or_else(|| InfraError::InvalidInput(format!("{field} must be a boolean")))
}

/// The field is free text, so numbers are passed through as their text form
/// and the timer decides whether it is a valid minute count.
fn minutes_input(payload: &Value) -> Result<String, InfraError> {
    match payload.get("minutes") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(raw)) => Ok(raw.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(_) => Err(InfraError::InvalidInput(
            "minutes must be a string or a number".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::recorder::tests::FakeSessionStore;
    use crate::infrastructure::config::AppConfig;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::with_store(AppConfig::default(), Arc::new(FakeSessionStore::default()))
    }

    async fn send(state: &AppState, command: CommandName, payload: Value) -> ResponseEnvelope {
        dispatch(state, CommandEnvelope::new("req", command, payload)).await
    }

    #[tokio::test]
    async fn ping_echoes_request_id() {
        let response = send(&state(), CommandName::HostPing, Value::Null).await;
        assert!(response.ok);
        assert_eq!(response.id.as_deref(), Some("req"));
        assert_eq!(response.payload, json!("pong"));
    }

    #[tokio::test]
    async fn task_commands_round_trip_through_payloads() {
        let state = state();
        let added = send(&state, CommandName::TaskAdd, json!({ "text": "write" })).await;
        assert!(added.ok);
        let task_id = added.payload["id"].as_str().expect("task id").to_string();

        let toggled = send(
            &state,
            CommandName::TaskToggle,
            json!({ "id": task_id, "done": true }),
        )
        .await;
        assert!(toggled.ok);
        assert_eq!(toggled.payload["done"], json!(true));

        let unfinished = send(&state, CommandName::TaskUnfinished, Value::Null).await;
        assert_eq!(unfinished.payload, json!([]));

        let deleted = send(&state, CommandName::TaskDelete, json!({ "id": task_id })).await;
        assert_eq!(deleted.payload, json!({ "removed": true }));
    }

    #[tokio::test]
    async fn empty_task_text_adds_nothing() {
        let state = state();
        let added = send(&state, CommandName::TaskAdd, json!({ "text": "" })).await;
        assert!(added.ok);
        assert_eq!(added.payload, Value::Null);
    }

    #[tokio::test]
    async fn missing_fields_are_reported_as_errors() {
        let state = state();
        let response = send(&state, CommandName::TaskToggle, json!({ "id": "tsk-1" })).await;
        assert!(!response.ok);
        assert!(response.error.expect("error").contains("done"));

        let response = send(&state, CommandName::TimerStart, json!({ "minutes": [1] })).await;
        assert!(!response.ok);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_start_accepts_numeric_minutes() {
        let state = state();
        let started = send(&state, CommandName::TimerStart, json!({ "minutes": 2 })).await;
        assert_eq!(started.payload["phase"], json!("running"));
        assert_eq!(started.payload["display"], json!("02:00"));

        let stopped = send(&state, CommandName::TimerStop, Value::Null).await;
        assert_eq!(stopped.payload["phase"], json!("idle"));
    }

    #[tokio::test]
    async fn leaderboard_reports_empty_message() {
        let response = send(&state(), CommandName::LeaderboardFetch, Value::Null).await;
        assert!(response.ok);
        assert_eq!(response.payload["rows"], json!([]));
        assert_eq!(response.payload["message"], json!("No data yet."));
    }
}
