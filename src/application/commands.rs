use crate::application::bootstrap::bootstrap_workspace;
use crate::application::events::{AppEvent, EventBus};
use crate::application::leaderboard::{EMPTY_LEADERBOARD_MESSAGE, LeaderboardRow, fetch_leaderboard};
use crate::application::recorder::SessionRecorder;
use crate::application::timer::TimerService;
use crate::application::wheel::WheelSpinner;
use crate::domain::duration::format_countdown;
use crate::domain::models::{Task, normalize_username};
use crate::domain::roster::{Completion, TaskRoster};
use crate::domain::timer::TimerState;
use crate::infrastructure::config::{AppConfig, load_app_config};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::session_store::{InMemorySessionStore, ReqwestSessionStore, SessionStore};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

/// Everything the host commands share: the user's name, the roster, the
/// timer and the store connection. Built once per process.
pub struct AppState {
    config: AppConfig,
    store: Arc<dyn SessionStore>,
    events: EventBus,
    recorder: Arc<SessionRecorder<dyn SessionStore>>,
    timer: TimerService<dyn SessionStore>,
    wheel: WheelSpinner,
    roster: Mutex<TaskRoster>,
}

impl AppState {
    pub fn new(workspace_root: std::path::PathBuf) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let config = load_app_config(&bootstrap.config_dir)?;
        let store = build_store(&config);
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn SessionStore>) -> Self {
        let events = EventBus::new();
        let recorder = Arc::new(SessionRecorder::new(
            Arc::clone(&store),
            events.clone(),
            config.username.clone(),
        ));
        let timer = TimerService::new(Arc::clone(&recorder), events.clone(), config.tick_interval);
        let wheel = WheelSpinner::new(&config.wheel, events.clone());

        Self {
            config,
            store,
            events,
            recorder,
            timer,
            wheel,
            roster: Mutex::new(TaskRoster::new()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn timer(&self) -> &TimerService<dyn SessionStore> {
        &self.timer
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    pub fn command_error(&self, command: &str, error: &InfraError) -> String {
        tracing::error!(command, error = %error, "command failed");
        error.to_string()
    }
}

fn build_store(config: &AppConfig) -> Arc<dyn SessionStore> {
    match &config.store_url {
        Some(url) => {
            tracing::info!(store_url = %url, "using remote session store");
            Arc::new(ReqwestSessionStore::new(
                url.clone(),
                config.fetch_timeout,
                config.upload_timeout,
            ))
        }
        None => {
            tracing::warn!("no storeUrl configured; session records stay in memory");
            Arc::new(InMemorySessionStore::default())
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserResponse {
    pub username: String,
    pub upload_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TimerStateResponse {
    pub phase: String,
    pub remaining_seconds: u32,
    pub initial_minutes: u32,
    pub display: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WheelSpinResponse {
    pub winner: Option<String>,
    pub pool_size: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LeaderboardResponse {
    pub rows: Vec<LeaderboardRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn get_user_impl(state: &AppState) -> Result<UserResponse, InfraError> {
    Ok(to_user_response(state.recorder.username()))
}

pub fn set_user_impl(state: &AppState, username: String) -> Result<UserResponse, InfraError> {
    state.recorder.set_username(username.clone());
    tracing::info!(command = "set_user", username = %username, "updated username");
    Ok(to_user_response(username))
}

pub fn start_timer_impl(state: &AppState, minutes: String) -> Result<TimerStateResponse, InfraError> {
    let snapshot = state.timer.start(&minutes)?;
    Ok(to_timer_state_response(&snapshot))
}

pub fn stop_timer_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    let snapshot = state.timer.stop()?;
    Ok(to_timer_state_response(&snapshot))
}

pub fn get_timer_state_impl(state: &AppState) -> Result<TimerStateResponse, InfraError> {
    let snapshot = state.timer.snapshot()?;
    Ok(to_timer_state_response(&snapshot))
}

/// `None` when the text was empty and nothing was added.
pub fn add_task_impl(state: &AppState, text: String) -> Result<Option<Task>, InfraError> {
    let added = lock_roster(state)?.add(&text);
    if let Some(task) = &added {
        tracing::info!(command = "add_task", task_id = %task.id, "added task");
    }
    Ok(added)
}

pub fn list_tasks_impl(state: &AppState) -> Result<Vec<Task>, InfraError> {
    Ok(lock_roster(state)?.tasks().to_vec())
}

pub fn toggle_task_impl(state: &AppState, task_id: String, done: bool) -> Result<Task, InfraError> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(InfraError::InvalidInput("task_id must not be empty".to_string()));
    }

    let (task, completion) = lock_roster(state)?
        .toggle_by_id(task_id, done)
        .ok_or_else(|| InfraError::InvalidInput(format!("task not found: {task_id}")))?;
    if let Some(completion) = completion {
        record_completions(state, &[completion]);
    }
    tracing::info!(command = "toggle_task", task_id, done, "toggled task");
    Ok(task)
}

/// Toggles every task whose text matches; each one that becomes done is
/// recorded separately.
pub fn toggle_tasks_by_text_impl(
    state: &AppState,
    text: String,
    done: bool,
) -> Result<Vec<Task>, InfraError> {
    let (completions, tasks) = {
        let mut roster = lock_roster(state)?;
        let completions = roster.toggle(&text, done);
        (completions, roster.tasks().to_vec())
    };
    record_completions(state, &completions);
    Ok(tasks)
}

pub fn delete_task_impl(state: &AppState, task_id: String) -> Result<bool, InfraError> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(InfraError::InvalidInput("task_id must not be empty".to_string()));
    }

    let removed = lock_roster(state)?.delete_by_id(task_id);
    if removed {
        tracing::info!(command = "delete_task", task_id, "deleted task");
    }
    Ok(removed)
}

pub fn delete_tasks_by_text_impl(state: &AppState, text: String) -> Result<usize, InfraError> {
    let removed = lock_roster(state)?.delete(&text);
    tracing::info!(command = "delete_tasks_by_text", removed, "deleted tasks by text");
    Ok(removed)
}

pub fn unfinished_tasks_impl(state: &AppState) -> Result<Vec<String>, InfraError> {
    Ok(lock_roster(state)?.unfinished())
}

pub async fn spin_wheel_impl(state: &AppState) -> Result<WheelSpinResponse, InfraError> {
    let candidates = unfinished_tasks_impl(state)?;
    let pool_size = candidates.len();
    let mut rng = StdRng::from_entropy();
    let winner = state.wheel.spin(candidates, &mut rng).await;
    Ok(WheelSpinResponse { winner, pool_size })
}

pub async fn fetch_leaderboard_impl(state: &AppState) -> Result<LeaderboardResponse, InfraError> {
    let rows = fetch_leaderboard(state.store.as_ref()).await;
    let message = rows
        .is_empty()
        .then(|| EMPTY_LEADERBOARD_MESSAGE.to_string());
    Ok(LeaderboardResponse { rows, message })
}

fn record_completions(state: &AppState, completions: &[Completion]) {
    for completion in completions {
        tracing::info!(task_id = %completion.task_id, "recording task completion");
        // Fire-and-forget: the upload outcome arrives as an event.
        drop(state.recorder.record(0, Some(&completion.text)));
    }
}

fn lock_roster(state: &AppState) -> Result<MutexGuard<'_, TaskRoster>, InfraError> {
    state
        .roster
        .lock()
        .map_err(|error| InfraError::InvalidConfig(format!("roster lock poisoned: {error}")))
}

fn to_user_response(username: String) -> UserResponse {
    UserResponse {
        upload_name: normalize_username(&username),
        username,
    }
}

fn to_timer_state_response(state: &TimerState) -> TimerStateResponse {
    TimerStateResponse {
        phase: state.phase().as_str().to_string(),
        remaining_seconds: state.remaining_seconds(),
        initial_minutes: state.initial_minutes(),
        display: format_countdown(state.remaining_seconds()),
    }
}
