use crate::application::events::{AppEvent, EventBus};
use crate::domain::duration::plain_minutes;
use crate::domain::models::{SessionRecord, normalize_username};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::session_store::SessionStore;
use chrono::{DateTime, Local};
use std::sync::{Arc, RwLock};
use tokio::task::JoinHandle;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

type NowProvider = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// Handle to a dispatched upload. Dropping it detaches the upload.
pub type UploadHandle = JoinHandle<Result<String, InfraError>>;

/// Turns finished focus sessions and task completions into records and ships
/// them to the store without making the caller wait.
pub struct SessionRecorder<S>
where
    S: SessionStore + ?Sized + 'static,
{
    store: Arc<S>,
    events: EventBus,
    username: RwLock<String>,
    now_provider: NowProvider,
}

impl<S> SessionRecorder<S>
where
    S: SessionStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, events: EventBus, username: impl Into<String>) -> Self {
        Self {
            store,
            events,
            username: RwLock::new(username.into()),
            now_provider: Arc::new(Local::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn username(&self) -> String {
        match self.username.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_username(&self, username: impl Into<String>) {
        let username = username.into();
        match self.username.write() {
            Ok(mut guard) => *guard = username,
            Err(poisoned) => *poisoned.into_inner() = username,
        }
    }

    pub fn build_record(&self, minutes: u32, task_name: Option<&str>) -> SessionRecord {
        let completed_tasks = task_name
            .map(|name| vec![name.to_string()])
            .unwrap_or_default();
        SessionRecord {
            username: normalize_username(&self.username()),
            timestamp: (self.now_provider)().format(TIMESTAMP_FORMAT).to_string(),
            duration_text: plain_minutes(minutes),
            task_count: completed_tasks.len() as u32,
            completed_tasks,
        }
    }

    /// Builds the record and spawns its upload. Failures are logged and
    /// reported as an `upload.finished` event, never returned to the caller.
    pub fn record(&self, minutes: u32, task_name: Option<&str>) -> UploadHandle {
        self.upload(self.build_record(minutes, task_name))
    }

    fn upload(&self, record: SessionRecord) -> UploadHandle {
        if let Err(reason) = record.validate() {
            tracing::warn!(reason = %reason, "skipping upload of malformed session record");
            self.events.emit(AppEvent::UploadFinished {
                duration: record.duration_text,
                task: record.completed_tasks.first().cloned(),
                ok: false,
                error: Some(reason.clone()),
            });
            return tokio::spawn(async move { Err(InfraError::InvalidInput(reason)) });
        }

        let store = Arc::clone(&self.store);
        let events = self.events.clone();

        tokio::spawn(async move {
            let result = store.append(&record).await;
            let task = record.completed_tasks.first().cloned();
            match &result {
                Ok(session_id) => {
                    tracing::info!(
                        session_id = %session_id,
                        username = %record.username,
                        duration = %record.duration_text,
                        task_count = record.task_count,
                        "uploaded session record"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        username = %record.username,
                        duration = %record.duration_text,
                        "session upload failed"
                    );
                }
            }
            events.emit(AppEvent::UploadFinished {
                duration: record.duration_text.clone(),
                task,
                ok: result.is_ok(),
                error: result.as_ref().err().map(ToString::to_string),
            });
            result
        })
    }
}
