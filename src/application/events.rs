use serde::Serialize;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 128;

/// Notifications pushed to the host while commands run in the background.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", content = "payload")]
pub enum AppEvent {
    #[serde(rename = "timer.tick")]
    TimerTick {
        remaining_seconds: u32,
        display: String,
    },
    #[serde(rename = "timer.completed")]
    TimerCompleted { minutes: u32 },
    #[serde(rename = "timer.stopped")]
    TimerStopped,
    #[serde(rename = "upload.finished")]
    UploadFinished {
        duration: String,
        task: Option<String>,
        ok: bool,
        error: Option<String>,
    },
    #[serde(rename = "wheel.step")]
    WheelStep { candidate: String },
    #[serde(rename = "wheel.finished")]
    WheelFinished { winner: String },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Events sent with no subscriber are dropped.
    pub fn emit(&self, event: AppEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }
}
