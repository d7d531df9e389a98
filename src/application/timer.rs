use crate::application::events::{AppEvent, EventBus};
use crate::application::recorder::{SessionRecorder, UploadHandle};
use crate::domain::duration::format_countdown;
use crate::domain::timer::{StartOutcome, TickOutcome, TimerState};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::session_store::SessionStore;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

type CountdownHandle = JoinHandle<Option<UploadHandle>>;

/// Drives the countdown for one timer at a time.
///
/// Each run is a spawned loop that sleeps one tick, then re-reads the shared
/// state. Stopping only flips the state; the loop notices at its next wake-up
/// and exits without recording.
pub struct TimerService<S>
where
    S: SessionStore + ?Sized + 'static,
{
    state: Arc<Mutex<TimerState>>,
    recorder: Arc<SessionRecorder<S>>,
    events: EventBus,
    tick_interval: Duration,
    countdown: Mutex<Option<CountdownHandle>>,
}

impl<S> TimerService<S>
where
    S: SessionStore + ?Sized + 'static,
{
    pub fn new(recorder: Arc<SessionRecorder<S>>, events: EventBus, tick_interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState::default())),
            recorder,
            events,
            tick_interval,
            countdown: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> Result<TimerState, InfraError> {
        Ok(lock_state(&self.state)?.clone())
    }

    /// Starts a countdown, or stops the running one.
    pub fn start(&self, minutes_input: &str) -> Result<TimerState, InfraError> {
        let (outcome, snapshot) = {
            let mut state = lock_state(&self.state)?;
            let outcome = state.start(minutes_input);
            (outcome, state.clone())
        };

        match outcome {
            StartOutcome::Started { run_id } => {
                tracing::info!(run_id, minutes = snapshot.initial_minutes(), "timer started");
                self.spawn_countdown(run_id)?;
            }
            StartOutcome::Stopped => {
                tracing::info!("timer stopped by start toggle");
                self.events.emit(AppEvent::TimerStopped);
            }
            StartOutcome::Ignored => {
                tracing::debug!(input = %minutes_input, "ignored timer start with non-integer minutes");
            }
        }
        Ok(snapshot)
    }

    pub fn stop(&self) -> Result<TimerState, InfraError> {
        let (stopped, snapshot) = {
            let mut state = lock_state(&self.state)?;
            let stopped = state.stop();
            (stopped, state.clone())
        };
        if stopped {
            tracing::info!("timer stopped");
            self.events.emit(AppEvent::TimerStopped);
        }
        Ok(snapshot)
    }

    /// Waits for the most recently started countdown loop to exit. Yields the
    /// upload handle when the run expired naturally.
    pub async fn wait_for_countdown(&self) -> Option<UploadHandle> {
        let handle = self.countdown.lock().ok()?.take()?;
        handle.await.ok().flatten()
    }

    fn spawn_countdown(&self, run_id: u64) -> Result<(), InfraError> {
        let handle = tokio::spawn(run_countdown(
            Arc::clone(&self.state),
            Arc::clone(&self.recorder),
            self.events.clone(),
            self.tick_interval,
            run_id,
        ));
        let mut countdown = self
            .countdown
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("countdown lock poisoned: {error}")))?;
        *countdown = Some(handle);
        Ok(())
    }
}

async fn run_countdown<S>(
    state: Arc<Mutex<TimerState>>,
    recorder: Arc<SessionRecorder<S>>,
    events: EventBus,
    tick_interval: Duration,
    run_id: u64,
) -> Option<UploadHandle>
where
    S: SessionStore + ?Sized + 'static,
{
    loop {
        sleep(tick_interval).await;

        let outcome = match state.lock() {
            Ok(mut guard) => guard.tick(run_id),
            Err(_) => return None,
        };

        match outcome {
            TickOutcome::Cancelled => {
                tracing::debug!(run_id, "countdown loop exiting after stop");
                return None;
            }
            TickOutcome::Counting { remaining_seconds } => {
                events.emit(AppEvent::TimerTick {
                    remaining_seconds,
                    display: format_countdown(remaining_seconds),
                });
            }
            TickOutcome::Expired { minutes } => {
                let upload = recorder.record(minutes, None);
                events.emit(AppEvent::TimerCompleted { minutes });
                if let Ok(mut guard) = state.lock() {
                    if guard.run_id() == run_id {
                        guard.reset();
                    }
                }
                tracing::info!(run_id, minutes, "timer completed");
                return Some(upload);
            }
        }
    }
}

fn lock_state(state: &Mutex<TimerState>) -> Result<MutexGuard<'_, TimerState>, InfraError> {
    state
        .lock()
        .map_err(|error| InfraError::InvalidConfig(format!("timer lock poisoned: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::recorder::tests::FakeSessionStore;
    use crate::domain::timer::TimerPhase;
    use std::sync::atomic::Ordering;
    use tokio::sync::broadcast::error::TryRecvError;

    fn timer_with_store(store: Arc<FakeSessionStore>, events: EventBus) -> TimerService<FakeSessionStore> {
        let recorder = Arc::new(SessionRecorder::new(store, events.clone(), "ana"));
        TimerService::new(recorder, events, Duration::from_secs(1))
    }

    fn drain(receiver: &mut tokio::sync::broadcast::Receiver<AppEvent>) -> Vec<AppEvent> {
        let mut drained = Vec::new();
        loop {
            match receiver.try_recv() {
                Ok(event) => drained.push(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => return drained,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn one_minute_run_completes_once_and_records_once() {
        let store = Arc::new(FakeSessionStore::default());
        let events = EventBus::new();
        let mut receiver = events.subscribe();
        let timer = timer_with_store(Arc::clone(&store), events);

        let started = timer.start("1").expect("start");
        assert_eq!(started.phase(), TimerPhase::Running);
        assert_eq!(started.remaining_seconds(), 60);

        let upload = timer.wait_for_countdown().await.expect("run expired");
        upload.await.expect("upload joined").expect("upload ok");

        let appended = store.appended();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].duration_text, "1 min");
        assert!(appended[0].completed_tasks.is_empty());
        assert_eq!(appended[0].task_count, 0);
        assert_eq!(timer.snapshot().expect("snapshot").phase(), TimerPhase::Idle);

        let received = drain(&mut receiver);
        let ticks = received
            .iter()
            .filter(|event| matches!(event, AppEvent::TimerTick { .. }))
            .count();
        let completions = received
            .iter()
            .filter(|event| matches!(event, AppEvent::TimerCompleted { minutes: 1 }))
            .count();
        assert_eq!(ticks, 59);
        assert_eq!(completions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_expiry_records_nothing() {
        let store = Arc::new(FakeSessionStore::default());
        let timer = timer_with_store(Arc::clone(&store), EventBus::new());

        timer.start("1").expect("start");
        sleep(Duration::from_millis(10_500)).await;
        let stopped = timer.stop().expect("stop");
        assert_eq!(stopped.phase(), TimerPhase::Idle);

        assert!(timer.wait_for_countdown().await.is_none());
        sleep(Duration::from_secs(120)).await;
        assert_eq!(store.append_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_toggles_to_stop() {
        let store = Arc::new(FakeSessionStore::default());
        let timer = timer_with_store(Arc::clone(&store), EventBus::new());

        timer.start("2").expect("start");
        let toggled = timer.start("2").expect("toggle");
        assert_eq!(toggled.phase(), TimerPhase::Idle);
        assert!(timer.wait_for_countdown().await.is_none());
        assert_eq!(store.append_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_input_leaves_timer_idle() {
        let store = Arc::new(FakeSessionStore::default());
        let timer = timer_with_store(Arc::clone(&store), EventBus::new());

        let state = timer.start("ten").expect("start");
        assert_eq!(state.phase(), TimerPhase::Idle);
        assert!(timer.wait_for_countdown().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_only_records_second_run() {
        let store = Arc::new(FakeSessionStore::default());
        let timer = timer_with_store(Arc::clone(&store), EventBus::new());

        timer.start("1").expect("first start");
        sleep(Duration::from_millis(5_500)).await;
        timer.stop().expect("stop");
        timer.start("2").expect("second start");

        let upload = timer.wait_for_countdown().await.expect("second run expired");
        upload.await.expect("upload joined").expect("upload ok");
        sleep(Duration::from_secs(120)).await;

        let appended = store.appended();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].duration_text, "2 min");
    }
}
