use crate::application::events::{AppEvent, EventBus};
use crate::infrastructure::config::WheelConfig;
use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Duration;
use tokio::time::sleep;

/// Random pick over unfinished tasks, animated as a fixed number of steps.
#[derive(Debug, Clone)]
pub struct WheelSpinner {
    steps: u32,
    step_delay: Duration,
    events: EventBus,
}

impl WheelSpinner {
    pub fn new(config: &WheelConfig, events: EventBus) -> Self {
        Self {
            steps: config.steps,
            step_delay: config.step_delay,
            events,
        }
    }

    /// Spins over `candidates`, which is taken as-is for the whole spin.
    /// Returns `None` for an empty pool.
    pub async fn spin<R>(&self, candidates: Vec<String>, rng: &mut R) -> Option<String>
    where
        R: Rng + Send,
    {
        if candidates.is_empty() {
            return None;
        }

        for _ in 0..self.steps {
            if let Some(candidate) = candidates.choose(rng) {
                self.events.emit(AppEvent::WheelStep {
                    candidate: candidate.clone(),
                });
            }
            sleep(self.step_delay).await;
        }

        let winner = candidates.choose(rng).cloned()?;
        tracing::info!(winner = %winner, pool = candidates.len(), "wheel picked a task");
        self.events.emit(AppEvent::WheelFinished {
            winner: winner.clone(),
        });
        Some(winner)
    }
}
