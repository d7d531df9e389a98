use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    Completed,
}

impl TimerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new countdown began; carries its run id.
    Started { run_id: u64 },
    /// Start while running acts as a stop.
    Stopped,
    /// Input was not a whole number of minutes.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Counting { remaining_seconds: u32 },
    /// Countdown reached zero; the session of `minutes` is owed a record.
    Expired { minutes: u32 },
    /// The run was stopped or superseded; its loop must exit.
    Cancelled,
}

/// Single countdown: idle -> running -> (stopped | completed) -> idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    phase: TimerPhase,
    remaining_seconds: u32,
    initial_minutes: u32,
    run_id: u64,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            phase: TimerPhase::Idle,
            remaining_seconds: 0,
            initial_minutes: 0,
            run_id: 0,
        }
    }
}

impl TimerState {
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn initial_minutes(&self) -> u32 {
        self.initial_minutes
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn start(&mut self, minutes_input: &str) -> StartOutcome {
        if self.is_running() {
            self.stop();
            return StartOutcome::Stopped;
        }
        let Ok(minutes) = minutes_input.trim().parse::<u32>() else {
            return StartOutcome::Ignored;
        };
        let Some(seconds) = minutes.checked_mul(60) else {
            return StartOutcome::Ignored;
        };

        self.run_id += 1;
        self.phase = TimerPhase::Running;
        self.initial_minutes = minutes;
        self.remaining_seconds = seconds;
        StartOutcome::Started {
            run_id: self.run_id,
        }
    }

    /// Early stop. Returns false when nothing was running.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.reset();
        true
    }

    /// Advances `run_id`'s countdown by one second.
    pub fn tick(&mut self, run_id: u64) -> TickOutcome {
        if !self.is_running() || self.run_id != run_id {
            return TickOutcome::Cancelled;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return TickOutcome::Counting {
                remaining_seconds: self.remaining_seconds,
            };
        }
        self.phase = TimerPhase::Completed;
        TickOutcome::Expired {
            minutes: self.initial_minutes,
        }
    }

    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.remaining_seconds = 0;
        self.initial_minutes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(state: &mut TimerState, input: &str) -> u64 {
        match state.start(input) {
            StartOutcome::Started { run_id } => run_id,
            other => panic!("expected start, got {other:?}"),
        }
    }

    #[test]
    fn start_rejects_non_integer_input() {
        let mut state = TimerState::default();
        for input in ["", "abc", "1.5", "-3", "25 min"] {
            assert_eq!(state.start(input), StartOutcome::Ignored);
            assert_eq!(state.phase(), TimerPhase::Idle);
        }
    }

    #[test]
    fn start_sets_countdown_from_minutes() {
        let mut state = TimerState::default();
        started(&mut state, " 25 ");
        assert_eq!(state.phase(), TimerPhase::Running);
        assert_eq!(state.remaining_seconds(), 25 * 60);
        assert_eq!(state.initial_minutes(), 25);
    }

    #[test]
    fn one_minute_expires_after_sixty_ticks() {
        let mut state = TimerState::default();
        let run_id = started(&mut state, "1");
        for expected in (1..60).rev() {
            assert_eq!(
                state.tick(run_id),
                TickOutcome::Counting {
                    remaining_seconds: expected
                }
            );
        }
        assert_eq!(state.tick(run_id), TickOutcome::Expired { minutes: 1 });
        assert_eq!(state.phase(), TimerPhase::Completed);

        state.reset();
        assert_eq!(state.phase(), TimerPhase::Idle);
        assert_eq!(state.tick(run_id), TickOutcome::Cancelled);
    }

    #[test]
    fn zero_minutes_expires_on_first_tick() {
        let mut state = TimerState::default();
        let run_id = started(&mut state, "0");
        assert_eq!(state.tick(run_id), TickOutcome::Expired { minutes: 0 });
    }

    #[test]
    fn start_while_running_stops() {
        let mut state = TimerState::default();
        let run_id = started(&mut state, "5");
        assert_eq!(state.start("10"), StartOutcome::Stopped);
        assert_eq!(state.phase(), TimerPhase::Idle);
        assert_eq!(state.tick(run_id), TickOutcome::Cancelled);
    }

    #[test]
    fn stale_run_is_cancelled_after_restart() {
        let mut state = TimerState::default();
        let first = started(&mut state, "5");
        assert!(state.stop());
        let second = started(&mut state, "5");
        assert_ne!(first, second);
        assert_eq!(state.tick(first), TickOutcome::Cancelled);
        assert!(matches!(state.tick(second), TickOutcome::Counting { .. }));
    }

    #[test]
    fn stop_when_idle_is_noop() {
        let mut state = TimerState::default();
        assert!(!state.stop());
    }
}
