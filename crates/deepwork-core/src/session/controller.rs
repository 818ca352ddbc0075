//! Timebox session controller.
//!
//! A tick-driven state machine with no internal thread: the caller invokes
//! `tick()` once per second of wall time while a session runs. Stopping the
//! countdown is simply leaving the Running phase; later ticks are ignored.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> OpeningRitual --confirm_ritual--> Running
//! Running --tick (remaining > 0)--> Running
//! Running --tick (remaining == 0) | end--> ClosingRitual
//! Running --abandon--> Idle
//! ClosingRitual --confirm_close--> Idle
//! ```
//!
//! At most one session exists at a time; `start()` rejects a second one
//! with `CoreError::Conflict`.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{ClosedSession, CompletionReason, Intention, SessionPhase, SessionReview};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::task::{Task, TaskId};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActiveSession {
    /// Copy of the task taken at start; the store may change underneath.
    task: Task,
    remaining_secs: u64,
    intention: Option<Intention>,
    /// Set once, on the Running -> ClosingRitual transition.
    completion: Option<(u32, CompletionReason)>,
}

/// Read-only view of the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub task: Option<Task>,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub intention: Option<Intention>,
}

impl SessionSnapshot {
    /// 0.0 .. 1.0 progress through the countdown.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / self.total_secs as f64)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionController {
    phase: SessionPhase,
    active: Option<ActiveSession>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.active.as_ref().map_or(0, |s| s.remaining_secs)
    }

    pub fn task(&self) -> Option<&Task> {
        self.active.as_ref().map(|s| &s.task)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            task: self.task().cloned(),
            remaining_secs: self.remaining_secs(),
            total_secs: self.task().map_or(0, Task::duration_secs),
            intention: self.active.as_ref().and_then(|s| s.intention.clone()),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Bind `task` and enter the opening ritual.
    ///
    /// Does not check the task's eligibility; that is the task store's call.
    pub fn start(&mut self, task: &Task) -> Result<Event> {
        if let Some(active) = &self.active {
            return Err(CoreError::Conflict {
                active: active.task.id,
            });
        }

        let duration_secs = task.duration_secs();
        self.active = Some(ActiveSession {
            task: task.clone(),
            remaining_secs: duration_secs,
            intention: None,
            completion: None,
        });
        self.transition(SessionPhase::OpeningRitual);
        Ok(Event::SessionStarted {
            task_id: task.id,
            duration_secs,
            at: Utc::now(),
        })
    }

    /// Finish the opening ritual and start the countdown.
    pub fn confirm_ritual(&mut self, intention: Intention) -> Result<Event> {
        self.expect_phase(SessionPhase::OpeningRitual, "confirm the opening ritual")?;
        let active = self.active_mut()?;
        active.intention = Some(intention);
        let task_id = active.task.id;
        self.transition(SessionPhase::Running);
        Ok(Event::RitualConfirmed {
            task_id,
            at: Utc::now(),
        })
    }

    /// Drop the running session and return to Idle.
    ///
    /// Not a pause: the remaining time is discarded, no credit is given and
    /// there is no resume.
    pub fn abandon(&mut self) -> Result<Event> {
        self.expect_phase(SessionPhase::Running, "abandon")?;
        Ok(self.drop_session())
    }

    /// Abandon the session if it holds `task_id` and has not completed yet.
    ///
    /// Used when the bound task is deleted. A session already in the closing
    /// ritual keeps its copy of the task.
    pub fn release_task(&mut self, task_id: TaskId) -> Option<Event> {
        let holds = self.task().is_some_and(|t| t.id == task_id);
        match self.phase {
            SessionPhase::OpeningRitual | SessionPhase::Running if holds => {
                Some(self.drop_session())
            }
            _ => None,
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `SessionCompleted` on the tick that reaches zero, a
    /// `SessionTick` otherwise, and `None` outside the Running phase.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        let active = self.active.as_mut()?;
        active.remaining_secs = active.remaining_secs.saturating_sub(1);
        let (task_id, remaining_secs) = (active.task.id, active.remaining_secs);
        if remaining_secs == 0 {
            return Some(self.complete(CompletionReason::Expired));
        }
        tracing::debug!(remaining_secs, "session tick");
        Some(Event::SessionTick {
            task_id,
            remaining_secs,
            at: Utc::now(),
        })
    }

    /// End the running session by hand.
    ///
    /// Credits the task's full duration, the same as a natural expiry.
    pub fn end(&mut self) -> Result<Event> {
        self.expect_phase(SessionPhase::Running, "end")?;
        Ok(self.complete(CompletionReason::EndedEarly))
    }

    /// Finish the closing ritual and return to Idle.
    pub fn confirm_close(&mut self, review: SessionReview) -> Result<(ClosedSession, Event)> {
        self.expect_phase(SessionPhase::ClosingRitual, "confirm the closing ritual")?;
        let active = self.active.take().ok_or(CoreError::InvalidTransition {
            operation: "confirm the closing ritual",
            phase: self.phase,
        })?;
        self.transition(SessionPhase::Idle);

        let (elapsed_minutes, reason) = active
            .completion
            .unwrap_or((active.task.duration_minutes, CompletionReason::Expired));
        let closed = ClosedSession {
            task_id: active.task.id,
            task_name: active.task.name,
            elapsed_minutes,
            reason,
            intention: active.intention.unwrap_or_default(),
            review,
        };
        let event = Event::SessionClosed {
            task_id: closed.task_id,
            at: Utc::now(),
        };
        Ok((closed, event))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expect_phase(&self, expected: SessionPhase, operation: &'static str) -> Result<()> {
        if self.phase != expected {
            return Err(CoreError::InvalidTransition {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn active_mut(&mut self) -> Result<&mut ActiveSession> {
        let phase = self.phase;
        self.active.as_mut().ok_or(CoreError::InvalidTransition {
            operation: "access the session",
            phase,
        })
    }

    fn transition(&mut self, to: SessionPhase) {
        tracing::info!(from = %self.phase, to = %to, "session phase changed");
        self.phase = to;
    }

    /// Running -> ClosingRitual. Caller guarantees the Running phase, so
    /// this runs at most once per session.
    fn complete(&mut self, reason: CompletionReason) -> Event {
        let (task_id, elapsed_minutes) = match self.active.as_mut() {
            Some(active) => {
                let elapsed = active.task.duration_minutes;
                active.completion = Some((elapsed, reason));
                (active.task.id, elapsed)
            }
            None => (TaskId(0), 0),
        };
        self.transition(SessionPhase::ClosingRitual);
        Event::SessionCompleted {
            task_id,
            elapsed_minutes,
            reason,
            at: Utc::now(),
        }
    }

    fn drop_session(&mut self) -> Event {
        let (task_id, remaining_secs) = self
            .active
            .take()
            .map_or((TaskId(0), 0), |s| (s.task.id, s.remaining_secs));
        self.transition(SessionPhase::Idle);
        Event::SessionAbandoned {
            task_id,
            remaining_secs,
            at: Utc::now(),
        }
    }
}
