//! The command/query boundary consumed by a presentation layer.
//!
//! [`DeepWork`] owns the four components and is the single serializing
//! boundary around them: every command runs to completion before the next
//! one, and the presentation layer keeps no authoritative state of its own.
//! Commands return their results directly and append the [`Event`]s they
//! produced to an outbox, drained with [`DeepWork::drain_events`].

use chrono::Utc;

use crate::config::Config;
use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;
use crate::nudge::{ContextSnapshot, Nudge, NudgeEngine, PcgRandom, RandomSource};
use crate::session::{ClosedSession, Intention, SessionController, SessionReview, SessionSnapshot};
use crate::stats::{DailyStats, StatsAggregator};
use crate::task::{NewTask, Task, TaskId, TaskStore};

pub struct DeepWork<R = PcgRandom> {
    config: Config,
    tasks: TaskStore,
    session: SessionController,
    nudges: NudgeEngine<R>,
    stats: StatsAggregator,
    outbox: Vec<Event>,
}

impl DeepWork<PcgRandom> {
    pub fn new(config: Config) -> Self {
        let nudges = NudgeEngine::from_config(&config.nudge);
        Self::with_nudges(config, nudges)
    }
}

impl<R: RandomSource> DeepWork<R> {
    /// Build around a caller-supplied nudge engine, e.g. one with a
    /// scripted random source.
    pub fn with_nudges(config: Config, nudges: NudgeEngine<R>) -> Self {
        Self {
            config,
            tasks: TaskStore::new(),
            session: SessionController::new(),
            nudges,
            stats: StatsAggregator::new(),
            outbox: Vec::new(),
        }
    }

    /// Start from previously known counters.
    pub fn with_stats(mut self, stats: DailyStats) -> Self {
        self.stats = StatsAggregator::with_stats(stats);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.tasks()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn eligible_tasks(&self) -> Vec<&Task> {
        self.tasks.eligible_tasks()
    }

    pub fn is_eligible(&self, id: TaskId) -> bool {
        self.tasks.get(id).is_some_and(|t| self.tasks.is_eligible(t))
    }

    pub fn session(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn stats(&self) -> DailyStats {
        self.stats.stats()
    }

    /// Outstanding nudge, hidden while a session is active.
    pub fn pending_nudge(&self) -> Option<&Nudge> {
        if self.session.is_active() {
            return None;
        }
        self.nudges.pending()
    }

    /// Take every event produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    // ── Task commands ────────────────────────────────────────────────

    pub fn add_task(&mut self, new: NewTask) -> Result<TaskId> {
        let id = self.tasks.add_task(new).inspect_err(rejected)?;
        self.emit(Event::TaskAdded {
            task_id: id,
            at: Utc::now(),
        });
        Ok(id)
    }

    pub fn add_dependency(&mut self, task: TaskId, depends_on: TaskId) -> Result<()> {
        if self
            .tasks
            .add_dependency(task, depends_on)
            .inspect_err(rejected)?
        {
            self.emit(Event::DependencyAdded {
                task_id: task,
                depends_on,
                at: Utc::now(),
            });
        }
        Ok(())
    }

    pub fn complete_task(&mut self, id: TaskId) -> Result<()> {
        if self.tasks.complete_task(id).inspect_err(rejected)? {
            self.emit(Event::TaskCompleted {
                task_id: id,
                at: Utc::now(),
            });
        }
        Ok(())
    }

    /// Delete a task. A session still waiting on or running this task is
    /// abandoned.
    pub fn delete_task(&mut self, id: TaskId) -> Result<()> {
        self.tasks.delete_task(id).inspect_err(rejected)?;
        if let Some(event) = self.session.release_task(id) {
            self.emit(event);
        }
        self.emit(Event::TaskDeleted {
            task_id: id,
            at: Utc::now(),
        });
        Ok(())
    }

    // ── Session commands ─────────────────────────────────────────────

    /// Start a session on an existing, eligible task.
    pub fn start_session(&mut self, id: TaskId) -> Result<()> {
        let task = self
            .tasks
            .get(id)
            .ok_or(CoreError::NotFound { id })
            .inspect_err(rejected)?;
        if !self.tasks.is_eligible(task) {
            let err = ValidationError::NotEligible { id }.into();
            rejected(&err);
            return Err(err);
        }
        let event = self.session.start(task).inspect_err(rejected)?;
        self.emit(event);
        Ok(())
    }

    pub fn confirm_ritual(&mut self, intention: Intention) -> Result<()> {
        let event = self.session.confirm_ritual(intention).inspect_err(rejected)?;
        self.emit(event);
        Ok(())
    }

    /// Drop the running session without credit. There is no resume.
    pub fn abandon_session(&mut self) -> Result<()> {
        let event = self.session.abandon().inspect_err(rejected)?;
        self.emit(event);
        Ok(())
    }

    pub fn end_session(&mut self) -> Result<()> {
        let event = self.session.end().inspect_err(rejected)?;
        self.dispatch(event);
        Ok(())
    }

    pub fn confirm_close(&mut self, review: SessionReview) -> Result<ClosedSession> {
        let (closed, event) = self.session.confirm_close(review).inspect_err(rejected)?;
        self.emit(event);
        Ok(closed)
    }

    /// One second of wall time. Ignored unless a session is running.
    pub fn tick(&mut self) {
        if let Some(event) = self.session.tick() {
            self.dispatch(event);
        }
    }

    // ── Nudges ───────────────────────────────────────────────────────

    /// Feed one context sample to the nudge heuristic.
    pub fn sample_context(&mut self, context: &ContextSnapshot) -> Option<Nudge> {
        let nudge = self
            .nudges
            .maybe_trigger(context, self.session.is_active())?;
        self.emit(Event::NudgeTriggered {
            kind: nudge.kind,
            message: nudge.message.clone(),
            at: Utc::now(),
        });
        Some(nudge)
    }

    pub fn mark_nudge_shown(&mut self) -> Result<()> {
        self.nudges.mark_shown().inspect_err(rejected)?;
        Ok(())
    }

    /// Accept the outstanding nudge and start a session on its target.
    ///
    /// Returns the target task, or `None` when nothing is eligible.
    pub fn accept_nudge(&mut self) -> Result<Option<TaskId>> {
        if let Some(task) = self.session.task() {
            let err = CoreError::Conflict { active: task.id };
            rejected(&err);
            return Err(err);
        }
        let (nudge, target) = self.nudges.accept(&self.tasks).inspect_err(rejected)?;
        self.emit(Event::NudgeAccepted {
            kind: nudge.kind,
            task_id: target,
            at: Utc::now(),
        });
        if let Some(id) = target {
            self.start_session(id)?;
        }
        Ok(target)
    }

    pub fn dismiss_nudge(&mut self) -> Result<()> {
        let nudge = self.nudges.dismiss().inspect_err(rejected)?;
        self.emit(Event::NudgeDismissed {
            kind: nudge.kind,
            at: Utc::now(),
        });
        Ok(())
    }

    // ── Stats ────────────────────────────────────────────────────────

    pub fn record_interruption(&mut self) {
        let stats = self.stats.record_interruption();
        self.emit(Event::StatsUpdated {
            stats,
            at: Utc::now(),
        });
    }

    pub fn set_streak_days(&mut self, days: u32) -> Result<()> {
        let stats = self.stats.set_streak_days(days).inspect_err(rejected)?;
        self.emit(Event::StatsUpdated {
            stats,
            at: Utc::now(),
        });
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Emit an event and route completions to the stats aggregator.
    fn dispatch(&mut self, event: Event) {
        if let Event::SessionCompleted {
            elapsed_minutes, ..
        } = event
        {
            let stats = self.stats.on_session_completed(elapsed_minutes);
            self.emit(event);
            self.emit(Event::StatsUpdated {
                stats,
                at: Utc::now(),
            });
            return;
        }
        self.emit(event);
    }

    fn emit(&mut self, event: Event) {
        self.outbox.push(event);
    }
}

fn rejected(err: &CoreError) {
    tracing::warn!(error = %err, "command rejected");
}
