//! Nudge trigger heuristic.
//!
//! Deliberately simple: fire only when the calendar is free, and then only
//! with a fixed probability per evaluation. No learning, no persisted model.
//! The engine reads the task store but never mutates it or the session.

use super::{ContextSnapshot, Nudge, NudgeKind, NudgeState, PcgRandom, RandomSource};
use crate::config::NudgeConfig;
use crate::error::{CoreError, Result};
use crate::task::{TaskId, TaskStore};

#[derive(Debug, Clone)]
pub struct NudgeEngine<R = PcgRandom> {
    rng: R,
    probability: f64,
    enabled: bool,
    current: Option<Nudge>,
}

impl NudgeEngine<PcgRandom> {
    /// Seeded from `config.seed` when set, otherwise from entropy.
    pub fn from_config(config: &NudgeConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => PcgRandom::seeded(seed),
            None => PcgRandom::from_entropy(),
        };
        Self::new(rng, config.probability).enabled(config.enabled)
    }
}

impl<R: RandomSource> NudgeEngine<R> {
    pub fn new(rng: R, probability: f64) -> Self {
        Self {
            rng,
            probability: if probability.is_nan() {
                0.0
            } else {
                probability.clamp(0.0, 1.0)
            },
            enabled: true,
            current: None,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Latest nudge, whatever its state.
    pub fn current(&self) -> Option<&Nudge> {
        self.current.as_ref()
    }

    /// Latest nudge if it still awaits the user.
    pub fn pending(&self) -> Option<&Nudge> {
        self.current.as_ref().filter(|n| n.state.is_outstanding())
    }

    /// Evaluate one sampling window.
    ///
    /// Never fires while a session is active. Otherwise fires only when the
    /// calendar is free and a uniform draw exceeds `1 - probability`; a
    /// second draw picks the message. A new nudge replaces any older one.
    pub fn maybe_trigger(&mut self, context: &ContextSnapshot, session_active: bool) -> Option<Nudge> {
        if session_active || !self.enabled {
            return None;
        }
        if !context.calendar_free {
            tracing::debug!(app = %context.active_app, "nudge skipped: calendar busy");
            return None;
        }
        let draw = self.rng.next_unit();
        if draw <= 1.0 - self.probability {
            tracing::debug!(draw, "nudge gate closed");
            return None;
        }

        let kind = NudgeKind::CATALOG[self.rng.next_index(NudgeKind::CATALOG.len())];
        let nudge = Nudge::new(kind);
        tracing::info!(?kind, "nudge triggered");
        self.current = Some(nudge.clone());
        Some(nudge)
    }

    /// Pending -> Shown, once the presentation layer renders the nudge.
    pub fn mark_shown(&mut self) -> Result<&Nudge> {
        let nudge = self.outstanding_mut()?;
        nudge.state = NudgeState::Shown;
        Ok(nudge)
    }

    /// Accept the outstanding nudge and pick its target: the first eligible
    /// task in insertion order, if any.
    pub fn accept(&mut self, tasks: &TaskStore) -> Result<(Nudge, Option<TaskId>)> {
        let nudge = self.outstanding_mut()?;
        nudge.state = NudgeState::Accepted;
        let nudge = nudge.clone();
        let target = tasks.first_eligible().map(|t| t.id);
        tracing::info!(kind = ?nudge.kind, target = ?target, "nudge accepted");
        Ok((nudge, target))
    }

    /// Dismiss the outstanding nudge. Terminal.
    pub fn dismiss(&mut self) -> Result<Nudge> {
        let nudge = self.outstanding_mut()?;
        nudge.state = NudgeState::Dismissed;
        Ok(nudge.clone())
    }

    fn outstanding_mut(&mut self) -> Result<&mut Nudge> {
        self.current
            .as_mut()
            .filter(|n| n.state.is_outstanding())
            .ok_or(CoreError::NoPendingNudge)
    }
}
