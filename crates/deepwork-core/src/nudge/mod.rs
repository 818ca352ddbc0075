//! Adaptive nudges: unsolicited suggestions to start a session.

mod context;
mod engine;
mod random;

pub use context::{ContextSnapshot, DistractionLevel, InputCadence};
pub use engine::NudgeEngine;
pub use random::{PcgRandom, RandomSource, ScriptedRandom};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeKind {
    CalendarAvailability,
    Momentum,
    BreathingRitual,
}

impl NudgeKind {
    /// Fixed catalog, in selection order.
    pub const CATALOG: [NudgeKind; 3] = [
        NudgeKind::CalendarAvailability,
        NudgeKind::Momentum,
        NudgeKind::BreathingRitual,
    ];

    pub fn message(self) -> &'static str {
        match self {
            NudgeKind::CalendarAvailability => {
                "Your calendar is free for the next hour. Ready to start a 30-minute deep work session?"
            }
            NudgeKind::Momentum => {
                "You've been context-switching. A focused timebox might help build momentum."
            }
            NudgeKind::BreathingRitual => "Take a 2-minute breath before diving in?",
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            NudgeKind::CalendarAvailability => "Calendar analysis shows availability",
            NudgeKind::Momentum => "Input cadence suggests distraction",
            NudgeKind::BreathingRitual => "Ritual can improve focus quality",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeState {
    Pending,
    Shown,
    Dismissed,
    Accepted,
}

impl NudgeState {
    /// Pending or Shown: still waiting on the user.
    pub fn is_outstanding(self) -> bool {
        matches!(self, NudgeState::Pending | NudgeState::Shown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nudge {
    pub kind: NudgeKind,
    pub message: String,
    pub reason: String,
    pub state: NudgeState,
}

impl Nudge {
    pub fn new(kind: NudgeKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            reason: kind.reason().to_string(),
            state: NudgeState::Pending,
        }
    }
}
