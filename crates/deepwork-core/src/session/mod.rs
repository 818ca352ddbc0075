mod controller;
mod ritual;

pub use controller::{SessionController, SessionSnapshot};
pub use ritual::{ClosedSession, Intention, SessionReview};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the single system-wide timebox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Task bound; waiting for micro-intention and end condition.
    OpeningRitual,
    Running,
    /// Countdown over; waiting for the review.
    ClosingRitual,
}

impl SessionPhase {
    /// Any phase other than Idle holds a task.
    pub fn is_active(self) -> bool {
        self != SessionPhase::Idle
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::OpeningRitual => "in opening ritual",
            SessionPhase::Running => "running",
            SessionPhase::ClosingRitual => "in closing ritual",
        };
        f.write_str(s)
    }
}

/// How a session reached the closing ritual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// Countdown reached zero.
    Expired,
    /// `end()` called while running.
    EndedEarly,
}
