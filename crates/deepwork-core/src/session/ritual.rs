//! Data captured by the rituals bracketing a session. Free text, never
//! validated.

use serde::{Deserialize, Serialize};

use super::CompletionReason;
use crate::task::TaskId;

/// Captured by the opening ritual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intention {
    /// The one thing this session should accomplish.
    pub micro_intention: String,
    /// How the user will know they are done.
    pub end_condition: String,
}

impl Intention {
    pub fn new(micro_intention: impl Into<String>, end_condition: impl Into<String>) -> Self {
        Self {
            micro_intention: micro_intention.into(),
            end_condition: end_condition.into(),
        }
    }
}

/// Captured by the closing ritual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReview {
    pub accomplished: String,
    pub blockers: String,
}

impl SessionReview {
    pub fn new(accomplished: impl Into<String>, blockers: impl Into<String>) -> Self {
        Self {
            accomplished: accomplished.into(),
            blockers: blockers.into(),
        }
    }
}

/// Record handed back when the closing ritual finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedSession {
    pub task_id: TaskId,
    pub task_name: String,
    pub elapsed_minutes: u32,
    pub reason: CompletionReason,
    pub intention: Intention,
    pub review: SessionReview,
}
