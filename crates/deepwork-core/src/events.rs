use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::nudge::NudgeKind;
use crate::session::CompletionReason;
use crate::stats::DailyStats;
use crate::task::TaskId;

/// Every state change in the core produces an Event.
/// The presentation layer drains them and re-renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TaskAdded {
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    DependencyAdded {
        task_id: TaskId,
        depends_on: TaskId,
        at: DateTime<Utc>,
    },
    /// Session bound to a task; opening ritual pending.
    SessionStarted {
        task_id: TaskId,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Opening ritual done; countdown running.
    RitualConfirmed {
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    SessionTick {
        task_id: TaskId,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown expired or the session was ended by hand.
    /// Raised exactly once per session.
    SessionCompleted {
        task_id: TaskId,
        elapsed_minutes: u32,
        reason: CompletionReason,
        at: DateTime<Utc>,
    },
    /// Session dropped without credit; remaining time discarded.
    SessionAbandoned {
        task_id: TaskId,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Closing ritual done; controller back to Idle.
    SessionClosed {
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    /// Nudge fired and is pending display.
    NudgeTriggered {
        kind: NudgeKind,
        message: String,
        at: DateTime<Utc>,
    },
    NudgeAccepted {
        kind: NudgeKind,
        task_id: Option<TaskId>,
        at: DateTime<Utc>,
    },
    NudgeDismissed {
        kind: NudgeKind,
        at: DateTime<Utc>,
    },
    StatsUpdated {
        stats: DailyStats,
        at: DateTime<Utc>,
    },
}
