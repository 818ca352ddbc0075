//! Task types and the dependency-aware task store.
//!
//! A task is a unit of deep work bound to a verb ("Review", "Write") and an
//! expected duration. Tasks may depend on other tasks; a task is *eligible*
//! once it is not completed and every direct dependency is satisfied.

mod store;

pub use store::TaskStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Opaque task identifier.
///
/// Assigned by the store at creation from a monotonic counter, so ordering
/// by id is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(TaskId)
    }
}

/// Energy a task demands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for EnergyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(EnergyLevel::Low),
            "medium" | "med" => Ok(EnergyLevel::Medium),
            "high" => Ok(EnergyLevel::High),
            other => Err(format!("unknown energy level '{other}' (low, medium, high)")),
        }
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub verb: String,
    pub duration_minutes: u32,
    pub energy: EnergyLevel,
}

impl NewTask {
    pub fn new(
        name: impl Into<String>,
        verb: impl Into<String>,
        duration_minutes: u32,
        energy: EnergyLevel,
    ) -> Self {
        Self {
            name: name.into(),
            verb: verb.into(),
            duration_minutes,
            energy,
        }
    }
}

/// A unit of deep work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier, assigned at creation
    pub id: TaskId,
    /// Task title
    pub name: String,
    /// Action verb shown alongside the name
    pub verb: String,
    /// Expected session length in minutes
    pub duration_minutes: u32,
    /// Energy the task demands
    pub energy: EnergyLevel,
    /// Ids that must be completed before this task is eligible.
    /// May contain ids of tasks that no longer exist.
    pub dependencies: BTreeSet<TaskId>,
    /// Monotonic false -> true
    pub completed: bool,
}

impl Task {
    /// Session length in seconds.
    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }

    /// "Verb • Name", the heading used for a running session.
    pub fn headline(&self) -> String {
        format!("{} • {}", self.verb, self.name)
    }
}
