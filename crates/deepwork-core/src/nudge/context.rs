//! Ambient context supplied by an external sampler.
//!
//! Read-only to the core and used only as heuristic input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keyboard/mouse rhythm observed by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputCadence {
    #[default]
    Steady,
    Erratic,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistractionLevel {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub active_app: String,
    pub input_cadence: InputCadence,
    pub calendar_free: bool,
    pub distraction: DistractionLevel,
}

impl Default for ContextSnapshot {
    fn default() -> Self {
        Self {
            active_app: "VS Code".into(),
            input_cadence: InputCadence::Steady,
            calendar_free: true,
            distraction: DistractionLevel::Low,
        }
    }
}

impl fmt::Display for InputCadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputCadence::Steady => "steady",
            InputCadence::Erratic => "erratic",
            InputCadence::Idle => "idle",
        })
    }
}

impl FromStr for InputCadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "steady" => Ok(InputCadence::Steady),
            "erratic" => Ok(InputCadence::Erratic),
            "idle" => Ok(InputCadence::Idle),
            other => Err(format!("unknown input cadence '{other}' (steady, erratic, idle)")),
        }
    }
}

impl fmt::Display for DistractionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DistractionLevel::Low => "low",
            DistractionLevel::Medium => "medium",
            DistractionLevel::High => "high",
        })
    }
}

impl FromStr for DistractionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(DistractionLevel::Low),
            "medium" => Ok(DistractionLevel::Medium),
            "high" => Ok(DistractionLevel::High),
            other => Err(format!("unknown distraction level '{other}' (low, medium, high)")),
        }
    }
}
