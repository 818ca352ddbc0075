//! # DeepWork Core Library
//!
//! Business logic for a personal focus-session manager. It follows a
//! CLI-first philosophy: the core is a plain in-process command/query API and
//! every presentation layer, the bundled CLI included, is a thin shell over it.
//!
//! ## Architecture
//!
//! - **Task Store**: tasks with dependency edges and on-demand eligibility
//! - **Session Controller**: the single timebox state machine
//!   (idle, opening ritual, running, closing ritual), driven by external ticks
//! - **Nudge Engine**: context-sampled suggestions to start a session, with an
//!   injectable random source
//! - **Stats Aggregator**: same-day focus counters fed by session completions
//!
//! ## Key Components
//!
//! - [`DeepWork`]: the facade that owns all four components
//! - [`TaskStore`], [`SessionController`], [`NudgeEngine`], [`StatsAggregator`]
//! - [`Config`]: TOML configuration
//! - [`Event`]: every state change, drained by the presentation layer

pub mod config;
pub mod deep_work;
pub mod error;
pub mod events;
pub mod nudge;
pub mod session;
pub mod stats;
pub mod task;

pub use config::Config;
pub use deep_work::DeepWork;
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use events::Event;
pub use nudge::{
    ContextSnapshot, DistractionLevel, InputCadence, Nudge, NudgeEngine, NudgeKind, NudgeState,
    PcgRandom, RandomSource, ScriptedRandom,
};
pub use session::{
    ClosedSession, CompletionReason, Intention, SessionController, SessionPhase, SessionReview,
    SessionSnapshot,
};
pub use stats::{DailyStats, StatsAggregator};
pub use task::{EnergyLevel, NewTask, Task, TaskId, TaskStore};
