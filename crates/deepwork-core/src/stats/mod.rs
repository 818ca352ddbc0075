//! Same-day focus counters.
//!
//! Folds completed sessions into [`DailyStats`]. Every counter only ever
//! grows; there is no day-boundary reset.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Counters for the current day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub focus_minutes: u32,
    pub completed_tasks: u32,
    pub interruptions: u32,
    pub streak_days: u32,
}

impl DailyStats {
    /// 0.0 .. 1.0 progress toward a daily focus goal.
    pub fn goal_progress(&self, goal_minutes: u32) -> f64 {
        if goal_minutes == 0 {
            return 1.0;
        }
        (f64::from(self.focus_minutes) / f64::from(goal_minutes)).min(1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    stats: DailyStats,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously known counters.
    pub fn with_stats(stats: DailyStats) -> Self {
        Self { stats }
    }

    pub fn stats(&self) -> DailyStats {
        self.stats
    }

    /// Credit one finished session.
    pub fn on_session_completed(&mut self, elapsed_minutes: u32) -> DailyStats {
        self.stats.focus_minutes = self.stats.focus_minutes.saturating_add(elapsed_minutes);
        self.stats.completed_tasks = self.stats.completed_tasks.saturating_add(1);
        tracing::info!(
            focus_minutes = self.stats.focus_minutes,
            completed_tasks = self.stats.completed_tasks,
            "session credited"
        );
        self.stats
    }

    pub fn record_interruption(&mut self) -> DailyStats {
        self.stats.interruptions = self.stats.interruptions.saturating_add(1);
        self.stats
    }

    pub fn set_interruptions(&mut self, value: u32) -> Result<DailyStats> {
        Self::raise("interruptions", &mut self.stats.interruptions, value)?;
        Ok(self.stats)
    }

    pub fn set_streak_days(&mut self, value: u32) -> Result<DailyStats> {
        Self::raise("streak_days", &mut self.stats.streak_days, value)?;
        Ok(self.stats)
    }

    fn raise(counter: &'static str, slot: &mut u32, value: u32) -> Result<()> {
        if value < *slot {
            return Err(ValidationError::CounterDecrease {
                counter,
                current: *slot,
                requested: value,
            }
            .into());
        }
        *slot = value;
        Ok(())
    }
}
