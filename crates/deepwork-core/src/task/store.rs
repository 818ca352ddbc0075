//! Task store.
//!
//! Owns the task set and its dependency edges. Eligibility is recomputed on
//! every call from direct edges only, so malformed graphs (cycles, dangling
//! ids) cannot make it loop.
//!
//! ## Dangling dependencies
//!
//! Deleting a task does not remove its id from other tasks' dependency sets.
//! A dependency id that no longer resolves counts as satisfied, so deleting a
//! prerequisite unblocks its dependents exactly as completing it would.

use std::collections::BTreeMap;

use super::{NewTask, Task, TaskId};
use crate::error::{CoreError, Result, ValidationError};

#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    // Keyed by monotonic id, so iteration order is insertion order.
    tasks: BTreeMap<TaskId, Task>,
    next_id: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 1,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether `task` could start now: not completed and no direct
    /// dependency resolves to an existing, incomplete task.
    pub fn is_eligible(&self, task: &Task) -> bool {
        !task.completed
            && task
                .dependencies
                .iter()
                .all(|dep| self.tasks.get(dep).map_or(true, |t| t.completed))
    }

    /// Every eligible task, in insertion order.
    pub fn eligible_tasks(&self) -> Vec<&Task> {
        self.tasks.values().filter(|t| self.is_eligible(t)).collect()
    }

    /// First eligible task in insertion order.
    pub fn first_eligible(&self) -> Option<&Task> {
        self.tasks.values().find(|t| self.is_eligible(t))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Create a task with no dependencies.
    ///
    /// Duration bounds belong to the creation interface; the store accepts
    /// any value.
    pub fn add_task(&mut self, new: NewTask) -> Result<TaskId> {
        if new.name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "name" }.into());
        }
        if new.verb.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "verb" }.into());
        }

        let id = TaskId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        tracing::info!(task_id = %id, name = %new.name, minutes = new.duration_minutes, "task added");
        self.tasks.insert(
            id,
            Task {
                id,
                name: new.name,
                verb: new.verb,
                duration_minutes: new.duration_minutes,
                energy: new.energy,
                dependencies: Default::default(),
                completed: false,
            },
        );
        Ok(id)
    }

    /// Mark a task completed. Returns `false` if it already was.
    pub fn complete_task(&mut self, id: TaskId) -> Result<bool> {
        let task = self.tasks.get_mut(&id).ok_or(CoreError::NotFound { id })?;
        if task.completed {
            return Ok(false);
        }
        task.completed = true;
        tracing::info!(task_id = %id, "task completed");
        Ok(true)
    }

    /// Remove a task. Dependents keep the id in their dependency sets.
    pub fn delete_task(&mut self, id: TaskId) -> Result<Task> {
        let task = self.tasks.remove(&id).ok_or(CoreError::NotFound { id })?;
        tracing::info!(task_id = %id, "task deleted");
        Ok(task)
    }

    /// Record that `task` cannot start before `depends_on` is completed.
    ///
    /// Cycles are not detected. Returns `false` if the edge already existed.
    pub fn add_dependency(&mut self, task: TaskId, depends_on: TaskId) -> Result<bool> {
        if task == depends_on {
            return Err(ValidationError::SelfDependency { id: task }.into());
        }
        if !self.contains(depends_on) {
            return Err(CoreError::NotFound { id: depends_on });
        }
        let entry = self
            .tasks
            .get_mut(&task)
            .ok_or(CoreError::NotFound { id: task })?;
        Ok(entry.dependencies.insert(depends_on))
    }

    /// Drop a dependency edge. `depends_on` need not exist any more.
    pub fn remove_dependency(&mut self, task: TaskId, depends_on: TaskId) -> Result<bool> {
        let entry = self
            .tasks
            .get_mut(&task)
            .ok_or(CoreError::NotFound { id: task })?;
        Ok(entry.dependencies.remove(&depends_on))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::EnergyLevel;

    fn new_task(name: &str, minutes: u32) -> NewTask {
        NewTask::new(name, "Do", minutes, EnergyLevel::Medium)
    }

    fn ids(tasks: Vec<&Task>) -> Vec<TaskId> {
        tasks.into_iter().map(|t| t.id).collect()
    }

    #[test]
    fn add_task_assigns_increasing_ids() {
        let mut store = TaskStore::new();
        let a = store.add_task(new_task("A", 30)).unwrap();
        let b = store.add_task(new_task("B", 45)).unwrap();
        assert!(a < b);
        let task = store.get(b).unwrap();
        assert!(task.dependencies.is_empty());
        assert!(!task.completed);
    }

    #[test]
    fn default_store_also_starts_ids_at_one() {
        let mut store = TaskStore::default();
        assert_eq!(store.add_task(new_task("A", 30)).unwrap(), TaskId(1));
    }

    #[test]
    fn add_task_rejects_empty_name_and_verb() {
        let mut store = TaskStore::new();
        let err = store.add_task(new_task("  ", 30)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyField { field: "name" })
        ));

        let err = store
            .add_task(NewTask::new("Docs", "", 30, EnergyLevel::Low))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyField { field: "verb" })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn store_does_not_enforce_duration_bounds() {
        let mut store = TaskStore::new();
        let id = store.add_task(new_task("Quick", 5)).unwrap();
        assert_eq!(store.get(id).unwrap().duration_minutes, 5);
    }

    #[test]
    fn complete_task_is_idempotent() {
        let mut store = TaskStore::new();
        let a = store.add_task(new_task("A", 30)).unwrap();
        assert!(store.complete_task(a).unwrap());
        assert!(!store.complete_task(a).unwrap());
        assert!(store.get(a).unwrap().completed);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut store = TaskStore::new();
        assert!(matches!(
            store.complete_task(TaskId(9)),
            Err(CoreError::NotFound { id: TaskId(9) })
        ));
        assert!(matches!(
            store.delete_task(TaskId(9)),
            Err(CoreError::NotFound { id: TaskId(9) })
        ));
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = TaskStore::new();
        let a = store.add_task(new_task("A", 30)).unwrap();
        store.delete_task(a).unwrap();
        let b = store.add_task(new_task("B", 30)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn dependency_blocks_until_completed() {
        let mut store = TaskStore::new();
        let a = store.add_task(new_task("A", 30)).unwrap();
        let b = store.add_task(new_task("B", 45)).unwrap();
        store.add_dependency(b, a).unwrap();

        assert_eq!(ids(store.eligible_tasks()), vec![a]);
        store.complete_task(a).unwrap();
        assert_eq!(ids(store.eligible_tasks()), vec![b]);
    }

    #[test]
    fn deleted_dependency_counts_as_satisfied() {
        let mut store = TaskStore::new();
        let a = store.add_task(new_task("A", 30)).unwrap();
        let b = store.add_task(new_task("B", 45)).unwrap();
        store.add_dependency(b, a).unwrap();

        store.delete_task(a).unwrap();
        assert!(store.get(b).unwrap().dependencies.contains(&a));
        assert_eq!(ids(store.eligible_tasks()), vec![b]);
    }

    #[test]
    fn add_dependency_validates_ends() {
        let mut store = TaskStore::new();
        let a = store.add_task(new_task("A", 30)).unwrap();

        assert!(matches!(
            store.add_dependency(a, a),
            Err(CoreError::Validation(ValidationError::SelfDependency { .. }))
        ));
        assert!(matches!(
            store.add_dependency(a, TaskId(99)),
            Err(CoreError::NotFound { id: TaskId(99) })
        ));
        assert!(matches!(
            store.add_dependency(TaskId(99), a),
            Err(CoreError::NotFound { id: TaskId(99) })
        ));
    }

    #[test]
    fn add_dependency_reports_duplicates() {
        let mut store = TaskStore::new();
        let a = store.add_task(new_task("A", 30)).unwrap();
        let b = store.add_task(new_task("B", 30)).unwrap();
        assert!(store.add_dependency(b, a).unwrap());
        assert!(!store.add_dependency(b, a).unwrap());
        assert!(store.remove_dependency(b, a).unwrap());
        assert!(!store.remove_dependency(b, a).unwrap());
    }

    #[test]
    fn cycles_terminate_and_block_both_tasks() {
        let mut store = TaskStore::new();
        let a = store.add_task(new_task("A", 30)).unwrap();
        let b = store.add_task(new_task("B", 30)).unwrap();
        let c = store.add_task(new_task("C", 30)).unwrap();
        store.add_dependency(a, b).unwrap();
        store.add_dependency(b, a).unwrap();

        assert_eq!(ids(store.eligible_tasks()), vec![c]);
    }

    #[test]
    fn first_eligible_follows_insertion_order() {
        let mut store = TaskStore::new();
        let a = store.add_task(new_task("A", 30)).unwrap();
        let b = store.add_task(new_task("B", 30)).unwrap();
        assert_eq!(store.first_eligible().map(|t| t.id), Some(a));
        store.complete_task(a).unwrap();
        assert_eq!(store.first_eligible().map(|t| t.id), Some(b));
        store.complete_task(b).unwrap();
        assert!(store.first_eligible().is_none());
    }
}
