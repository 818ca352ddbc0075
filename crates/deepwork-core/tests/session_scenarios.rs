//! Integration tests for the task graph + timebox scenarios.

use deepwork_core::{
    CompletionReason, Config, ContextSnapshot, CoreError, DeepWork, EnergyLevel, Event, Intention,
    NewTask, NudgeEngine, ScriptedRandom, SessionPhase, SessionReview, TaskId,
};

fn deep_work(draws: &[f64]) -> DeepWork<ScriptedRandom> {
    let nudges = NudgeEngine::new(ScriptedRandom::new(draws.iter().copied()), 0.3);
    DeepWork::with_nudges(Config::default(), nudges)
}

fn eligible_ids(dw: &DeepWork<ScriptedRandom>) -> Vec<TaskId> {
    dw.eligible_tasks().iter().map(|t| t.id).collect()
}

#[test]
fn test_dependency_chain_and_dangling_delete() {
    let mut dw = deep_work(&[]);
    let a = dw
        .add_task(NewTask::new("Review PRs", "Review", 30, EnergyLevel::Medium))
        .unwrap();
    let b = dw
        .add_task(NewTask::new("Write documentation", "Write", 45, EnergyLevel::High))
        .unwrap();
    dw.add_dependency(b, a).unwrap();

    assert_eq!(eligible_ids(&dw), vec![a]);

    dw.complete_task(a).unwrap();
    assert_eq!(eligible_ids(&dw), vec![b]);

    // Current behavior: the stale id left in B's dependencies is satisfied.
    dw.delete_task(a).unwrap();
    assert_eq!(eligible_ids(&dw), vec![b]);
}

#[test]
fn test_deleting_incomplete_prerequisite_unblocks_dependent() {
    let mut dw = deep_work(&[]);
    let a = dw
        .add_task(NewTask::new("Spike", "Explore", 20, EnergyLevel::Low))
        .unwrap();
    let b = dw
        .add_task(NewTask::new("Build", "Write", 60, EnergyLevel::High))
        .unwrap();
    dw.add_dependency(b, a).unwrap();
    assert_eq!(eligible_ids(&dw), vec![a]);

    dw.delete_task(a).unwrap();
    assert_eq!(eligible_ids(&dw), vec![b]);
}

#[test]
fn test_full_countdown_credits_stats() {
    let mut dw = deep_work(&[]);
    let a = dw
        .add_task(NewTask::new("Review PRs", "Review", 30, EnergyLevel::Medium))
        .unwrap();
    let before = dw.stats();

    dw.start_session(a).unwrap();
    let session = dw.session();
    assert_eq!(session.phase, SessionPhase::OpeningRitual);
    assert_eq!(session.remaining_secs, 1800);

    dw.confirm_ritual(Intention::new("x", "y")).unwrap();
    assert_eq!(dw.session().phase, SessionPhase::Running);

    for i in 1..1800u64 {
        dw.tick();
        assert_eq!(dw.session().remaining_secs, 1800 - i);
        assert_eq!(dw.session().phase, SessionPhase::Running);
    }
    dw.tick();
    assert_eq!(dw.session().phase, SessionPhase::ClosingRitual);
    assert_eq!(dw.session().remaining_secs, 0);

    // Extra ticks after expiry change nothing.
    for _ in 0..10 {
        dw.tick();
    }

    let stats = dw.stats();
    assert_eq!(stats.focus_minutes, before.focus_minutes + 30);
    assert_eq!(stats.completed_tasks, before.completed_tasks + 1);

    let events = dw.drain_events();
    let completed: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::SessionCompleted {
                task_id,
                elapsed_minutes,
                reason,
                ..
            } => Some((*task_id, *elapsed_minutes, *reason)),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![(a, 30, CompletionReason::Expired)]);

    let closed = dw
        .confirm_close(SessionReview::new("Reviewed three PRs", "CI flaky"))
        .unwrap();
    assert_eq!(closed.intention, Intention::new("x", "y"));
    assert_eq!(closed.review.blockers, "CI flaky");
    assert_eq!(dw.session().phase, SessionPhase::Idle);
    assert!(dw.session().task.is_none());
}

#[test]
fn test_second_start_conflicts_until_closed() {
    let mut dw = deep_work(&[]);
    let a = dw
        .add_task(NewTask::new("A", "Do", 20, EnergyLevel::Low))
        .unwrap();
    let b = dw
        .add_task(NewTask::new("B", "Do", 20, EnergyLevel::Low))
        .unwrap();

    dw.start_session(a).unwrap();
    assert!(matches!(dw.start_session(b), Err(CoreError::Conflict { active }) if active == a));

    dw.confirm_ritual(Intention::default()).unwrap();
    dw.end_session().unwrap();
    assert!(matches!(dw.start_session(b), Err(CoreError::Conflict { .. })));

    dw.confirm_close(SessionReview::default()).unwrap();
    dw.start_session(b).unwrap();
    assert_eq!(dw.session().remaining_secs, 20 * 60);
}

#[test]
fn test_completion_raised_once_per_session_for_either_path() {
    let mut dw = deep_work(&[]);
    let a = dw
        .add_task(NewTask::new("A", "Do", 20, EnergyLevel::Low))
        .unwrap();

    // Manual end.
    dw.start_session(a).unwrap();
    dw.confirm_ritual(Intention::default()).unwrap();
    dw.end_session().unwrap();
    assert!(dw.end_session().is_err());
    dw.confirm_close(SessionReview::default()).unwrap();

    // Natural expiry.
    dw.start_session(a).unwrap();
    dw.confirm_ritual(Intention::default()).unwrap();
    for _ in 0..(20 * 60 + 5) {
        dw.tick();
    }
    dw.confirm_close(SessionReview::default()).unwrap();

    let completions = dw
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, Event::SessionCompleted { .. }))
        .count();
    assert_eq!(completions, 2);
    assert_eq!(dw.stats().completed_tasks, 2);
    assert_eq!(dw.stats().focus_minutes, 40);
}

#[test]
fn test_session_does_not_complete_the_task() {
    let mut dw = deep_work(&[]);
    let a = dw
        .add_task(NewTask::new("A", "Do", 20, EnergyLevel::Low))
        .unwrap();
    dw.start_session(a).unwrap();
    dw.confirm_ritual(Intention::default()).unwrap();
    dw.end_session().unwrap();
    dw.confirm_close(SessionReview::default()).unwrap();
    assert!(!dw.task(a).unwrap().completed);
}

#[test]
fn test_nudge_never_fires_with_active_session() {
    let draws: Vec<f64> = vec![0.999; 64];
    let mut dw = deep_work(&draws);
    let a = dw
        .add_task(NewTask::new("A", "Do", 20, EnergyLevel::Low))
        .unwrap();
    dw.start_session(a).unwrap();
    for _ in 0..32 {
        assert!(dw.sample_context(&ContextSnapshot::default()).is_none());
    }
    assert!(dw
        .drain_events()
        .iter()
        .all(|e| !matches!(e, Event::NudgeTriggered { .. })));
}

#[test]
fn test_nudge_accept_then_full_session() {
    let mut dw = deep_work(&[0.2, 0.95, 0.95]);
    let a = dw
        .add_task(NewTask::new("Review PRs", "Review", 30, EnergyLevel::Medium))
        .unwrap();

    // 0.2 keeps the gate shut; 0.95 opens it and picks the last catalog entry.
    assert!(dw.sample_context(&ContextSnapshot::default()).is_none());
    let nudge = dw.sample_context(&ContextSnapshot::default()).unwrap();
    assert_eq!(nudge.message, "Take a 2-minute breath before diving in?");

    assert_eq!(dw.accept_nudge().unwrap(), Some(a));
    assert_eq!(dw.session().phase, SessionPhase::OpeningRitual);
    assert_eq!(dw.session().remaining_secs, 1800);
}
