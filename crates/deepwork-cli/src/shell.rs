//! Line-oriented command shell over the core.
//!
//! Parses one command per line, applies it to [`DeepWork`] and renders the
//! outcome. Core errors are printed and the shell keeps going.

use std::io::{self, Write};
use std::str::FromStr;

use deepwork_core::{
    ContextSnapshot, DailyStats, DeepWork, DistractionLevel, EnergyLevel, Event, InputCadence,
    Intention, NewTask, RandomSource, SessionPhase, SessionReview, TaskId,
};

pub const HELP: &str = "\
commands:
  add [minutes] <energy> <verb> <name...>   create a task (energy: low|medium|high)
  dep <task> <depends-on>                   add a dependency edge
  done <task>                               mark a task completed
  rm <task>                                 delete a task
  list                                      all tasks
  eligible                                  tasks that can start now
  start <task>                              begin a session (opening ritual)
  ritual <intention> | <end condition>      confirm the opening ritual
  abandon                                   drop the running session (alias: pause)
  end                                       end the running session now
  close <accomplished> | <blockers>         confirm the closing ritual
  tick [n]                                  advance the countdown n seconds
  context <free|busy> <steady|erratic|idle> <low|medium|high> [app...]
  sample                                    evaluate the nudge heuristic now
  accept | dismiss                          answer the pending nudge
  interrupt                                 count an interruption
  status | stats | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Add {
        /// Falls back to `tasks.default_duration_minutes`.
        minutes: Option<u32>,
        energy: EnergyLevel,
        verb: String,
        name: String,
    },
    Dep { task: TaskId, on: TaskId },
    Done(TaskId),
    Remove(TaskId),
    List,
    Eligible,
    Start(TaskId),
    Ritual(Intention),
    Abandon,
    End,
    Close(SessionReview),
    Tick(u32),
    Context(ContextSnapshot),
    Sample,
    Accept,
    Dismiss,
    Interrupt,
    Status,
    Stats,
    Help,
    Quit,
}

/// Whether the reactor should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn task_id(arg: Option<&str>) -> Result<TaskId, String> {
    let raw = arg.ok_or("missing task id")?;
    raw.parse().map_err(|_| format!("invalid task id '{raw}'"))
}

fn split_pair(rest: &str) -> (String, String) {
    match rest.split_once('|') {
        Some((a, b)) => (a.trim().to_string(), b.trim().to_string()),
        None => (rest.trim().to_string(), String::new()),
    }
}

fn parse_arg<T: FromStr>(arg: Option<&str>, what: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    let raw = arg.ok_or_else(|| format!("missing {what}"))?;
    raw.parse().map_err(|e| format!("invalid {what} '{raw}': {e}"))
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace().peekable();

        let cmd = match word.to_ascii_lowercase().as_str() {
            "add" => {
                let minutes = args.peek().and_then(|raw| raw.parse::<u32>().ok());
                if minutes.is_some() {
                    args.next();
                }
                let energy = parse_arg(args.next(), "energy")?;
                let verb = args.next().ok_or("missing verb")?.to_string();
                let name = args.collect::<Vec<_>>().join(" ");
                ShellCommand::Add {
                    minutes,
                    energy,
                    verb,
                    name,
                }
            }
            "dep" => ShellCommand::Dep {
                task: task_id(args.next())?,
                on: task_id(args.next())?,
            },
            "done" | "complete" => ShellCommand::Done(task_id(args.next())?),
            "rm" | "delete" => ShellCommand::Remove(task_id(args.next())?),
            "list" | "ls" => ShellCommand::List,
            "eligible" => ShellCommand::Eligible,
            "start" => ShellCommand::Start(task_id(args.next())?),
            "ritual" => {
                let (intention, end_condition) = split_pair(rest);
                ShellCommand::Ritual(Intention::new(intention, end_condition))
            }
            "abandon" | "pause" => ShellCommand::Abandon,
            "end" => ShellCommand::End,
            "close" => {
                let (accomplished, blockers) = split_pair(rest);
                ShellCommand::Close(SessionReview::new(accomplished, blockers))
            }
            "tick" => ShellCommand::Tick(match args.next() {
                Some(raw) => parse_arg(Some(raw), "tick count")?,
                None => 1,
            }),
            "context" => {
                let calendar_free = match args.next() {
                    Some("free") => true,
                    Some("busy") => false,
                    other => return Err(format!("expected free|busy, got {other:?}")),
                };
                let input_cadence: InputCadence = parse_arg(args.next(), "input cadence")?;
                let distraction: DistractionLevel = parse_arg(args.next(), "distraction level")?;
                let app = args.collect::<Vec<_>>().join(" ");
                ShellCommand::Context(ContextSnapshot {
                    active_app: if app.is_empty() {
                        ContextSnapshot::default().active_app
                    } else {
                        app
                    },
                    input_cadence,
                    calendar_free,
                    distraction,
                })
            }
            "sample" => ShellCommand::Sample,
            "accept" => ShellCommand::Accept,
            "dismiss" | "later" => ShellCommand::Dismiss,
            "interrupt" => ShellCommand::Interrupt,
            "status" => ShellCommand::Status,
            "stats" => ShellCommand::Stats,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        Ok(cmd)
    }
}

/// `mm:ss` countdown display.
pub fn format_remaining(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub struct Shell<R> {
    dw: DeepWork<R>,
    context: ContextSnapshot,
}

impl<R: RandomSource> Shell<R> {
    pub fn new(dw: DeepWork<R>) -> Self {
        Self {
            dw,
            context: ContextSnapshot::default(),
        }
    }

    pub fn deep_work(&self) -> &DeepWork<R> {
        &self.dw
    }

    /// Seed the two sample tasks of a fresh demo.
    pub fn seed_demo(&mut self) -> deepwork_core::Result<()> {
        let review = self
            .dw
            .add_task(NewTask::new("Review PRs", "Review", 30, EnergyLevel::Medium))?;
        let docs = self.dw.add_task(NewTask::new(
            "Write documentation",
            "Write",
            45,
            EnergyLevel::High,
        ))?;
        self.dw.add_dependency(docs, review)?;
        self.dw.drain_events();
        Ok(())
    }

    /// Parse and run one input line. Blank lines are ignored.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            return Ok(Flow::Continue);
        }
        match line.parse::<ShellCommand>() {
            Ok(cmd) => self.execute(cmd, out),
            Err(e) => {
                writeln!(out, "error: {e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// One wall-clock second from the ticker.
    pub fn on_tick(&mut self, out: &mut impl Write) -> io::Result<()> {
        self.dw.tick();
        self.render_events(out)
    }

    /// One context sample from the sampler.
    pub fn on_sample(&mut self, out: &mut impl Write) -> io::Result<()> {
        let context = self.context.clone();
        self.dw.sample_context(&context);
        self.render_events(out)
    }

    pub fn execute(&mut self, cmd: ShellCommand, out: &mut impl Write) -> io::Result<Flow> {
        let result = match cmd {
            ShellCommand::Add {
                minutes,
                energy,
                verb,
                name,
            } => self.add(minutes, energy, verb, name, out),
            ShellCommand::Dep { task, on } => self.dw.add_dependency(task, on).map_err(err),
            ShellCommand::Done(id) => self.dw.complete_task(id).map_err(err),
            ShellCommand::Remove(id) => self.dw.delete_task(id).map_err(err),
            ShellCommand::List => {
                self.list(out, false)?;
                Ok(())
            }
            ShellCommand::Eligible => {
                self.list(out, true)?;
                Ok(())
            }
            ShellCommand::Start(id) => self.dw.start_session(id).map_err(err),
            ShellCommand::Ritual(intention) => self.dw.confirm_ritual(intention).map_err(err),
            ShellCommand::Abandon => self.dw.abandon_session().map_err(err),
            ShellCommand::End => self.dw.end_session().map_err(err),
            ShellCommand::Close(review) => match self.dw.confirm_close(review) {
                Ok(closed) => {
                    writeln!(
                        out,
                        "closed: {} ({} min). accomplished: {}",
                        closed.task_name, closed.elapsed_minutes, closed.review.accomplished
                    )?;
                    Ok(())
                }
                Err(e) => Err(e.to_string()),
            },
            ShellCommand::Tick(n) => {
                for _ in 0..n {
                    self.dw.tick();
                }
                Ok(())
            }
            ShellCommand::Context(context) => {
                self.context = context;
                Ok(())
            }
            ShellCommand::Sample => {
                let context = self.context.clone();
                if self.dw.sample_context(&context).is_none() {
                    writeln!(out, "no nudge")?;
                }
                Ok(())
            }
            ShellCommand::Accept => match self.dw.accept_nudge() {
                Ok(Some(_)) => Ok(()),
                Ok(None) => {
                    writeln!(out, "nothing eligible to start")?;
                    Ok(())
                }
                Err(e) => Err(e.to_string()),
            },
            ShellCommand::Dismiss => self.dw.dismiss_nudge().map_err(err),
            ShellCommand::Interrupt => {
                self.dw.record_interruption();
                Ok(())
            }
            ShellCommand::Status => {
                self.status(out)?;
                Ok(())
            }
            ShellCommand::Stats => {
                self.stats(out)?;
                Ok(())
            }
            ShellCommand::Help => {
                writeln!(out, "{HELP}")?;
                Ok(())
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        };
        if let Err(message) = result {
            writeln!(out, "error: {message}")?;
        }
        self.render_events(out)?;
        Ok(Flow::Continue)
    }

    fn add(
        &mut self,
        minutes: Option<u32>,
        energy: EnergyLevel,
        verb: String,
        name: String,
        out: &mut impl Write,
    ) -> Result<(), String> {
        // The creation interface owns the duration bounds; the store does not.
        let bounds = &self.dw.config().tasks;
        let minutes = minutes.unwrap_or(bounds.default_duration_minutes);
        bounds.check_duration(minutes).map_err(|e| e.to_string())?;
        let id = self
            .dw
            .add_task(NewTask::new(name, verb, minutes, energy))
            .map_err(err)?;
        writeln!(out, "added task {id}").map_err(|e| e.to_string())?;
        Ok(())
    }

    fn list(&self, out: &mut impl Write, eligible_only: bool) -> io::Result<()> {
        let tasks: Vec<_> = if eligible_only {
            self.dw.eligible_tasks()
        } else {
            self.dw.tasks().collect()
        };
        if tasks.is_empty() {
            return writeln!(out, "no tasks");
        }
        for task in tasks {
            let mark = if task.completed {
                "x"
            } else if self.dw.is_eligible(task.id) {
                " "
            } else {
                "~"
            };
            let deps = if task.dependencies.is_empty() {
                String::new()
            } else {
                let ids: Vec<String> = task.dependencies.iter().map(|d| d.to_string()).collect();
                format!(" after {}", ids.join(","))
            };
            writeln!(
                out,
                "[{mark}] {} {} ({} min, {} energy){deps}",
                task.id,
                task.headline(),
                task.duration_minutes,
                task.energy
            )?;
        }
        Ok(())
    }

    fn status(&self, out: &mut impl Write) -> io::Result<()> {
        let session = self.dw.session();
        match (&session.phase, &session.task) {
            (SessionPhase::Idle, _) | (_, None) => writeln!(out, "idle")?,
            (phase, Some(task)) => writeln!(
                out,
                "{} {} {} ({:.0}%)",
                phase_label(*phase),
                task.headline(),
                format_remaining(session.remaining_secs),
                session.progress() * 100.0
            )?,
        }
        if let Some(nudge) = self.dw.pending_nudge() {
            writeln!(out, "nudge pending: {}", nudge.message)?;
        }
        Ok(())
    }

    fn stats(&self, out: &mut impl Write) -> io::Result<()> {
        let DailyStats {
            focus_minutes,
            completed_tasks,
            interruptions,
            streak_days,
        } = self.dw.stats();
        let goal = self.dw.config().stats.daily_focus_goal_minutes;
        writeln!(
            out,
            "focus {focus_minutes}/{goal} min ({:.0}%), sessions {completed_tasks}, interruptions {interruptions}, streak {streak_days} days",
            self.dw.stats().goal_progress(goal) * 100.0
        )
    }

    fn render_events(&mut self, out: &mut impl Write) -> io::Result<()> {
        for event in self.dw.drain_events() {
            match event {
                Event::SessionStarted {
                    task_id,
                    duration_secs,
                    ..
                } => writeln!(
                    out,
                    "session on task {task_id} ({}). plan & begin: ritual <intention> | <end condition>",
                    format_remaining(duration_secs)
                )?,
                Event::RitualConfirmed { .. } => writeln!(out, "deep focus: running")?,
                Event::SessionCompleted {
                    elapsed_minutes, ..
                } => writeln!(
                    out,
                    "session complete (+{elapsed_minutes} min). review & close: close <accomplished> | <blockers>"
                )?,
                Event::SessionAbandoned { task_id, .. } => {
                    writeln!(out, "session on task {task_id} abandoned")?
                }
                Event::NudgeTriggered { message, .. } => {
                    writeln!(out, "nudge: {message} (accept / dismiss)")?;
                    // Rendering it is what makes it shown.
                    if let Err(e) = self.dw.mark_nudge_shown() {
                        tracing::debug!(error = %e, "rendered nudge no longer pending");
                    }
                }
                Event::TaskCompleted { task_id, .. } => writeln!(out, "task {task_id} done")?,
                Event::TaskDeleted { task_id, .. } => writeln!(out, "task {task_id} deleted")?,
                _ => {}
            }
        }
        Ok(())
    }
}

fn phase_label(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle => "idle",
        SessionPhase::OpeningRitual => "ritual",
        SessionPhase::Running => "running",
        SessionPhase::ClosingRitual => "closing",
    }
}

fn err(e: deepwork_core::CoreError) -> String {
    e.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepwork_core::{Config, NudgeEngine, ScriptedRandom};

    fn shell(draws: &[f64]) -> Shell<ScriptedRandom> {
        let nudges = NudgeEngine::new(ScriptedRandom::new(draws.iter().copied()), 0.3);
        Shell::new(DeepWork::with_nudges(Config::default(), nudges))
    }

    fn run(shell: &mut Shell<ScriptedRandom>, lines: &[&str]) -> String {
        let mut out = Vec::new();
        for line in lines {
            shell.handle_line(line, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_add_with_multiword_name() {
        let cmd: ShellCommand = "add 45 high Write the release notes".parse().unwrap();
        assert_eq!(
            cmd,
            ShellCommand::Add {
                minutes: Some(45),
                energy: EnergyLevel::High,
                verb: "Write".into(),
                name: "the release notes".into(),
            }
        );
    }

    #[test]
    fn parses_pipe_separated_ritual_fields() {
        let cmd: ShellCommand = "ritual finish parser | tests pass".parse().unwrap();
        assert_eq!(
            cmd,
            ShellCommand::Ritual(Intention::new("finish parser", "tests pass"))
        );
        let cmd: ShellCommand = "close shipped it".parse().unwrap();
        assert_eq!(cmd, ShellCommand::Close(SessionReview::new("shipped it", "")));
    }

    #[test]
    fn parses_tick_counts_and_aliases() {
        assert_eq!("tick".parse::<ShellCommand>().unwrap(), ShellCommand::Tick(1));
        assert_eq!("tick 90".parse::<ShellCommand>().unwrap(), ShellCommand::Tick(90));
        assert_eq!("pause".parse::<ShellCommand>().unwrap(), ShellCommand::Abandon);
        assert!("tick many".parse::<ShellCommand>().is_err());
        assert!("frobnicate".parse::<ShellCommand>().is_err());
        assert!("start".parse::<ShellCommand>().is_err());
    }

    #[test]
    fn parses_context_snapshot() {
        let cmd: ShellCommand = "context busy erratic high Slack".parse().unwrap();
        assert_eq!(
            cmd,
            ShellCommand::Context(ContextSnapshot {
                active_app: "Slack".into(),
                input_cadence: InputCadence::Erratic,
                calendar_free: false,
                distraction: DistractionLevel::High,
            })
        );
        assert!("context maybe steady low".parse::<ShellCommand>().is_err());
    }

    #[test]
    fn add_without_minutes_uses_configured_default() {
        let cmd: ShellCommand = "add low Skim inbox".parse().unwrap();
        assert_eq!(
            cmd,
            ShellCommand::Add {
                minutes: None,
                energy: EnergyLevel::Low,
                verb: "Skim".into(),
                name: "inbox".into(),
            }
        );

        let mut config = Config::default();
        config.set("tasks.default_duration_minutes", "40").unwrap();
        let nudges = NudgeEngine::new(ScriptedRandom::new(Vec::<f64>::new()), 0.3);
        let mut sh = Shell::new(DeepWork::with_nudges(config, nudges));
        let out = run(&mut sh, &["add low Skim inbox", "list"]);
        assert!(out.contains("added task 1"));
        assert!(out.contains("Skim • inbox (40 min, low energy)"));
    }

    #[test]
    fn add_enforces_creation_bounds() {
        let mut sh = shell(&[]);
        let out = run(&mut sh, &["add 10 low Skim inbox", "add 30 low Skim inbox"]);
        assert!(out.contains("error: Duration 10 min is outside 20..=60 min"));
        assert!(out.contains("added task 1"));
        assert_eq!(sh.deep_work().tasks().count(), 1);
    }

    #[test]
    fn session_flow_through_shell() {
        let mut sh = shell(&[]);
        sh.seed_demo().unwrap();
        let out = run(
            &mut sh,
            &[
                "eligible",
                "start 2",
                "start 1",
                "ritual review the queue | queue empty",
                "tick 1799",
                "status",
                "tick",
                "close reviewed 4 PRs | none",
                "stats",
            ],
        );
        assert!(out.contains("1 Review • Review PRs"));
        assert!(out.contains("error: Validation error: Task 2 is not eligible to start"));
        assert!(out.contains("running Review • Review PRs 0:01"));
        assert!(out.contains("session complete (+30 min)"));
        assert!(out.contains("closed: Review PRs (30 min). accomplished: reviewed 4 PRs"));
        assert!(out.contains("focus 30/240 min"));
        assert!(out.contains("sessions 1, interruptions 0"));
    }

    #[test]
    fn errors_do_not_stop_the_shell() {
        let mut sh = shell(&[]);
        let mut out = Vec::new();
        assert_eq!(sh.handle_line("end", &mut out).unwrap(), Flow::Continue);
        assert_eq!(sh.handle_line("done 42", &mut out).unwrap(), Flow::Continue);
        assert_eq!(sh.handle_line("quit", &mut out).unwrap(), Flow::Quit);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("error: Cannot end while the session is idle"));
        assert!(out.contains("error: Task 42 not found"));
    }

    #[test]
    fn sampled_nudge_is_rendered_and_accepted() {
        let mut sh = shell(&[0.99, 0.0]);
        sh.seed_demo().unwrap();
        let out = run(&mut sh, &["sample", "status", "accept", "status"]);
        assert!(out.contains("nudge: Your calendar is free for the next hour."));
        assert!(out.contains("nudge pending:"));
        assert!(out.contains("session on task 1 (30:00)"));
        assert!(out.contains("ritual Review • Review PRs 30:00"));
    }

    #[test]
    fn busy_context_suppresses_sampler() {
        let mut sh = shell(&[0.99, 0.0]);
        let mut out = Vec::new();
        sh.handle_line("context busy steady low", &mut out).unwrap();
        sh.on_sample(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("nudge:"));
    }

    #[test]
    fn format_remaining_pads_seconds() {
        assert_eq!(format_remaining(1800), "30:00");
        assert_eq!(format_remaining(61), "1:01");
        assert_eq!(format_remaining(0), "0:00");
    }
}
