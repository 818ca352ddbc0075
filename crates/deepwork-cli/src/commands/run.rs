//! Interactive focus shell.
//!
//! A single-threaded reactor multiplexes three event sources: stdin command
//! lines, the one-second countdown ticker and the nudge sampler. Each event
//! is handled to completion before the next one is polled, so the core never
//! sees re-entrant calls.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use clap::Args;
use deepwork_core::{Config, DailyStats, DeepWork, RandomSource};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};

use crate::shell::{Flow, Shell};

#[derive(Args)]
pub struct RunArgs {
    /// Seed the sample tasks and counters
    #[arg(long)]
    demo: bool,
    /// Disable the wall-clock ticker and nudge sampler; use `tick` and
    /// `sample` instead
    #[arg(long)]
    manual_clock: bool,
    /// Fixed nudge RNG seed (overrides the config)
    #[arg(long)]
    seed: Option<u64>,
}

pub fn run(args: RunArgs, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_from(config_path)?;
    if args.seed.is_some() {
        config.nudge.seed = args.seed;
    }
    tracing::debug!(path = %config_path.display(), "config loaded");

    let mut dw = DeepWork::new(config);
    if args.demo {
        dw = dw.with_stats(DailyStats {
            focus_minutes: 127,
            completed_tasks: 3,
            interruptions: 2,
            streak_days: 5,
        });
    }
    let mut shell = Shell::new(dw);
    if args.demo {
        shell.seed_demo()?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let result = runtime.block_on(reactor(shell, args.manual_clock));
    // A pending blocking stdin read cannot be cancelled; don't wait for it.
    runtime.shutdown_background();
    result
}

async fn reactor<R: RandomSource>(
    mut shell: Shell<R>,
    manual_clock: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = shell.deep_work().config().clone();
    let sampling = !manual_clock && config.nudge.enabled;

    let mut ticker = interval(Duration::from_millis(config.session.tick_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of an interval fires immediately.
    ticker.tick().await;

    let period = Duration::from_secs(config.nudge.sample_interval_secs);
    let start = Instant::now()
        .checked_add(period)
        .ok_or("nudge.sample_interval_secs is too large")?;
    let mut sampler = interval_at(start, period);
    sampler.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = std::io::stdout();
    writeln!(out, "DeepWork ready. Type 'help' for commands.")?;
    out.flush()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if shell.handle_line(&line, &mut out)? == Flow::Quit {
                    break;
                }
            }
            _ = ticker.tick(), if !manual_clock => shell.on_tick(&mut out)?,
            _ = sampler.tick(), if sampling => shell.on_sample(&mut out)?,
        }
        out.flush()?;
    }
    tracing::info!("shell closed");
    Ok(())
}
