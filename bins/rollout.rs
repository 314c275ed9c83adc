//! Drives the 3-D reach-the-corner grid with a scripted policy for a single
//! episode, logging every step, and saves the visited observations as a
//! fixed-size `.npy` array.

mod cli;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use reach::rollout::{Orchestrator, DEFAULT_MAX_STEPS};
use reach::{check_env, panic_hook, GridEnvironment};

#[derive(Parser, Debug)]
#[command(about = "Run one episode and export the visited observations")]
struct Cli {
    #[command(flatten)]
    grid: cli::GridArgs,

    #[arg(long, value_enum, default_value_t = cli::PolicyKind::Greedy)]
    policy: cli::PolicyKind,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Number of rows in the exported observation array
    #[arg(long, default_value_t = 14)]
    log_capacity: usize,

    #[arg(long, default_value = "3d_grid_obstacle.npy")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    panic_hook::init();

    let args = Cli::parse();

    check_env(&mut GridEnvironment::default()).context("default environment failed the check")?;

    let env = args.grid.build_env()?;
    let policy = cli::AnyPolicy::new(args.policy, &env, args.seed);

    let mut orchestrator = Orchestrator::builder()
        .env(env)
        .policy(policy)
        .log(args.log_capacity)
        .max_steps(args.max_steps)
        .build();

    let summary = orchestrator.run_episode()?;
    if summary.reached_goal {
        tracing::info!(
            steps = summary.steps,
            total_return = summary.total_return,
            "goal reached"
        );
    } else {
        tracing::info!(
            steps = summary.steps,
            total_return = summary.total_return,
            position = ?summary.final_observation,
            "episode cut off before reaching the goal"
        );
    }

    orchestrator
        .log()
        .export(&args.output)
        .with_context(|| format!("failed to export observations to {}", args.output.display()))?;
    tracing::info!(
        path = %args.output.display(),
        rows = orchestrator.log().len(),
        "observations saved"
    );

    Ok(())
}
