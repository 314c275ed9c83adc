//! Collects rollouts of a scripted policy on the 3-D reach-the-corner grid
//! across several threads, each owning its own environment, and reports
//! per-round statistics.

mod cli;

use clap::Parser;
use reach::policy::evaluate_avg_return;
use reach::rollout::{Collector, CollectorOptions, DEFAULT_MAX_STEPS};
use reach::{check_env, panic_hook};
use tch::Device;

const EVAL_EPISODE_COUNT: usize = 10;

#[derive(Parser, Debug)]
#[command(about = "Collect transitions in parallel and report statistics")]
struct Cli {
    #[command(flatten)]
    grid: cli::GridArgs,

    #[arg(long, value_enum, default_value_t = cli::PolicyKind::Random)]
    policy: cli::PolicyKind,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Must divide --num-steps
    #[arg(long, default_value_t = 5)]
    num_threads: usize,

    /// Transitions gathered per round, across all threads
    #[arg(long, default_value_t = 250)]
    num_steps: usize,

    #[arg(long, default_value_t = 20)]
    rounds: usize,
}

fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    panic_hook::init();

    let args = Cli::parse();
    anyhow::ensure!(
        args.num_threads > 0 && args.num_steps % args.num_threads == 0,
        "--num-steps ({}) must be a multiple of --num-threads ({})",
        args.num_steps,
        args.num_threads
    );

    let mut env = args.grid.build_env()?;
    check_env(&mut env)?;

    let mut policy = cli::AnyPolicy::new(args.policy, &env, args.seed);

    let collector = Collector::new(CollectorOptions {
        device: Device::Cpu,
        env: &env,
        policy: &policy,
        seed: args.seed,
        num_steps: args.num_steps,
        num_threads: args.num_threads,
    });

    for round in 1..=args.rounds {
        let payload = collector.collect()?;
        tracing::info!(
            round,
            mean_reward = payload.mean_reward(),
            completed_episodes = payload.completed_episodes(),
            "collected {} transitions",
            payload.num_steps()
        );
    }

    let avg_return =
        evaluate_avg_return(&mut policy, &mut env, EVAL_EPISODE_COUNT, DEFAULT_MAX_STEPS)?;
    tracing::info!(avg_return, "average return over {EVAL_EPISODE_COUNT} episodes");

    Ok(())
}
