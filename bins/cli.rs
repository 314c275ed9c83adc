use clap::{Args, ValueEnum};
use reach::policy::{GreedyPolicy, Policy, RandomPolicy};
use reach::{Action, GridConfig, GridEnvironment, Observation};

#[derive(Args, Debug)]
pub struct GridArgs {
    /// Extent of the grid along each axis
    #[arg(long, default_value_t = 10)]
    pub grid_size: u32,

    /// Lower corner of the penalised block, on every axis
    #[arg(long, default_value_t = 3.0)]
    pub block_low: f32,

    /// Upper corner of the penalised block, on every axis
    #[arg(long, default_value_t = 6.0)]
    pub block_high: f32,

    /// Absolute tolerance of the goal test (0 means exact)
    #[arg(long, default_value_t = 0.0)]
    pub goal_tolerance: f32,
}

impl GridArgs {
    pub fn build_env(&self) -> anyhow::Result<GridEnvironment> {
        let config = GridConfig::default()
            .grid_size(self.grid_size)
            .block_low(self.block_low)
            .block_high(self.block_high)
            .goal_tolerance(self.goal_tolerance);

        Ok(GridEnvironment::new(config)?)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PolicyKind {
    Greedy,
    Random,
}

/// Either scripted policy, picked on the command line.
#[derive(Debug, Clone)]
pub enum AnyPolicy {
    Greedy(GreedyPolicy),
    Random(RandomPolicy),
}

impl AnyPolicy {
    pub fn new(kind: PolicyKind, env: &GridEnvironment, seed: u64) -> Self {
        match kind {
            PolicyKind::Greedy => Self::Greedy(GreedyPolicy::for_env(env)),
            PolicyKind::Random => Self::Random(RandomPolicy::for_env(env, seed)),
        }
    }
}

impl Policy for AnyPolicy {
    fn act(&mut self, observation: &Observation) -> Action {
        match self {
            Self::Greedy(policy) => policy.act(observation),
            Self::Random(policy) => policy.act(observation),
        }
    }

    fn reseed(&mut self, seed: u64) {
        match self {
            Self::Greedy(policy) => policy.reseed(seed),
            Self::Random(policy) => policy.reseed(seed),
        }
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
