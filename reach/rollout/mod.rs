mod collector;
mod log;

use typed_builder::TypedBuilder;

use crate::env::{Env as EnvTrait, Observation};
use crate::error::EnvError;
use crate::policy::Policy;

pub use collector::{CollectError, Collector, Options as CollectorOptions, Payload};
pub use log::ObservationLog;

pub const DEFAULT_MAX_STEPS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub steps: usize,
    pub total_return: f32,
    pub reached_goal: bool,
    pub final_observation: Observation,
}

/// Owns an environment, the policy driving it and the log of observations
/// the episode produced.
#[derive(TypedBuilder)]
pub struct Orchestrator<Env, P>
where
    Env: EnvTrait,
    P: Policy,
{
    env: Env,
    policy: P,

    #[builder(setter(transform = |capacity: usize| ObservationLog::new(capacity)))]
    log: ObservationLog,

    #[builder(default = DEFAULT_MAX_STEPS)]
    max_steps: usize,
}

impl<Env, P> Orchestrator<Env, P>
where
    Env: EnvTrait,
    P: Policy,
{
    /// Runs one episode from a fresh reset until the environment reports
    /// `done` or `max_steps` steps were taken. The log is cleared first and
    /// receives the initial observation followed by one row per step.
    pub fn run_episode(&mut self) -> Result<EpisodeSummary, EnvError> {
        self.log.clear();

        let mut observation = self.env.reset();
        self.log.push(&observation);

        let mut summary = EpisodeSummary {
            steps: 0,
            total_return: 0.0,
            reached_goal: false,
            final_observation: observation,
        };

        let mut warned_full = false;
        while summary.steps < self.max_steps {
            let action = self.policy.act(&observation);
            let step = self.env.step(&action)?;
            summary.steps += 1;
            summary.total_return += step.reward;
            observation = step.observation;

            tracing::debug!(
                step = summary.steps,
                ?action,
                ?observation,
                reward = step.reward,
                done = step.done,
                "step"
            );

            if !self.log.push(&observation) && !warned_full {
                tracing::warn!(
                    capacity = self.log.capacity(),
                    "observation log is full, dropping further observations"
                );
                warned_full = true;
            }

            if step.done {
                summary.reached_goal = true;
                break;
            }
        }

        summary.final_observation = observation;
        Ok(summary)
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn log(&self) -> &ObservationLog {
        &self.log
    }

    pub fn into_parts(self) -> (Env, P, ObservationLog) {
        (self.env, self.policy, self.log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::GreedyPolicy;
    use crate::{GridConfig, GridEnvironment};

    #[derive(Clone)]
    struct Stand;

    impl Policy for Stand {
        fn act(&mut self, _observation: &Observation) -> crate::env::Action {
            [0.0; 3]
        }
    }

    #[test]
    fn greedy_episode_reaches_goal() {
        let env = GridEnvironment::new(
            GridConfig::default()
                .grid_size(10)
                .block_low(3.0)
                .block_high(6.0),
        )
        .unwrap();
        let policy = GreedyPolicy::for_env(&env);

        let mut orchestrator = Orchestrator::builder()
            .env(env)
            .policy(policy)
            .log(14)
            .build();

        let summary = orchestrator.run_episode().unwrap();
        assert_eq!(summary.steps, 9);
        assert!(summary.reached_goal);
        assert_eq!(summary.final_observation, [9.0; 3]);
        assert!((summary.total_return - (-43.0)).abs() < f32::EPSILON);

        let log = orchestrator.log();
        assert_eq!(log.len(), 10);
        assert_eq!(log.get(0), Some([0.0; 3]));
        assert_eq!(log.get(9), Some([9.0; 3]));
    }

    #[test]
    fn stops_at_max_steps() {
        let mut orchestrator = Orchestrator::builder()
            .env(GridEnvironment::default())
            .policy(Stand)
            .log(3)
            .max_steps(5)
            .build();

        let summary = orchestrator.run_episode().unwrap();
        assert_eq!(summary.steps, 5);
        assert!(!summary.reached_goal);
        assert!((summary.total_return - (-5.0)).abs() < f32::EPSILON);
        assert_eq!(orchestrator.log().len(), 3);
    }
}
