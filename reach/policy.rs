use rand::{rngs::StdRng, SeedableRng};

use crate::env::{Action, BoxSpace, Env as EnvTrait, GridEnvironment, Observation, DIMS};
use crate::error::EnvError;

/// Maps observations to actions. Implementations are cloned into every
/// collecting thread, so each clone must be independent.
pub trait Policy: Clone + Send + 'static {
    fn act(&mut self, observation: &Observation) -> Action;

    /// Called on per-thread clones so stochastic policies do not share a
    /// random stream.
    fn reseed(&mut self, _seed: u64) {}
}

/// Heads straight for the goal corner, taking the largest step the action
/// bounds allow on each axis.
#[must_use]
#[derive(Debug, Clone, Copy)]
pub struct GreedyPolicy {
    goal: f32,
    action_low: f32,
    action_high: f32,
}

impl GreedyPolicy {
    pub fn new(goal: f32, action_low: f32, action_high: f32) -> Self {
        Self {
            goal,
            action_low,
            action_high,
        }
    }

    pub fn for_env(env: &GridEnvironment) -> Self {
        let config = env.config();
        Self::new(config.max_coord(), config.action_low, config.action_high)
    }
}

impl Policy for GreedyPolicy {
    fn act(&mut self, observation: &Observation) -> Action {
        let mut action = [0.0; DIMS];
        for (a, &o) in action.iter_mut().zip(observation) {
            *a = (self.goal - o).clamp(self.action_low, self.action_high);
        }
        action
    }
}

/// Samples uniformly from the action space.
#[must_use]
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    space: BoxSpace,
    rng: StdRng,
}

impl RandomPolicy {
    /// Fails when `space` does not have exactly one element per axis.
    pub fn new(space: BoxSpace, seed: u64) -> Result<Self, EnvError> {
        if space.len() != DIMS {
            return Err(EnvError::InvalidConfig(format!(
                "action space has {} elements, expected {DIMS}",
                space.len()
            )));
        }

        Ok(Self {
            space,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn for_env(env: &GridEnvironment, seed: u64) -> Self {
        Self {
            space: env.action_space().clone(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &Observation) -> Action {
        let mut action = [0.0; DIMS];
        action.copy_from_slice(&self.space.sample(&mut self.rng)[..DIMS]);
        action
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Average undiscounted return of `policy` over `episode_count` episodes, each
/// cut off after `max_steps` steps.
pub fn evaluate_avg_return<Env, P>(
    policy: &mut P,
    env: &mut Env,
    episode_count: usize,
    max_steps: usize,
) -> Result<f64, EnvError>
where
    Env: EnvTrait,
    P: Policy,
{
    if episode_count == 0 {
        return Ok(0.0);
    }

    let mut total_return = 0.0;
    for _ in 0..episode_count {
        let mut observation = env.reset();

        for _ in 0..max_steps {
            let action = policy.act(&observation);
            let step = env.step(&action)?;
            total_return += f64::from(step.reward);
            observation = step.observation;

            if step.done {
                break;
            }
        }
    }

    Ok(total_return / episode_count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GridConfig, GridEnvironment};

    #[test]
    fn greedy_steps_are_bounded() {
        let mut policy = GreedyPolicy::new(9.0, -1.0, 1.0);
        assert_eq!(policy.act(&[0.0, 8.5, 9.0]), [1.0, 0.5, 0.0]);
    }

    #[test]
    fn greedy_return_on_default_grid() {
        let mut env = GridEnvironment::default();
        let mut policy = GreedyPolicy::for_env(&env);

        // (1,1,1) and (2,2,2) sit in the block, (3,3,3) is the goal.
        let avg = evaluate_avg_return(&mut policy, &mut env, 3, 100).unwrap();
        assert!((avg - (-19.0)).abs() < 1e-9);
    }

    #[test]
    fn random_policy_is_reproducible() {
        let env = GridEnvironment::new(GridConfig::default().grid_size(10)).unwrap();
        let space = env.action_space().clone();

        let mut a = RandomPolicy::new(space.clone(), 11).unwrap();
        let mut b = RandomPolicy::for_env(&env, 11);
        for _ in 0..10 {
            let action = a.act(&[0.0; 3]);
            assert_eq!(action, b.act(&[0.0; 3]));
            assert!(space.contains(&action));
        }

        b.reseed(12);
        let mut c = RandomPolicy::new(space, 12).unwrap();
        assert_eq!(b.act(&[0.0; 3]), c.act(&[0.0; 3]));
    }

    #[test]
    fn random_policy_needs_three_axes() {
        let flat = BoxSpace::uniform(&[2], -1.0, 1.0);
        assert!(matches!(
            RandomPolicy::new(flat, 0),
            Err(EnvError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_episodes_average_to_zero() {
        let mut env = GridEnvironment::default();
        let mut policy = GreedyPolicy::for_env(&env);
        assert!(evaluate_avg_return(&mut policy, &mut env, 0, 10).unwrap().abs() < f64::EPSILON);
    }
}
