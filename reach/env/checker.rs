//! Structural sanity checks run against an environment before it is handed to
//! a rollout or training loop.

use thiserror::Error;

use crate::error::EnvError;

use super::{Action, BoxSpace, Env, Observation, CONSOLE_MODE, DIMS};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{name} space is malformed: {reason}")]
    MalformedSpace { name: &'static str, reason: String },
    #[error("observation {observation:?} returned by {stage} is outside the observation space")]
    ObservationOutOfSpace {
        stage: &'static str,
        observation: Observation,
    },
    #[error("non-finite reward {reward} returned by step")]
    NonFiniteReward { reward: f32 },
    #[error(transparent)]
    Env(#[from] EnvError),
}

fn check_space(name: &'static str, space: &BoxSpace) -> Result<(), CheckError> {
    let malformed = |reason: String| Err(CheckError::MalformedSpace { name, reason });

    if space.shape() != [DIMS] {
        return malformed(format!("expected shape [{DIMS}], got {:?}", space.shape()));
    }
    if space.low.len() != DIMS || space.high.len() != DIMS {
        return malformed("bounds do not match the shape".to_owned());
    }
    if let Some(i) = (0..DIMS).find(|&i| !(space.low[i] <= space.high[i])) {
        return malformed(format!(
            "low ({}) is not below high ({}) on axis {i}",
            space.low[i], space.high[i]
        ));
    }

    Ok(())
}

fn to_action(values: &[f32]) -> Action {
    let mut action = [0.0; DIMS];
    action.copy_from_slice(&values[..DIMS]);
    action
}

/// Runs the environment through one short lifecycle and reports the first
/// contract violation. The environment is left reset and closed.
pub fn check_env<E>(env: &mut E) -> Result<(), CheckError>
where
    E: Env,
{
    check_space("action", env.action_space())?;
    check_space("observation", env.observation_space())?;

    let action_space = env.action_space().clone();
    let observation_space = env.observation_space().clone();

    if action_space.low.iter().any(|&l| (l + 1.0).abs() > f32::EPSILON)
        || action_space.high.iter().any(|&h| (h - 1.0).abs() > f32::EPSILON)
    {
        tracing::warn!(
            low = ?action_space.low,
            high = ?action_space.high,
            "action space is not normalized to [-1, 1]"
        );
    }

    let in_space = |stage: &'static str, observation: Observation| {
        if observation_space.contains(&observation) {
            Ok(())
        } else {
            Err(CheckError::ObservationOutOfSpace { stage, observation })
        }
    };

    in_space("reset", env.reset())?;

    let probes = [
        action_space.midpoint(),
        action_space.high.clone(),
        action_space.low.clone(),
    ];
    for probe in &probes {
        let step = env.step(&to_action(probe))?;
        in_space("step", step.observation)?;
        if !step.reward.is_finite() {
            return Err(CheckError::NonFiniteReward {
                reward: step.reward,
            });
        }
    }

    env.render(CONSOLE_MODE)?;
    in_space("reset", env.reset())?;
    env.close();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::env::{GridEnvironment, Step};

    #[test]
    fn default_env_passes() {
        let mut env = GridEnvironment::default();
        check_env(&mut env).unwrap();
        assert_eq!(env.position(), [0.0; 3]);
    }

    #[test]
    fn wide_action_bounds_only_warn() {
        let config = GridConfig::default().action_low(-2.0).action_high(2.0);
        let mut env = GridEnvironment::new(config).unwrap();
        assert!(check_env(&mut env).is_ok());
    }

    #[derive(Clone)]
    struct Escaping {
        inner: GridEnvironment,
    }

    impl Env for Escaping {
        fn action_space(&self) -> &BoxSpace {
            self.inner.action_space()
        }

        fn observation_space(&self) -> &BoxSpace {
            self.inner.observation_space()
        }

        fn reset(&mut self) -> Observation {
            self.inner.reset()
        }

        fn step(&mut self, action: &Action) -> Result<Step, EnvError> {
            let mut step = self.inner.step(action)?;
            step.observation[0] = -5.0;
            Ok(step)
        }

        fn render(&self, mode: &str) -> Result<(), EnvError> {
            self.inner.render(mode)
        }

        fn close(&mut self) {}
    }

    #[test]
    fn escaping_observation_is_reported() {
        let mut env = Escaping {
            inner: GridEnvironment::default(),
        };
        let err = check_env(&mut env).unwrap_err();
        assert!(matches!(
            err,
            CheckError::ObservationOutOfSpace { stage: "step", .. }
        ));
    }
}
