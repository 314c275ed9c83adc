use crate::config::GridConfig;
use crate::error::EnvError;

use super::{Action, BoxSpace, Env, Info, Observation, Step, DIMS};

pub const GOAL_REWARD: f32 = 1.0;
pub const OBSTACLE_REWARD: f32 = -10.0;
pub const STEP_REWARD: f32 = -1.0;

/// The only render mode the environment accepts.
pub const CONSOLE_MODE: &str = "console";

/// An agent moving through a continuous `grid_size`³ cube from the origin to
/// the opposite corner. Entering the block cuboid is penalised.
#[must_use]
#[derive(Debug, Clone)]
pub struct GridEnvironment {
    config: GridConfig,
    agent_position: Observation,
    action_space: BoxSpace,
    observation_space: BoxSpace,
}

impl Default for GridEnvironment {
    fn default() -> Self {
        Self::with_valid_config(GridConfig::default())
    }
}

impl GridEnvironment {
    pub fn new(config: GridConfig) -> Result<Self, EnvError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: GridConfig) -> Self {
        Self {
            action_space: BoxSpace::uniform(&[DIMS], config.action_low, config.action_high),
            observation_space: BoxSpace::uniform(&[DIMS], 0.0, config.grid_size as f32),
            agent_position: [0.0; DIMS],
            config,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[must_use]
    pub fn position(&self) -> Observation {
        self.agent_position
    }

    #[must_use]
    pub fn goal(&self) -> Observation {
        [self.config.max_coord(); DIMS]
    }

    fn validate_action(&self, action: &Action) -> Result<(), EnvError> {
        let bounds = self.config.action_low..=self.config.action_high;
        if action.iter().all(|a| bounds.contains(a)) {
            Ok(())
        } else {
            Err(EnvError::InvalidAction {
                action: action.to_vec(),
            })
        }
    }

    fn at_goal(&self) -> bool {
        let goal = self.config.max_coord();
        self.agent_position
            .iter()
            .all(|&p| (p - goal).abs() <= self.config.goal_tolerance)
    }

    fn in_block(&self) -> bool {
        let block = self.config.block_low..=self.config.block_high;
        self.agent_position.iter().all(|p| block.contains(p))
    }

    fn reward(&self) -> f32 {
        if self.at_goal() {
            GOAL_REWARD
        } else if self.in_block() {
            OBSTACLE_REWARD
        } else {
            STEP_REWARD
        }
    }
}

impl Env for GridEnvironment {
    fn action_space(&self) -> &BoxSpace {
        &self.action_space
    }

    fn observation_space(&self) -> &BoxSpace {
        &self.observation_space
    }

    fn reset(&mut self) -> Observation {
        self.agent_position = [0.0; DIMS];
        self.agent_position
    }

    fn step(&mut self, action: &Action) -> Result<Step, EnvError> {
        // Rejected actions must not move the agent.
        self.validate_action(action).map_err(|err| {
            tracing::warn!(?action, "rejecting out-of-bounds action");
            err
        })?;

        let max_coord = self.config.max_coord();
        for (pos, delta) in self.agent_position.iter_mut().zip(action) {
            *pos = (*pos + delta).clamp(0.0, max_coord);
        }

        let done = self.at_goal();
        let reward = self.reward();

        tracing::trace!(position = ?self.agent_position, reward, done, "step");

        Ok(Step {
            observation: self.agent_position,
            reward,
            done,
            info: Info::new(),
        })
    }

    fn render(&self, mode: &str) -> Result<(), EnvError> {
        if mode != CONSOLE_MODE {
            return Err(EnvError::UnsupportedMode {
                mode: mode.to_owned(),
            });
        }
        tracing::trace!(position = ?self.agent_position, "render");
        Ok(())
    }

    fn close(&mut self) {}
}
