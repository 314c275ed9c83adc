use std::collections::BTreeMap;

use crate::error::EnvError;

mod checker;
mod grid;
mod space;

/// Number of axes of the grid, and length of observations and actions.
pub const DIMS: usize = 3;

pub type Observation = [f32; DIMS];
pub type Action = [f32; DIMS];

/// Auxiliary per-step diagnostics. Always empty for the grid environment.
pub type Info = BTreeMap<String, f32>;

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub observation: Observation,
    pub reward: f32,
    pub done: bool,
    pub info: Info,
}

/// Lifecycle contract an environment exposes to rollout and training loops.
pub trait Env: Clone + Send + 'static {
    fn action_space(&self) -> &BoxSpace;
    fn observation_space(&self) -> &BoxSpace;
    fn reset(&mut self) -> Observation;
    fn step(&mut self, action: &Action) -> Result<Step, EnvError>;
    fn render(&self, mode: &str) -> Result<(), EnvError>;
    fn close(&mut self);
}

pub use checker::{check_env, CheckError};
pub use grid::{GridEnvironment, CONSOLE_MODE, GOAL_REWARD, OBSTACLE_REWARD, STEP_REWARD};
pub use space::BoxSpace;
