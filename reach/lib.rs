//! A continuous 3-D grid in which an agent travels from the origin corner to
//! the opposite corner while avoiding a penalised block, exposed through the
//! [`Env`] lifecycle contract, plus the rollout plumbing that drives it.

pub mod config;
pub mod env;
pub mod error;
pub mod panic_hook;
pub mod policy;
pub mod rollout;

pub use config::GridConfig;
pub use env::{check_env, Action, BoxSpace, Env, GridEnvironment, Observation, Step};
pub use error::EnvError;
