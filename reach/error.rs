use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("received invalid action={action:?} which is not part of the action space")]
    InvalidAction { action: Vec<f32> },
    #[error("unsupported render mode: {mode}")]
    UnsupportedMode { mode: String },
    #[error("invalid grid config: {0}")]
    InvalidConfig(String),
}
