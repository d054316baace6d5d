use flock_core::RuntimeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid runtime configuration: {0}")]
    InvalidRuntimeConfig(String),

    #[error("unexpected runtime output: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ExecError> for RuntimeError {
    fn from(e: ExecError) -> Self {
        RuntimeError::Unavailable(e.to_string())
    }
}
