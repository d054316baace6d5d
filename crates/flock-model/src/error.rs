use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid unit name '{name}': {reason}")]
    InvalidUnitName { name: String, reason: &'static str },

    #[error("invalid image reference '{0}'")]
    InvalidImage(String),

    #[error("unknown unit status: {0}")]
    UnknownStatus(String),

    #[error("unknown remainder policy: {0}")]
    UnknownRemainderPolicy(String),

    #[error("invalid partitioning: {0}")]
    InvalidPartitioning(String),

    #[error("malformed statistics output: {0}")]
    MalformedStats(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
