use flock_model::ModelError;
use thiserror::Error;

use crate::{activity::ActivityError, runtime::RuntimeError};

/// Failure taxonomy of engine operations.
///
/// Every runtime or model failure is converted into one of these variants at the
/// engine boundary; callers never see raw transport errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("unit not found: {0}")]
    UnitNotFound(String),

    #[error("unit already exists: {0}")]
    UnitExists(String),

    #[error("file '{path}' not found in unit '{unit}'")]
    FileNotFound { unit: String, path: String },

    #[error("runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("{op} timed out after {after_ms} ms")]
    Timeout { op: &'static str, after_ms: u64 },

    #[error("activity log error: {0}")]
    Activity(String),
}

impl CoreError {
    /// Stable snake_case tag for API payloads and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::ImageNotFound(_) => "image_not_found",
            CoreError::UnitNotFound(_) => "unit_not_found",
            CoreError::UnitExists(_) => "unit_exists",
            CoreError::FileNotFound { .. } => "file_not_found",
            CoreError::RuntimeUnavailable(_) => "runtime_unavailable",
            CoreError::Validation(_) => "validation_error",
            CoreError::Timeout { .. } => "timeout",
            CoreError::Activity(_) => "activity_log",
        }
    }
}

impl From<RuntimeError> for CoreError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::ImageNotFound(image) => CoreError::ImageNotFound(image),
            RuntimeError::UnitNotFound(name) => CoreError::UnitNotFound(name),
            RuntimeError::UnitExists(name) => CoreError::UnitExists(name),
            RuntimeError::FileNotFound { unit, path } => CoreError::FileNotFound { unit, path },
            RuntimeError::Unavailable(msg) => CoreError::RuntimeUnavailable(msg),
        }
    }
}

impl From<ModelError> for CoreError {
    fn from(e: ModelError) -> Self {
        CoreError::Validation(e.to_string())
    }
}

impl From<ActivityError> for CoreError {
    fn from(e: ActivityError) -> Self {
        CoreError::Activity(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_errors_keep_their_category() {
        let cases = [
            (RuntimeError::ImageNotFound("x".into()), "image_not_found"),
            (RuntimeError::UnitNotFound("x".into()), "unit_not_found"),
            (RuntimeError::UnitExists("x".into()), "unit_exists"),
            (RuntimeError::Unavailable("socket".into()), "runtime_unavailable"),
            (
                RuntimeError::FileNotFound {
                    unit: "u".into(),
                    path: "/p".into(),
                },
                "file_not_found",
            ),
        ];
        for (rt, kind) in cases {
            assert_eq!(CoreError::from(rt).kind(), kind);
        }
    }

    #[test]
    fn model_errors_become_validation() {
        let err = CoreError::from(ModelError::InvalidImage(String::new()));
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn timeout_message_names_the_call() {
        let err = CoreError::Timeout {
            op: "create_unit",
            after_ms: 250,
        };
        assert_eq!(err.to_string(), "create_unit timed out after 250 ms");
    }
}
