use thiserror::Error;

/// Errors reported by runtime adapters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("unit not found: {0}")]
    UnitNotFound(String),

    #[error("unit name already in use: {0}")]
    UnitExists(String),

    #[error("file '{path}' not found in unit '{unit}'")]
    FileNotFound { unit: String, path: String },

    #[error("runtime unavailable: {0}")]
    Unavailable(String),
}

impl RuntimeError {
    /// Label value for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::ImageNotFound(_) => "image_not_found",
            RuntimeError::UnitNotFound(_) => "unit_not_found",
            RuntimeError::UnitExists(_) => "unit_exists",
            RuntimeError::FileNotFound { .. } => "file_not_found",
            RuntimeError::Unavailable(_) => "unavailable",
        }
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        RuntimeError::Unavailable(e.to_string())
    }
}
