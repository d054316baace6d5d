use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Identifier of the template a unit is created from (e.g. `python:3.8`).
///
/// Only shape is checked here: non-empty and free of whitespace.
/// Whether the runtime knows the image is decided at create time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(image: impl Into<String>) -> Result<Self, ModelError> {
        Self::try_from(image.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ImageRef {
    type Error = ModelError;

    fn try_from(image: String) -> Result<Self, Self::Error> {
        if image.is_empty() || image.chars().any(char::is_whitespace) {
            return Err(ModelError::InvalidImage(image));
        }
        Ok(Self(image))
    }
}

impl FromStr for ImageRef {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        image.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
