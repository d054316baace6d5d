use std::{borrow::Borrow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{MAX_UNIT_NAME_LEN, ModelError};

/// Human-readable, runtime-unique identifier of a unit.
///
/// Accepted shape: `[A-Za-z0-9][A-Za-z0-9_.-]*`, at most [`MAX_UNIT_NAME_LEN`] bytes.
/// The name is immutable once a unit is created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitName(String);

impl UnitName {
    /// Validate and wrap a unit name.
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        Self::try_from(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build `<self>-<suffix>`; the suffix is trusted to be name-safe.
    pub fn suffixed(&self, suffix: impl fmt::Display) -> Result<Self, ModelError> {
        Self::new(format!("{}-{}", self.0, suffix))
    }
}

fn check(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err("name is empty");
    };
    if name.len() > MAX_UNIT_NAME_LEN {
        return Err("name is too long");
    }
    if !first.is_ascii_alphanumeric() {
        return Err("name must start with an ASCII letter or digit");
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        return Err("name may only contain ASCII letters, digits, '_', '.' and '-'");
    }
    Ok(())
}

impl TryFrom<String> for UnitName {
    type Error = ModelError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        match check(&name) {
            Ok(()) => Ok(Self(name)),
            Err(reason) => Err(ModelError::InvalidUnitName { name, reason }),
        }
    }
}

impl TryFrom<&str> for UnitName {
    type Error = ModelError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::try_from(name.to_owned())
    }
}

impl FromStr for UnitName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl From<UnitName> for String {
    fn from(name: UnitName) -> Self {
        name.0
    }
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for UnitName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
