use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ImageRef, ModelError, UnitName};

/// Last observed state of a unit.
///
/// ```text
/// NonExistent -> Running -> Stopped -> Removed
///                   \__________________/
///                     (forced removal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Running,
    Stopped,
    Removed,
}

impl UnitStatus {
    /// Returns the status as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Running => "running",
            UnitStatus::Stopped => "stopped",
            UnitStatus::Removed => "removed",
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, UnitStatus::Running)
    }
}

impl FromStr for UnitStatus {
    type Err = ModelError;

    /// Accepts both canonical names and the raw states reported by container runtimes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" | "restarting" | "paused" => Ok(UnitStatus::Running),
            "stopped" | "created" | "exited" | "dead" => Ok(UnitStatus::Stopped),
            "removed" | "removing" => Ok(UnitStatus::Removed),
            _ => Err(ModelError::UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One isolated compute unit as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: UnitName,
    pub image: ImageRef,
    pub status: UnitStatus,
    /// Runtime-assigned identifier, when the runtime exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Unit {
    pub fn new(name: UnitName, image: ImageRef, status: UnitStatus) -> Self {
        Self {
            name,
            image,
            status,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Return a copy of this unit carrying a different status.
    pub fn with_status(mut self, status: UnitStatus) -> Self {
        self.status = status;
        self
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.image, self.status)
    }
}

/// Which units a listing should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListScope {
    /// Only running units (the active cluster view).
    #[default]
    Active,
    /// Every unit the runtime still knows about, stopped ones included.
    All,
}

impl ListScope {
    #[inline]
    pub fn include_stopped(&self) -> bool {
        matches!(self, ListScope::All)
    }
}

impl From<bool> for ListScope {
    fn from(all: bool) -> Self {
        if all { ListScope::All } else { ListScope::Active }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_runtime_states() {
        let cases = [
            ("running", UnitStatus::Running),
            ("Paused", UnitStatus::Running),
            ("exited", UnitStatus::Stopped),
            ("created", UnitStatus::Stopped),
            ("dead", UnitStatus::Stopped),
            ("removing", UnitStatus::Removed),
        ];
        for (raw, want) in cases {
            assert_eq!(raw.parse::<UnitStatus>().unwrap(), want, "raw = {raw}");
        }
        assert!("zombie".parse::<UnitStatus>().is_err());
    }

    #[test]
    fn display_matches_listing_shape() {
        let unit = Unit::new(
            UnitName::new("web-1").unwrap(),
            ImageRef::new("python:3.8").unwrap(),
            UnitStatus::Stopped,
        );
        assert_eq!(unit.to_string(), "web-1:python:3.8:stopped");
    }

    #[test]
    fn serde_uses_lowercase_status() {
        let unit = Unit::new(
            UnitName::new("web-1").unwrap(),
            ImageRef::new("alpine").unwrap(),
            UnitStatus::Running,
        );
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["status"], "running");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn list_scope_from_bool() {
        assert_eq!(ListScope::from(true), ListScope::All);
        assert_eq!(ListScope::from(false), ListScope::Active);
        assert!(!ListScope::default().include_stopped());
    }
}
