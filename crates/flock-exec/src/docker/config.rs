use serde::{Deserialize, Serialize};

use crate::ExecError;

/// Environment variable overriding the docker binary (e.g. `podman`).
pub const DOCKER_CMD_ENV: &str = "FLOCK_DOCKER_CMD";

/// How the docker CLI is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Binary to invoke. [`DOCKER_CMD_ENV`] takes precedence when set.
    pub command: String,
    /// Daemon address passed as `-H`.
    pub host: Option<String>,
    /// Allow `docker run` to pull missing images instead of failing fast.
    pub pull: bool,
    /// Shell used to run command strings inside units.
    pub shell: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            command: "docker".into(),
            host: None,
            pull: false,
            shell: "sh".into(),
        }
    }
}

impl DockerConfig {
    /// Binary to invoke after applying the environment override.
    pub fn resolved_command(&self) -> String {
        std::env::var(DOCKER_CMD_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.command.clone())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.command.trim().is_empty() {
            return Err(ExecError::InvalidRuntimeConfig(
                "docker.command cannot be empty".into(),
            ));
        }
        if self.shell.trim().is_empty() {
            return Err(ExecError::InvalidRuntimeConfig(
                "docker.shell cannot be empty".into(),
            ));
        }
        if let Some(host) = &self.host {
            if host.trim().is_empty() {
                return Err(ExecError::InvalidRuntimeConfig(
                    "docker.host cannot be blank (omit it to use the default socket)".into(),
                ));
            }
        }
        Ok(())
    }
}
