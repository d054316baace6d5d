use std::{
    fmt,
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use flock_core::{CoreError, EngineConfig};
use flock_exec::{ExecError, docker::DockerConfig};
use flock_observe::{DEFAULT_ACTIVITY_LOG, LoggerConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid engine config: {0}")]
    Engine(#[from] CoreError),

    #[error("invalid docker config: {0}")]
    Docker(#[from] ExecError),
}

/// Container runtime backing the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    #[default]
    Docker,
    /// In-process runtime; units are simulated.
    Memory,
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeKind::Docker => f.write_str(flock_exec::RUNTIME_DOCKER),
            RuntimeKind::Memory => f.write_str(flock_exec::RUNTIME_MEMORY),
        }
    }
}

/// Agent configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Address of the HTTP API.
    pub listen: SocketAddr,
    pub runtime: RuntimeKind,
    /// File the activity log is appended to.
    pub activity_log: PathBuf,
    pub logger: LoggerConfig,
    pub engine: EngineConfig,
    pub docker: DockerConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            runtime: RuntimeKind::default(),
            activity_log: PathBuf::from(DEFAULT_ACTIVITY_LOG),
            logger: LoggerConfig::default(),
            engine: EngineConfig::default(),
            docker: DockerConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Load from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(raw)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.runtime == RuntimeKind::Docker {
            self.docker.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flock_model::RemainderPolicy;

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = AgentConfig::parse("").unwrap();
        assert_eq!(cfg.listen.port(), DEFAULT_PORT);
        assert_eq!(cfg.runtime, RuntimeKind::Docker);
        assert_eq!(cfg.activity_log, PathBuf::from("log.txt"));
        assert_eq!(cfg.engine.max_partitions, 64);
        cfg.validate().unwrap();
    }

    #[test]
    fn nested_sections_override_defaults() {
        let cfg = AgentConfig::parse(
            r#"
            listen = "0.0.0.0:9000"
            runtime = "memory"
            activity_log = "/var/log/flock/activity.log"

            [engine]
            max_partitions = 8
            remainder = "last_absorbs"

            [engine.workload]
            image = "python:3.11"

            [docker]
            host = "unix:///run/docker.sock"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.listen.port(), 9000);
        assert_eq!(cfg.runtime, RuntimeKind::Memory);
        assert_eq!(cfg.engine.max_partitions, 8);
        assert_eq!(cfg.engine.remainder, RemainderPolicy::LastAbsorbs);
        assert_eq!(cfg.engine.workload.image, "python:3.11");
        assert_eq!(cfg.engine.workload.unit_prefix, "partition");
        assert_eq!(cfg.docker.host.as_deref(), Some("unix:///run/docker.sock"));
    }

    #[test]
    fn unknown_runtime_is_a_parse_error() {
        let err = AgentConfig::parse(r#"runtime = "podman""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_engine_settings_fail_validation() {
        let cfg = AgentConfig::parse("[engine]\nmax_partitions = 0\n").unwrap();
        assert!(matches!(cfg.validate(), Err(ConfigError::Engine(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "runtime = \"memory\"").unwrap();

        let cfg = AgentConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.runtime, RuntimeKind::Memory);

        let missing = AgentConfig::load(Some(Path::new("/nonexistent/flock.toml")));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
