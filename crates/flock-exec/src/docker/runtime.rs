use std::process::{Output, Stdio};

use async_trait::async_trait;
use flock_core::{RuntimeClient, RuntimeError};
use flock_model::{ExecOutput, ImageRef, Unit, UnitName, UnitStatus};
use tokio::process::Command;
use tracing::{debug, trace};

use super::{
    DockerConfig, args,
    parse::{self, Target},
};
use crate::{ExecError, RUNTIME_DOCKER};

/// [`RuntimeClient`] driving containers through the docker CLI.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    config: DockerConfig,
    binary: String,
}

impl DockerRuntime {
    pub fn new(config: DockerConfig) -> Result<Self, ExecError> {
        config.validate()?;
        let binary = config.resolved_command();
        Ok(Self { config, binary })
    }

    pub fn config(&self) -> &DockerConfig {
        &self.config
    }

    /// Run one docker invocation to completion, capturing both streams.
    ///
    /// The child is killed if the caller stops waiting for it.
    async fn invoke(&self, args: Vec<String>) -> Result<Output, RuntimeError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args::global(&self.config))
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        trace!(binary = %self.binary, args = ?args, "invoking docker");
        let output = cmd.output().await?;
        trace!(status = ?output.status.code(), "docker finished");
        Ok(output)
    }

    /// Invoke and require success; failures are classified against `target`.
    async fn checked(&self, target: Target<'_>, args: Vec<String>) -> Result<String, RuntimeError> {
        let output = self.invoke(args).await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(status = ?output.status.code(), stderr = %stderr.trim(), "docker call failed");
            Err(parse::classify(target, &stderr))
        }
    }
}

#[async_trait]
impl RuntimeClient for DockerRuntime {
    fn name(&self) -> &'static str {
        RUNTIME_DOCKER
    }

    async fn list_units(&self, all: bool) -> Result<Vec<Unit>, RuntimeError> {
        let stdout = self.checked(Target::Daemon, args::ps(all)).await?;
        Ok(parse::ps_rows(&stdout)?)
    }

    async fn list_images(&self) -> Result<Vec<String>, RuntimeError> {
        let stdout = self.checked(Target::Daemon, args::images()).await?;
        Ok(parse::images(&stdout))
    }

    async fn create_unit(&self, image: &ImageRef, name: &UnitName) -> Result<Unit, RuntimeError> {
        let target = Target::Create {
            image: image.as_str(),
            unit: name.as_str(),
        };
        let stdout = self
            .checked(target, args::run(&self.config, image, name))
            .await?;
        let unit = Unit::new(name.clone(), image.clone(), UnitStatus::Running);
        Ok(match stdout.trim() {
            "" => unit,
            id => unit.with_id(id),
        })
    }

    async fn get_unit(&self, name: &UnitName) -> Result<Unit, RuntimeError> {
        let stdout = self
            .checked(Target::Unit(name.as_str()), args::inspect(name))
            .await?;
        Ok(parse::inspect(&stdout)?)
    }

    async fn stop_unit(&self, unit: &Unit) -> Result<(), RuntimeError> {
        let name = unit.name.as_str();
        self.checked(Target::Unit(name), args::stop(name)).await?;
        Ok(())
    }

    async fn remove_unit(&self, unit: &Unit, force: bool) -> Result<(), RuntimeError> {
        let name = unit.name.as_str();
        self.checked(Target::Unit(name), args::rm(name, force))
            .await?;
        Ok(())
    }

    async fn exec(&self, unit: &Unit, command: &str) -> Result<ExecOutput, RuntimeError> {
        let name = unit.name.as_str();
        let output = self.invoke(args::exec(&self.config, name, command)).await?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() && parse::is_daemon_error(&stderr) {
            return Err(parse::classify(Target::Unit(name), &stderr));
        }

        // Signals leave no exit code; report them as a generic failure.
        let exit_code = output.status.code().map(i64::from).unwrap_or(-1);
        let mut captured = output.stdout;
        captured.extend_from_slice(&output.stderr);
        Ok(ExecOutput::new(exit_code, captured))
    }

    async fn get_file(&self, unit: &Unit, path: &str) -> Result<Vec<u8>, RuntimeError> {
        let name = unit.name.as_str();
        let output = self.invoke(args::cat(name, path)).await?;
        if output.status.success() {
            return Ok(output.stdout);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(parse::classify(Target::File { unit: name, path }, &stderr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_config() {
        let cfg = DockerConfig {
            shell: String::new(),
            ..Default::default()
        };
        assert!(DockerRuntime::new(cfg).is_err());
    }

    #[tokio::test]
    async fn missing_binary_reports_unavailable() {
        let cfg = DockerConfig {
            command: "/nonexistent/flock-docker-binary".into(),
            ..Default::default()
        };
        let rt = DockerRuntime {
            binary: cfg.command.clone(),
            config: cfg,
        };
        let err = rt.list_units(true).await.unwrap_err();
        assert_eq!(err.kind(), "unavailable");
    }

    #[tokio::test]
    async fn failing_binary_is_classified() {
        // `false` exits 1 with empty stderr
        let rt = DockerRuntime {
            binary: "false".into(),
            config: DockerConfig::default(),
        };
        let err = rt.list_images().await.unwrap_err();
        assert!(matches!(err, RuntimeError::Unavailable(_)));
    }
}
