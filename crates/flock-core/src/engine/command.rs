use flock_model::{Unit, UnitName};
use tracing::{debug, instrument};

use super::{CommandReport, Engine};
use crate::error::CoreError;

impl Engine {
    /// Run `command` once inside a running unit.
    ///
    /// The output is normalized to a single line. A non-zero exit code is reported
    /// in the result, not as an error. Membership is left untouched.
    #[instrument(level = "debug", skip(self, command), fields(unit = %name))]
    pub async fn execute(&self, name: &UnitName, command: &str) -> Result<CommandReport, CoreError> {
        self.track(
            "execute",
            async {
                if command.trim().is_empty() {
                    return Err(CoreError::Validation("command is empty".into()));
                }
                let unit = self.lookup_running(name).await?;
                let out = self.call("exec", self.runtime.exec(&unit, command)).await?;
                debug!(exit_code = out.exit_code, bytes = out.output.len(), "command finished");

                Ok(CommandReport {
                    unit: unit.name,
                    command: command.to_string(),
                    output: out.normalized(),
                    exit_code: out.exit_code,
                    success: out.success(),
                })
            },
            |res| match res {
                Ok(report) => format!(
                    "Command executed in unit {}: {} (exit {})",
                    report.unit, report.output, report.exit_code
                ),
                Err(e) => format!("Command execution in unit {name} failed: {e}"),
            },
        )
        .await
    }

    /// Resolve a running unit without touching the registry.
    async fn lookup_running(&self, name: &UnitName) -> Result<Unit, CoreError> {
        let unit = self.call("get_unit", self.runtime.get_unit(name)).await?;
        if !unit.status.is_running() {
            return Err(CoreError::UnitNotFound(name.to_string()));
        }
        Ok(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{StubRuntime, harness, image, name};
    use flock_model::ExecOutput;

    #[tokio::test]
    async fn output_is_normalized_to_one_line() {
        let h = harness(StubRuntime::new(&["alpine"]));
        h.engine.create_unit(image("alpine"), name("web")).await.unwrap();
        *h.runtime.reply.lock() = ExecOutput::ok("  total 4\r\n\ndrwxr-xr-x  etc \n");

        let report = h.engine.execute(&name("web"), "ls -l /").await.unwrap();
        assert_eq!(report.output, "total 4 drwxr-xr-x  etc");
        assert!(report.success);
        assert_eq!(report.command, "ls -l /");
    }

    #[tokio::test]
    async fn missing_unit_leaves_registry_alone() {
        let h = harness(StubRuntime::new(&["alpine"]));
        h.engine.create_unit(image("alpine"), name("web")).await.unwrap();
        let before = h.engine.registry().snapshot();

        let err = h.engine.execute(&name("ghost"), "true").await.unwrap_err();
        assert!(matches!(err, CoreError::UnitNotFound(_)));
        assert_eq!(h.engine.registry().snapshot(), before);
    }

    #[tokio::test]
    async fn stopped_unit_cannot_execute() {
        let h = harness(StubRuntime::new(&["alpine"]));
        h.engine.create_unit(image("alpine"), name("web")).await.unwrap();
        h.engine.stop_unit(&name("web")).await.unwrap();

        let err = h.engine.execute(&name("web"), "true").await.unwrap_err();
        assert!(matches!(err, CoreError::UnitNotFound(_)));
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_result_not_an_error() {
        let h = harness(StubRuntime::new(&["alpine"]));
        h.engine.create_unit(image("alpine"), name("web")).await.unwrap();
        *h.runtime.reply.lock() = ExecOutput::new(2, "no such file\n");

        let report = h.engine.execute(&name("web"), "cat /nope").await.unwrap();
        assert_eq!(report.exit_code, 2);
        assert!(!report.success);
        assert_eq!(report.output, "no such file");
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let h = harness(StubRuntime::new(&["alpine"]));
        let err = h.engine.execute(&name("web"), "   ").await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }
}
