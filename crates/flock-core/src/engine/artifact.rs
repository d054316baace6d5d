use std::path::Path;

use flock_model::{ImageRef, Unit, UnitName};
use tracing::{debug, info, instrument, warn};

use super::{ArtifactOutcome, ArtifactReport, ArtifactRequest, Engine};
use crate::{error::CoreError, runtime::make_run_id};

impl Engine {
    /// Provision one unit, run a script in it and copy an artifact file out.
    ///
    /// Only a provisioning failure fails the call. The artifact is fetched whatever
    /// the script exit status, and a failed fetch or write is reported in
    /// [`ArtifactReport::artifact`] without touching the script result.
    #[instrument(level = "debug", skip(self, req))]
    pub async fn run_artifact_task(&self, req: ArtifactRequest) -> Result<ArtifactReport, CoreError> {
        self.track("run_artifact_task", self.artifact_task(req), |res| match res {
            Ok(report) => {
                let artifact = match &report.artifact {
                    ArtifactOutcome::Saved { path, bytes } => {
                        format!("saved {bytes} bytes to {}", path.display())
                    }
                    ArtifactOutcome::Failed { message, .. } => format!("not retrieved: {message}"),
                };
                format!(
                    "Artifact task ran in unit {} (success: {}); artifact {artifact}",
                    report.unit, report.success
                )
            }
            Err(e) => format!("Artifact task failed: {e}"),
        })
        .await
    }

    async fn artifact_task(&self, req: ArtifactRequest) -> Result<ArtifactReport, CoreError> {
        let defaults = &self.ctx.config().artifact;
        let image = match req.image {
            Some(image) => image,
            None => ImageRef::new(defaults.image.clone())?,
        };
        let script = req.script.unwrap_or_else(|| defaults.script.clone());
        let artifact_path = req
            .artifact_path
            .unwrap_or_else(|| defaults.artifact_path.clone());
        let destination = req
            .destination
            .unwrap_or_else(|| defaults.destination.clone());

        if script.trim().is_empty() {
            return Err(CoreError::Validation("script is empty".into()));
        }
        if artifact_path.trim().is_empty() {
            return Err(CoreError::Validation("artifact path is empty".into()));
        }

        let name = UnitName::new(make_run_id(&defaults.unit_prefix))?;
        let unit = self.provision(&image, &name).await?;
        info!(unit = %unit.name, script = %script, "artifact task started");

        let mut report = ArtifactReport {
            unit: unit.name.clone(),
            exit_code: None,
            success: false,
            output: String::new(),
            error: None,
            artifact: ArtifactOutcome::Failed {
                kind: "not_attempted".into(),
                message: String::new(),
            },
        };
        match self.call("exec", self.runtime.exec(&unit, &script)).await {
            Ok(out) => {
                report.exit_code = Some(out.exit_code);
                report.success = out.success();
                report.output = out.text().trim().to_string();
            }
            Err(e) => {
                warn!(unit = %unit.name, error = %e, "artifact script did not run");
                report.error = Some(e.to_string());
            }
        }

        report.artifact = self.retrieve(&unit, &artifact_path, &destination).await;
        Ok(report)
    }

    async fn retrieve(&self, unit: &Unit, path: &str, destination: &Path) -> ArtifactOutcome {
        let bytes = match self.call("get_file", self.runtime.get_file(unit, path)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(unit = %unit.name, path, error = %e, "artifact not retrieved");
                return ArtifactOutcome::Failed {
                    kind: e.kind().into(),
                    message: e.to_string(),
                };
            }
        };

        match write_artifact(destination, &bytes).await {
            Ok(()) => ArtifactOutcome::Saved {
                path: destination.to_path_buf(),
                bytes: bytes.len() as u64,
            },
            Err(e) => {
                warn!(path = %destination.display(), error = %e, "failed to write artifact");
                ArtifactOutcome::Failed {
                    kind: "io".into(),
                    message: format!("writing {}: {e}", destination.display()),
                }
            }
        }
    }
}

async fn write_artifact(destination: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(destination, bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{StubRuntime, harness, image};
    use flock_model::ExecOutput;

    fn request(dir: &Path) -> ArtifactRequest {
        ArtifactRequest {
            image: Some(image("tensorflow:my")),
            script: Some("python /app/lreg.py".into()),
            artifact_path: Some("/app/fig.png".into()),
            destination: Some(dir.join("out").join("fig.png")),
        }
    }

    #[tokio::test]
    async fn script_output_and_artifact_are_returned() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(StubRuntime::new(&["tensorflow:my"]));
        *h.runtime.reply.lock() = ExecOutput::ok("loss: 0.12\n");
        h.runtime
            .files
            .lock()
            .insert("/app/fig.png".into(), vec![0x89, b'P', b'N', b'G']);

        let report = h.engine.run_artifact_task(request(dir.path())).await.unwrap();
        assert_eq!(report.output, "loss: 0.12");
        assert_eq!(report.exit_code, Some(0));
        assert!(report.success);

        let dest = dir.path().join("out").join("fig.png");
        assert_eq!(
            report.artifact,
            ArtifactOutcome::Saved {
                path: dest.clone(),
                bytes: 4
            }
        );
        assert_eq!(std::fs::read(dest).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn artifact_is_fetched_even_when_script_fails() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(StubRuntime::new(&["tensorflow:my"]));
        *h.runtime.reply.lock() = ExecOutput::new(1, "ImportError\n");
        h.runtime.files.lock().insert("/app/fig.png".into(), b"png".to_vec());

        let report = h.engine.run_artifact_task(request(dir.path())).await.unwrap();
        assert!(!report.success);
        assert_eq!(report.output, "ImportError");
        assert!(matches!(report.artifact, ArtifactOutcome::Saved { bytes: 3, .. }));
    }

    #[tokio::test]
    async fn missing_artifact_keeps_script_result() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(StubRuntime::new(&["tensorflow:my"]));

        let report = h.engine.run_artifact_task(request(dir.path())).await.unwrap();
        assert!(report.success);
        assert!(matches!(
            report.artifact,
            ArtifactOutcome::Failed { ref kind, .. } if kind == "file_not_found"
        ));
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn provisioning_failure_fails_the_task() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(StubRuntime::new(&["alpine"]));
        let err = h
            .engine
            .run_artifact_task(request(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ImageNotFound(_)));
        assert_eq!(h.activity.len(), 1);
    }
}
