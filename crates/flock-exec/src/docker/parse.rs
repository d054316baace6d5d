//! Decoding of docker CLI output.
use std::str::FromStr;

use flock_core::RuntimeError;
use flock_model::{ImageRef, Unit, UnitName, UnitStatus};
use serde::Deserialize;
use tracing::debug;

use crate::ExecError;

/// Stderr fragments meaning the image is unknown and was not pulled.
const IMAGE_MISSING: &[&str] = &[
    "no such image",
    "unable to find image",
    "pull access denied",
    "manifest unknown",
    "repository does not exist",
];

/// One line of `docker ps --format '{{json .}}'`.
#[derive(Debug, Deserialize)]
struct PsRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "Names")]
    names: String,
    /// Missing on old daemons.
    #[serde(rename = "State", default)]
    state: Option<String>,
    #[serde(rename = "Status", default)]
    status: String,
}

/// Subset of `docker inspect --type container` we care about.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectRecord {
    id: String,
    name: String,
    config: InspectConfig,
    state: InspectState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectConfig {
    image: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectState {
    status: String,
}

/// Parse `docker ps` JSON lines. Rows whose names or images cannot be represented
/// are skipped.
pub(super) fn ps_rows(stdout: &str) -> Result<Vec<Unit>, ExecError> {
    let mut units = Vec::new();
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let row: PsRow = serde_json::from_str(line)
            .map_err(|e| ExecError::Parse(format!("docker ps row: {e}")))?;

        let status = match row.state.as_deref() {
            Some(state) if !state.is_empty() => {
                UnitStatus::from_str(state).map_err(|e| ExecError::Parse(e.to_string()))?
            }
            _ if row.status.starts_with("Up") => UnitStatus::Running,
            _ => UnitStatus::Stopped,
        };
        // Linked containers list several comma-separated names; the first is canonical.
        let raw_name = row.names.split(',').next().unwrap_or_default();
        match (UnitName::new(raw_name), ImageRef::new(row.image.as_str())) {
            (Ok(name), Ok(image)) => units.push(Unit::new(name, image, status).with_id(row.id)),
            _ => debug!(name = raw_name, image = %row.image, "skipping unrepresentable container"),
        }
    }
    Ok(units)
}

/// Parse the JSON array printed by `docker inspect`.
pub(super) fn inspect(stdout: &str) -> Result<Unit, ExecError> {
    let records: Vec<InspectRecord> = serde_json::from_str(stdout)
        .map_err(|e| ExecError::Parse(format!("docker inspect: {e}")))?;
    let record = records
        .into_iter()
        .next()
        .ok_or_else(|| ExecError::Parse("docker inspect returned no records".into()))?;

    let name = UnitName::new(record.name.trim_start_matches('/'))
        .map_err(|e| ExecError::Parse(e.to_string()))?;
    let image =
        ImageRef::new(record.config.image).map_err(|e| ExecError::Parse(e.to_string()))?;
    let status =
        UnitStatus::from_str(&record.state.status).map_err(|e| ExecError::Parse(e.to_string()))?;
    Ok(Unit::new(name, image, status).with_id(record.id))
}

/// Parse `docker images` output, dropping dangling `<none>` entries.
pub(super) fn images(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.contains("<none>"))
        .map(str::to_string)
        .collect()
}

/// What a failed docker invocation was about.
#[derive(Debug, Clone, Copy)]
pub(super) enum Target<'a> {
    Daemon,
    Create { image: &'a str, unit: &'a str },
    Unit(&'a str),
    File { unit: &'a str, path: &'a str },
}

/// Whether stderr of `docker exec` comes from the daemon rather than the command.
pub(super) fn is_daemon_error(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    lower.contains("error response from daemon")
        || lower.contains("no such container")
        || lower.contains("cannot connect to the docker daemon")
}

/// Map a failed invocation onto the runtime error taxonomy.
pub(super) fn classify(target: Target<'_>, stderr: &str) -> RuntimeError {
    let msg = stderr.trim();
    let lower = msg.to_ascii_lowercase();
    let unit_gone = lower.contains("no such container")
        || lower.contains("no such object")
        || lower.contains("is not running");

    match target {
        Target::Create { image, .. } if IMAGE_MISSING.iter().any(|m| lower.contains(m)) => {
            return RuntimeError::ImageNotFound(image.to_string());
        }
        Target::Create { unit, .. } if lower.contains("is already in use") => {
            return RuntimeError::UnitExists(unit.to_string());
        }
        Target::Unit(unit) if unit_gone => return RuntimeError::UnitNotFound(unit.to_string()),
        Target::File { unit, .. } if unit_gone => {
            return RuntimeError::UnitNotFound(unit.to_string());
        }
        Target::File { unit, path } if lower.contains("no such file") => {
            return RuntimeError::FileNotFound {
                unit: unit.to_string(),
                path: path.to_string(),
            };
        }
        _ => {}
    }

    if msg.is_empty() {
        RuntimeError::Unavailable("docker exited with an error and no output".into())
    } else {
        RuntimeError::Unavailable(msg.to_string())
    }
}
