use std::{path::PathBuf, time::Duration};

use flock_model::{Partition, RemainderPolicy};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default statistics command.
///
/// The unit generates its own partition of integers in `[1, 100)`, seeded by the
/// partition offset, so the dataset itself never travels through the engine.
pub const DEFAULT_STATS_COMMAND: &str = "python -c \"import random,statistics as s;\
random.seed({offset});d=[random.randint(1,99) for _ in range({len})];\
print(f'sum:{sum(d)} mean:{s.mean(d)} max:{max(d)} min:{min(d)} std:{s.pstdev(d)}')\"";

/// Engine tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deadline applied to each individual runtime call. `None` disables it.
    pub call_timeout_ms: Option<u64>,
    /// Upper bound on the partition count of a single workload.
    pub max_partitions: usize,
    /// What to do when a dataset does not divide evenly.
    pub remainder: RemainderPolicy,
    pub workload: WorkloadConfig,
    pub artifact: ArtifactConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: Some(60_000),
            max_partitions: 64,
            remainder: RemainderPolicy::default(),
            workload: WorkloadConfig::default(),
            artifact: ArtifactConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.call_timeout_ms == Some(0) {
            return Err(CoreError::Validation(
                "call_timeout_ms cannot be zero (omit it to disable deadlines)".into(),
            ));
        }
        if self.max_partitions == 0 {
            return Err(CoreError::Validation("max_partitions cannot be zero".into()));
        }
        self.workload.validate()?;
        self.artifact.validate()
    }
}

/// Defaults for partitioned workloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Image used when the request does not name one.
    pub image: String,
    /// Prefix of partition unit names.
    pub unit_prefix: String,
    /// Command template run in each unit.
    ///
    /// Placeholders: `{index}`, `{offset}`, `{len}`, `{end}`.
    pub command: String,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            image: "python:3.8".into(),
            unit_prefix: "partition".into(),
            command: DEFAULT_STATS_COMMAND.into(),
        }
    }
}

impl WorkloadConfig {
    /// Substitute partition placeholders into the command template.
    pub fn render(&self, partition: &Partition) -> String {
        self.command
            .replace("{index}", &partition.index.to_string())
            .replace("{offset}", &partition.offset.to_string())
            .replace("{len}", &partition.len.to_string())
            .replace("{end}", &partition.end().to_string())
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.command.trim().is_empty() {
            return Err(CoreError::Validation("workload.command is empty".into()));
        }
        if self.unit_prefix.trim().is_empty() {
            return Err(CoreError::Validation("workload.unit_prefix is empty".into()));
        }
        Ok(())
    }
}

/// Defaults for the single-unit artifact task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub image: String,
    pub unit_prefix: String,
    /// Command run inside the unit.
    pub script: String,
    /// File retrieved from the unit once the script returns.
    pub artifact_path: String,
    /// Local path the artifact is written to.
    pub destination: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            image: "tensorflow:my".into(),
            unit_prefix: "ai-task".into(),
            script: "python /app/lreg.py".into(),
            artifact_path: "/app/fig.png".into(),
            destination: PathBuf::from("./fig.png"),
        }
    }
}

impl ArtifactConfig {
    fn validate(&self) -> Result<(), CoreError> {
        if self.unit_prefix.trim().is_empty() {
            return Err(CoreError::Validation("artifact.unit_prefix is empty".into()));
        }
        Ok(())
    }
}
