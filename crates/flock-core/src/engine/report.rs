//! Result payloads of engine operations.
use std::{collections::BTreeMap, path::PathBuf};

use flock_model::{ImageRef, Partition, PartitionStats, UnitName};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which batch operation produced a [`BatchReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    Stop,
    Remove,
}

/// One unit a batch or workload step failed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFailure {
    pub unit: UnitName,
    /// [`CoreError::kind`] of the failure.
    pub kind: String,
    pub message: String,
}

impl UnitFailure {
    pub fn new(unit: UnitName, err: &CoreError) -> Self {
        Self {
            unit,
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Best-effort outcome of `stop_all` / `remove_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub action: BatchAction,
    /// Units the action succeeded on.
    pub affected: Vec<UnitName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<UnitFailure>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.affected.is_empty() && self.failures.is_empty()
    }
}

/// Output of a command run inside a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReport {
    pub unit: UnitName,
    pub command: String,
    /// Normalized single-line output.
    pub output: String,
    pub exit_code: i64,
    pub success: bool,
}

/// Parameters of a partitioned workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRequest {
    pub dataset_size: u64,
    pub partition_count: usize,
    /// Falls back to the configured workload image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
}

/// Per-unit result of a partitioned workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartitionOutcome {
    Completed {
        partition: Partition,
        /// Raw statistics line as printed by the unit, normalized.
        output: String,
        /// Parsed statistics, when the output is well-formed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stats: Option<PartitionStats>,
    },
    Failed {
        partition: Partition,
        kind: String,
        message: String,
    },
}

impl PartitionOutcome {
    pub fn partition(&self) -> &Partition {
        match self {
            PartitionOutcome::Completed { partition, .. } => partition,
            PartitionOutcome::Failed { partition, .. } => partition,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, PartitionOutcome::Completed { .. })
    }
}

/// A partition whose unit could not be provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionFailure {
    pub partition: Partition,
    pub unit: UnitName,
    pub kind: String,
    pub message: String,
}

/// Aggregated result of a partitioned workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionReport {
    pub run_id: String,
    pub dataset_size: u64,
    pub partition_count: usize,
    /// Units provisioned for this run, in partition order.
    pub units: Vec<UnitName>,
    /// Result per provisioned unit.
    pub results: BTreeMap<UnitName, PartitionOutcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provision_failures: Vec<ProvisionFailure>,
}

impl PartitionReport {
    /// Number of partitions whose statistics were computed.
    pub fn completed(&self) -> usize {
        self.results.values().filter(|o| o.is_completed()).count()
    }
}

/// Parameters of an artifact task; unset fields use the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
}

/// What happened to the artifact after the script ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactOutcome {
    Saved { path: PathBuf, bytes: u64 },
    Failed { kind: String, message: String },
}

/// Result of an artifact task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReport {
    pub unit: UnitName,
    /// `None` when the script could not be started at all.
    pub exit_code: Option<i64>,
    pub success: bool,
    /// Script output with surrounding whitespace trimmed.
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub artifact: ArtifactOutcome,
}
