//! Cluster orchestration engine.
//!
//! The [`Engine`] owns the runtime adapter, the unit registry and the activity log,
//! and exposes one operation per capability: unit lifecycle, command execution,
//! partitioned workloads and artifact tasks.
pub mod activity;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod runtime;

pub use activity::{ActivityError, ActivityHandle, ActivityLog, MemoryActivityLog, format_entry};
pub use config::{ArtifactConfig, EngineConfig, WorkloadConfig};
pub use engine::{
    ArtifactOutcome, ArtifactReport, ArtifactRequest, BatchAction, BatchReport, CommandReport,
    Engine, EngineContext, PartitionOutcome, PartitionReport, PartitionRequest, ProvisionFailure,
    UnitFailure,
};
pub use error::CoreError;
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, OpOutcome, noop_metrics};
pub use registry::UnitRegistry;
pub use runtime::{RuntimeClient, RuntimeError, RuntimeHandle, make_run_id};

#[cfg(test)]
pub(crate) mod testutil;

pub mod prelude {
    pub use crate::engine::Engine;
    pub use crate::error::CoreError;
    pub use crate::runtime::{RuntimeClient, RuntimeError};
}
