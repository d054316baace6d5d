//! The cluster orchestration engine.
//!
//! [`Engine`] is a cheaply clonable handle over:
//! - the runtime adapter ([`RuntimeHandle`]);
//! - the unit registry (active membership cache);
//! - the activity log;
//! - an [`EngineContext`] with configuration and metrics.
//!
//! Operations are split by component: lifecycle, command execution, partitioned
//! workloads and artifact tasks. Each public operation records metrics, writes one
//! activity log record and returns an explicit report or a [`CoreError`].
mod artifact;
mod command;
mod context;
mod lifecycle;
mod report;
mod workload;

pub use context::EngineContext;
pub use report::{
    ArtifactOutcome, ArtifactReport, ArtifactRequest, BatchAction, BatchReport, CommandReport,
    PartitionOutcome, PartitionReport, PartitionRequest, ProvisionFailure, UnitFailure,
};

use std::{fmt, future::Future, sync::Arc, time::Instant};

use tracing::{debug, warn};

use crate::{
    activity::ActivityHandle,
    config::EngineConfig,
    error::CoreError,
    metrics::OpOutcome,
    registry::UnitRegistry,
    runtime::{RuntimeError, RuntimeHandle},
};

#[derive(Clone)]
pub struct Engine {
    runtime: RuntimeHandle,
    registry: Arc<UnitRegistry>,
    activity: ActivityHandle,
    ctx: EngineContext,
}

impl Engine {
    /// Create an engine with a default context.
    pub fn new(runtime: RuntimeHandle, activity: ActivityHandle) -> Self {
        Self {
            runtime,
            registry: Arc::new(UnitRegistry::new()),
            activity,
            ctx: EngineContext::default(),
        }
    }

    /// Set a custom context (configuration, metrics backend).
    pub fn with_context(mut self, ctx: EngineContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        self.ctx.config()
    }

    pub fn runtime_name(&self) -> &'static str {
        self.runtime.name()
    }

    /// Full activity log text.
    pub async fn read_activity(&self) -> Result<String, CoreError> {
        Ok(self.activity.read_all().await?)
    }

    /// Run one runtime call under the configured deadline.
    ///
    /// Runtime errors are counted and converted into [`CoreError`].
    async fn call<T, F>(&self, op: &'static str, fut: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, RuntimeError>>,
    {
        let res = match self.ctx.config().call_timeout() {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(res) => res,
                Err(_) => {
                    self.ctx.metrics().record_runtime_error(op, "timeout");
                    return Err(CoreError::Timeout {
                        op,
                        after_ms: limit.as_millis() as u64,
                    });
                }
            },
            None => fut.await,
        };
        res.map_err(|e| {
            self.ctx.metrics().record_runtime_error(op, e.kind());
            CoreError::from(e)
        })
    }

    /// Drive a public operation: metrics around it and exactly one activity record after it.
    async fn track<T, F, D>(&self, op: &'static str, fut: F, describe: D) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
        D: FnOnce(&Result<T, CoreError>) -> String,
    {
        let metrics = self.ctx.metrics();
        metrics.record_op_started(op);
        let started = Instant::now();

        let res = fut.await;

        let elapsed = started.elapsed().as_millis() as u64;
        metrics.record_op_completed(op, OpOutcome::of(&res), elapsed);
        metrics.record_units_tracked(self.registry.len());
        if let Err(e) = &res {
            debug!(op, error = %e, "operation failed");
        }

        self.record(describe(&res)).await;
        res
    }

    /// Append an activity record; failures are logged and swallowed.
    async fn record(&self, text: String) {
        if let Err(e) = self.activity.append(&text).await {
            warn!(error = %e, "failed to append activity record");
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("runtime", &self.runtime.name())
            .field("units", &self.registry.len())
            .field("ctx", &self.ctx)
            .finish()
    }
}

/// Render names as `[a, b, c]` for activity records.
fn name_list<T: fmt::Display>(items: &[T]) -> String {
    let joined = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}
