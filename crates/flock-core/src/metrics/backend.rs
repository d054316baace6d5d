use std::sync::Arc;

use crate::error::CoreError;

/// Operation outcome for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpOutcome {
    Success,
    Failure,
    /// A runtime call exceeded its deadline.
    Timeout,
}

impl OpOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            OpOutcome::Success => "success",
            OpOutcome::Failure => "failure",
            OpOutcome::Timeout => "timeout",
        }
    }

    /// Classify an operation result.
    pub fn of<T>(res: &Result<T, CoreError>) -> Self {
        match res {
            Ok(_) => OpOutcome::Success,
            Err(CoreError::Timeout { .. }) => OpOutcome::Timeout,
            Err(_) => OpOutcome::Failure,
        }
    }
}

/// Backend metrics collection interface.
///
/// `op` is always one of the engine operation names (`create_unit`, `run_partitioned`, ...),
/// so label cardinality stays bounded.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Called when an engine operation starts.
    fn record_op_started(&self, op: &str);

    /// Called when an engine operation returns, with its outcome and wall time.
    fn record_op_completed(&self, op: &str, outcome: OpOutcome, duration_ms: u64);

    /// Called for every failed runtime call.
    ///
    /// This is separate from operation failures: one batch operation may see several runtime errors.
    fn record_runtime_error(&self, op: &str, error_kind: &str);

    /// Current number of units in the active registry view.
    fn record_units_tracked(&self, count: usize);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
