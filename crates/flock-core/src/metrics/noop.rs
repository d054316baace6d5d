use crate::metrics::backend::{MetricsBackend, OpOutcome};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_op_started(&self, _: &str) {}

    #[inline(always)]
    fn record_op_completed(&self, _: &str, _: OpOutcome, _: u64) {}

    #[inline(always)]
    fn record_runtime_error(&self, _: &str, _: &str) {}

    #[inline(always)]
    fn record_units_tracked(&self, _: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn noop_metrics_is_zero_size() {
        assert_eq!(std::mem::size_of::<NoOpMetrics>(), 0);
    }

    #[test]
    fn outcome_classification() {
        assert_eq!(OpOutcome::of::<()>(&Ok(())), OpOutcome::Success);
        assert_eq!(
            OpOutcome::of::<()>(&Err(CoreError::UnitNotFound("x".into()))),
            OpOutcome::Failure
        );
        assert_eq!(
            OpOutcome::of::<()>(&Err(CoreError::Timeout {
                op: "exec",
                after_ms: 1
            })),
            OpOutcome::Timeout
        );
        assert_eq!(OpOutcome::Timeout.as_label(), "timeout");
    }
}
