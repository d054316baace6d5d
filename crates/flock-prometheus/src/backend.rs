use std::sync::Arc;

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntGauge, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use flock_core::{MetricsBackend, OpOutcome};

const NAMESPACE: &str = "flock";

/// Prometheus metrics backend.
///
/// Label values are bounded: `op` is an engine operation name, `outcome` is one
/// of success/failure/timeout and `error_kind` a runtime error tag.
#[derive(Clone)]
pub struct PrometheusMetrics {
    ops_started: CounterVec,
    ops_completed: CounterVec,
    op_duration: HistogramVec,
    runtime_errors: CounterVec,
    units_tracked: IntGauge,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let ops_started = CounterVec::new(
            Opts::new("operations_started_total", "Engine operations started").namespace(NAMESPACE),
            &["op"],
        )?;
        registry.register(Box::new(ops_started.clone()))?;

        let ops_completed = CounterVec::new(
            Opts::new("operations_completed_total", "Engine operations completed")
                .namespace(NAMESPACE),
            &["op", "outcome"],
        )?;
        registry.register(Box::new(ops_completed.clone()))?;

        let op_duration = HistogramVec::new(
            HistogramOpts::new("operation_duration_seconds", "Engine operation duration")
                .namespace(NAMESPACE)
                .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]),
            &["op"],
        )?;
        registry.register(Box::new(op_duration.clone()))?;

        let runtime_errors = CounterVec::new(
            Opts::new("runtime_errors_total", "Failed runtime adapter calls").namespace(NAMESPACE),
            &["op", "error_kind"],
        )?;
        registry.register(Box::new(runtime_errors.clone()))?;

        let units_tracked = IntGauge::with_opts(
            Opts::new("units_tracked", "Units in the active registry").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(units_tracked.clone()))?;

        Ok(Self {
            ops_started,
            ops_completed,
            op_duration,
            runtime_errors,
            units_tracked,
            registry,
        })
    }

    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render all metrics in the text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_op_started(&self, op: &str) {
        self.ops_started.with_label_values(&[op]).inc();
    }

    fn record_op_completed(&self, op: &str, outcome: OpOutcome, duration_ms: u64) {
        self.ops_completed
            .with_label_values(&[op, outcome.as_label()])
            .inc();
        self.op_duration
            .with_label_values(&[op])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_runtime_error(&self, op: &str, error_kind: &str) {
        self.runtime_errors
            .with_label_values(&[op, error_kind])
            .inc();
    }

    fn record_units_tracked(&self, count: usize) {
        self.units_tracked.set(count as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
        families
            .iter()
            .find(|f| f.name() == name)
            .unwrap_or_else(|| panic!("{name} not found"))
    }

    #[test]
    fn started_counter_is_labelled_by_op() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_op_started("create_unit");
        metrics.record_op_started("create_unit");
        metrics.record_op_started("stop_all");

        let families = metrics.gather();
        let started = family(&families, "flock_operations_started_total");
        assert_eq!(started.get_metric().len(), 2);
    }

    #[test]
    fn completion_records_outcome_and_duration() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_op_completed("run_partitioned", OpOutcome::Success, 1500);
        metrics.record_op_completed("run_partitioned", OpOutcome::Timeout, 60_000);

        let families = metrics.gather();
        assert_eq!(
            family(&families, "flock_operations_completed_total").get_metric().len(),
            2
        );
        assert_eq!(
            family(&families, "flock_operation_duration_seconds").get_metric().len(),
            1
        );
    }

    #[test]
    fn gauge_and_errors_show_in_text_output() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_units_tracked(3);
        metrics.record_runtime_error("exec", "unit_not_found");

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("flock_units_tracked 3"));
        let line = text
            .lines()
            .find(|l| l.starts_with("flock_runtime_errors_total{"))
            .unwrap();
        assert!(line.contains(r#"error_kind="unit_not_found""#));
        assert!(line.ends_with(" 1"));
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = Arc::new(Registry::new());
        PrometheusMetrics::new_with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }
}
