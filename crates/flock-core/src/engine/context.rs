use std::fmt;

use crate::{config::EngineConfig, metrics::MetricsHandle};

/// Shared dependencies handed to the engine at construction time.
#[derive(Clone)]
pub struct EngineContext {
    config: EngineConfig,
    metrics: MetricsHandle,
}

impl EngineContext {
    /// Create a new context with the given params.
    pub fn new(config: EngineConfig, metrics: MetricsHandle) -> Self {
        Self { config, metrics }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get a clonable handle to the metrics backend.
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }

    /// Replace the configuration and return updated context.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the metrics backend and return updated context.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            metrics: crate::metrics::noop_metrics(),
        }
    }
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("config", &self.config)
            .field("metrics", &"<handle>")
            .finish()
    }
}

impl fmt::Display for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EngineContext(call_timeout_ms={:?}, max_partitions={})",
            self.config.call_timeout_ms, self.config.max_partitions
        )
    }
}
