//! Prometheus implementation of [`flock_core::MetricsBackend`].
//!
//! ```rust
//! use std::sync::Arc;
//! use flock_core::{EngineConfig, EngineContext};
//! use flock_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let ctx = EngineContext::new(EngineConfig::default(), Arc::new(metrics.clone()));
//! # let _ = ctx;
//! let body = metrics.encode_text()?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `flock_operations_started_total{op}`
//! - `flock_operations_completed_total{op, outcome}`
//! - `flock_operation_duration_seconds{op}`
//! - `flock_runtime_errors_total{op, error_kind}`
//! - `flock_units_tracked`
//!
//! No HTTP server is provided here; the agent serves [`PrometheusMetrics::encode_text`]
//! on `/metrics`.
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
