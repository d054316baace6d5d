//! Narrow seam to the external container runtime.
//!
//! Concrete adapters (docker CLI, in-memory simulation) implement [`RuntimeClient`]
//! and are injected into the [`crate::Engine`].
mod error;
pub use error::RuntimeError;

mod id;
pub use id::make_run_id;

use std::sync::Arc;

use async_trait::async_trait;
use flock_model::{ExecOutput, ImageRef, Unit, UnitName};

/// Operations the engine requires from a container runtime.
///
/// Implementations must be cheap to share: the engine holds one handle and
/// calls it concurrently from partition tasks.
#[async_trait]
pub trait RuntimeClient: Send + Sync + 'static {
    /// Adapter name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// List units; stopped ones are included only when `all` is set.
    async fn list_units(&self, all: bool) -> Result<Vec<Unit>, RuntimeError>;

    /// List image identifiers (`repository:tag`) known to the runtime.
    async fn list_images(&self) -> Result<Vec<String>, RuntimeError>;

    /// Create and start a unit named `name` from `image`.
    async fn create_unit(&self, image: &ImageRef, name: &UnitName) -> Result<Unit, RuntimeError>;

    /// Look up a unit by name, whatever its status.
    async fn get_unit(&self, name: &UnitName) -> Result<Unit, RuntimeError>;

    async fn stop_unit(&self, unit: &Unit) -> Result<(), RuntimeError>;

    /// Remove a unit; `force` removes it even while running.
    async fn remove_unit(&self, unit: &Unit, force: bool) -> Result<(), RuntimeError>;

    /// Run `command` inside the unit through a shell and capture its output.
    async fn exec(&self, unit: &Unit, command: &str) -> Result<ExecOutput, RuntimeError>;

    /// Read a file from the unit filesystem.
    async fn get_file(&self, unit: &Unit, path: &str) -> Result<Vec<u8>, RuntimeError>;
}

/// Shared handle to a runtime adapter.
pub type RuntimeHandle = Arc<dyn RuntimeClient>;
