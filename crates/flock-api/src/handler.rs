use async_trait::async_trait;
use flock_core::{
    ArtifactReport, ArtifactRequest, BatchReport, CommandReport, PartitionReport, PartitionRequest,
};
use flock_model::{ImageRef, ListScope, Unit, UnitName};

use crate::error::ApiError;

/// Backend of the HTTP routes.
///
/// [`crate::EngineAdapter`] delegates straight to the engine; wrap it to add
/// authentication, quotas and similar concerns.
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    async fn list_units(&self, scope: ListScope) -> Result<Vec<Unit>, ApiError>;

    async fn list_images(&self) -> Result<Vec<String>, ApiError>;

    async fn create_unit(&self, image: ImageRef, name: UnitName) -> Result<Unit, ApiError>;

    async fn stop_unit(&self, name: &UnitName) -> Result<Unit, ApiError>;

    async fn remove_unit(&self, name: &UnitName) -> Result<Unit, ApiError>;

    async fn execute(&self, name: &UnitName, command: &str) -> Result<CommandReport, ApiError>;

    async fn stop_all(&self) -> Result<BatchReport, ApiError>;

    async fn remove_all(&self) -> Result<BatchReport, ApiError>;

    async fn run_partitioned(&self, req: PartitionRequest) -> Result<PartitionReport, ApiError>;

    async fn run_artifact_task(&self, req: ArtifactRequest) -> Result<ArtifactReport, ApiError>;

    /// Full activity log text.
    async fn read_activity(&self) -> Result<String, ApiError>;
}
