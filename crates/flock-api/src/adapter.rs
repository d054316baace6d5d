use async_trait::async_trait;
use flock_core::{
    ArtifactReport, ArtifactRequest, BatchReport, CommandReport, Engine, PartitionReport,
    PartitionRequest,
};
use flock_model::{ImageRef, ListScope, Unit, UnitName};

use crate::{error::ApiError, handler::ApiHandler};

/// [`ApiHandler`] delegating to an [`Engine`].
#[derive(Debug, Clone)]
pub struct EngineAdapter {
    engine: Engine,
}

impl EngineAdapter {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

#[async_trait]
impl ApiHandler for EngineAdapter {
    async fn list_units(&self, scope: ListScope) -> Result<Vec<Unit>, ApiError> {
        Ok(self.engine.list_units(scope).await?)
    }

    async fn list_images(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.engine.list_images().await?)
    }

    async fn create_unit(&self, image: ImageRef, name: UnitName) -> Result<Unit, ApiError> {
        Ok(self.engine.create_unit(image, name).await?)
    }

    async fn stop_unit(&self, name: &UnitName) -> Result<Unit, ApiError> {
        Ok(self.engine.stop_unit(name).await?)
    }

    async fn remove_unit(&self, name: &UnitName) -> Result<Unit, ApiError> {
        Ok(self.engine.remove_unit(name).await?)
    }

    async fn execute(&self, name: &UnitName, command: &str) -> Result<CommandReport, ApiError> {
        Ok(self.engine.execute(name, command).await?)
    }

    async fn stop_all(&self) -> Result<BatchReport, ApiError> {
        Ok(self.engine.stop_all().await?)
    }

    async fn remove_all(&self) -> Result<BatchReport, ApiError> {
        Ok(self.engine.remove_all().await?)
    }

    async fn run_partitioned(&self, req: PartitionRequest) -> Result<PartitionReport, ApiError> {
        Ok(self.engine.run_partitioned(req).await?)
    }

    async fn run_artifact_task(&self, req: ArtifactRequest) -> Result<ArtifactReport, ApiError> {
        Ok(self.engine.run_artifact_task(req).await?)
    }

    async fn read_activity(&self) -> Result<String, ApiError> {
        Ok(self.engine.read_activity().await?)
    }
}
