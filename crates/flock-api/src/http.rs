use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use flock_core::{ArtifactRequest, PartitionRequest};
use flock_model::{ImageRef, ListScope, UnitName};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{envelope::Envelope, error::ApiError, handler::ApiHandler};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build the router.
    ///
    /// Routes:
    /// - GET    /api/v1/units?all=bool        list units
    /// - POST   /api/v1/units                 create unit
    /// - POST   /api/v1/units/{name}/stop     stop unit
    /// - DELETE /api/v1/units/{name}          remove unit
    /// - POST   /api/v1/units/{name}/exec     run a command
    /// - POST   /api/v1/cluster/stop          stop every unit
    /// - DELETE /api/v1/cluster               remove every unit
    /// - POST   /api/v1/workloads/partitioned partitioned statistics run
    /// - POST   /api/v1/workloads/artifact    artifact task
    /// - GET    /api/v1/images                list images
    /// - GET    /api/v1/activity              activity log text
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/v1/units", get(list_units::<H>).post(create_unit::<H>))
            .route("/api/v1/units/{name}", delete(remove_unit::<H>))
            .route("/api/v1/units/{name}/stop", post(stop_unit::<H>))
            .route("/api/v1/units/{name}/exec", post(execute::<H>))
            .route("/api/v1/cluster", delete(remove_all::<H>))
            .route("/api/v1/cluster/stop", post(stop_all::<H>))
            .route("/api/v1/workloads/partitioned", post(run_partitioned::<H>))
            .route("/api/v1/workloads/artifact", post(run_artifact_task::<H>))
            .route("/api/v1/images", get(list_images::<H>))
            .route("/api/v1/activity", get(read_activity::<H>))
            .with_state(self.handler)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Include stopped units.
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUnitRequest {
    pub image: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecRequest {
    pub command: String,
}

#[derive(Debug, Serialize)]
struct ActivityResponse {
    log_content: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/units
async fn list_units<H: ApiHandler>(
    State(handler): State<Arc<H>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let units = handler.list_units(ListScope::from(query.all)).await?;
    Ok(ok(units))
}

/// POST /api/v1/units
async fn create_unit<H: ApiHandler>(
    State(handler): State<Arc<H>>,
    payload: Result<Json<CreateUnitRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let image = ImageRef::new(req.image).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    let name = unit_name(req.name)?;

    let unit = handler.create_unit(image, name).await?;
    Ok((StatusCode::CREATED, ok(unit)))
}

/// POST /api/v1/units/{name}/stop
async fn stop_unit<H: ApiHandler>(
    State(handler): State<Arc<H>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = handler.stop_unit(&unit_name(name)?).await?;
    Ok(ok(unit))
}

/// DELETE /api/v1/units/{name}
async fn remove_unit<H: ApiHandler>(
    State(handler): State<Arc<H>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = handler.remove_unit(&unit_name(name)?).await?;
    Ok(ok(unit))
}

/// POST /api/v1/units/{name}/exec
async fn execute<H: ApiHandler>(
    State(handler): State<Arc<H>>,
    Path(name): Path<String>,
    payload: Result<Json<ExecRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let name = unit_name(name)?;
    let req = body(payload)?;
    trace!(unit = %name, command = %req.command, "exec requested");

    let report = handler.execute(&name, &req.command).await?;
    Ok(ok(report))
}

/// POST /api/v1/cluster/stop
async fn stop_all<H: ApiHandler>(
    State(handler): State<Arc<H>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(handler.stop_all().await?))
}

/// DELETE /api/v1/cluster
async fn remove_all<H: ApiHandler>(
    State(handler): State<Arc<H>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(handler.remove_all().await?))
}

/// POST /api/v1/workloads/partitioned
async fn run_partitioned<H: ApiHandler>(
    State(handler): State<Arc<H>>,
    payload: Result<Json<PartitionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let report = handler.run_partitioned(body(payload)?).await?;
    Ok(ok(report))
}

/// POST /api/v1/workloads/artifact
///
/// An empty body runs the configured defaults.
async fn run_artifact_task<H: ApiHandler>(
    State(handler): State<Arc<H>>,
    payload: Result<Json<ArtifactRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(JsonRejection::MissingJsonContentType(_)) => ArtifactRequest::default(),
        Err(e) => return Err(ApiError::InvalidRequest(e.body_text())),
    };
    let report = handler.run_artifact_task(req).await?;
    Ok(ok(report))
}

/// GET /api/v1/images
async fn list_images<H: ApiHandler>(
    State(handler): State<Arc<H>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(handler.list_images().await?))
}

/// GET /api/v1/activity
async fn read_activity<H: ApiHandler>(
    State(handler): State<Arc<H>>,
) -> Result<impl IntoResponse, ApiError> {
    let log_content = handler.read_activity().await?;
    Ok(ok(ActivityResponse { log_content }))
}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope::ok(data))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::InvalidRequest(e.body_text()))
}

fn unit_name(raw: String) -> Result<UnitName, ApiError> {
    UnitName::new(raw).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}
