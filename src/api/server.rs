//! HTTP server implementation for the project/task API.
//!
//! All routes are scoped to the caller's identity: the upstream auth layer
//! resolves the session to an owner id and forwards it in the `x-owner-id`
//! header, and every handler passes that id explicitly into the service
//! layer. There is no ambient per-process credential state.

use axum::{
    Router,
    extract::{FromRequestParts, Json, Path, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::board::Board;
use crate::db::Database;
use crate::error::{ApiError, ApiResult};
use crate::types::{Project, ProjectPatch, TaskPatch};

/// API server state shared across handlers.
#[derive(Clone)]
pub struct ApiServer {
    /// Reference to the board database.
    db: Arc<Database>,
}

impl ApiServer {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

/// The authenticated caller's owner id, taken from the `x-owner-id` header
/// set by the upstream auth layer.
#[derive(Debug, Clone)]
pub struct Owner(pub String);

/// Rejection for requests that arrive without a resolved identity.
#[derive(Debug)]
pub struct MissingOwner;

impl IntoResponse for MissingOwner {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "code": "UNAUTHENTICATED",
                "message": "Missing x-owner-id header",
            })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = MissingOwner;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-owner-id")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| Owner(id.to_string()))
            .ok_or(MissingOwner)
    }
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Request body for creating a project or a task.
#[derive(Debug, Deserialize)]
struct CreateRequest {
    title: String,
    description: Option<String>,
}

/// Request body for moving a task on the board.
///
/// `stage` is the destination column label; `index` is the position within
/// that column's visible sequence (clamped to the column length).
#[derive(Debug, Deserialize)]
struct MoveRequest {
    stage: String,
    index: usize,
}

/// Confirmation body for project deletion.
#[derive(Serialize)]
struct DeletedResponse {
    message: String,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_projects(
    State(state): State<ApiServer>,
    Owner(owner): Owner,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state.db().get_projects(&owner).map_err(ApiError::from)?;
    Ok(Json(projects))
}

async fn create_project(
    State(state): State<ApiServer>,
    Owner(owner): Owner,
    Json(body): Json<CreateRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state
        .db()
        .create_project(&owner, &body.title, body.description.as_deref())
        .map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(
    State(state): State<ApiServer>,
    Owner(owner): Owner,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Project>> {
    let project = state
        .db()
        .get_project(&owner, &project_id)
        .map_err(ApiError::from)?;
    Ok(Json(project))
}

async fn update_project(
    State(state): State<ApiServer>,
    Owner(owner): Owner,
    Path(project_id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> ApiResult<Json<Project>> {
    let project = state
        .db()
        .update_project(&owner, &project_id, &patch)
        .map_err(ApiError::from)?;
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<ApiServer>,
    Owner(owner): Owner,
    Path(project_id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    state
        .db()
        .delete_project(&owner, &project_id)
        .map_err(ApiError::from)?;
    Ok(Json(DeletedResponse {
        message: "Project deleted successfully".to_string(),
    }))
}

async fn get_board(
    State(state): State<ApiServer>,
    Owner(owner): Owner,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Board>> {
    let project = state
        .db()
        .get_project(&owner, &project_id)
        .map_err(ApiError::from)?;
    Ok(Json(Board::project(&project.tasks)))
}

async fn add_task(
    State(state): State<ApiServer>,
    Owner(owner): Owner,
    Path(project_id): Path<String>,
    Json(body): Json<CreateRequest>,
) -> ApiResult<Json<Project>> {
    let project = state
        .db()
        .add_task(&owner, &project_id, &body.title, body.description.as_deref())
        .map_err(ApiError::from)?;
    Ok(Json(project))
}

async fn update_task(
    State(state): State<ApiServer>,
    Owner(owner): Owner,
    Path((project_id, task_id)): Path<(String, String)>,
    Json(patch): Json<TaskPatch>,
) -> ApiResult<Json<Project>> {
    let project = state
        .db()
        .update_task(&owner, &project_id, &task_id, &patch)
        .map_err(ApiError::from)?;
    Ok(Json(project))
}

async fn move_task(
    State(state): State<ApiServer>,
    Owner(owner): Owner,
    Path((project_id, task_id)): Path<(String, String)>,
    Json(body): Json<MoveRequest>,
) -> ApiResult<Json<Project>> {
    let stage = crate::types::Stage::from_str(&body.stage)
        .ok_or_else(|| ApiError::invalid_stage(&body.stage))?;
    let project = state
        .db()
        .move_task(&owner, &project_id, &task_id, stage, body.index)
        .map_err(ApiError::from)?;
    Ok(Json(project))
}

async fn delete_task(
    State(state): State<ApiServer>,
    Owner(owner): Owner,
    Path((project_id, task_id)): Path<(String, String)>,
) -> ApiResult<Json<Project>> {
    let project = state
        .db()
        .delete_task(&owner, &project_id, &task_id)
        .map_err(ApiError::from)?;
    Ok(Json(project))
}

/// Build the router with all routes.
fn build_router(state: ApiServer) -> Router {
    // Permissive CORS so the board UI can live on another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{project_id}",
            get(get_project)
                .put(update_project)
                .delete(delete_project),
        )
        .route("/api/projects/{project_id}/board", get(get_board))
        .route("/api/projects/{project_id}/tasks", post(add_task))
        .route(
            "/api/projects/{project_id}/tasks/{task_id}",
            axum::routing::put(update_task).delete(delete_task),
        )
        .route(
            "/api/projects/{project_id}/tasks/{task_id}/move",
            post(move_task),
        )
        .route("/api/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve the API until ctrl-c.
pub async fn run(db: Arc<Database>, port: u16) -> anyhow::Result<()> {
    let state = ApiServer::new(db);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("API server listening on http://{}", bound_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
