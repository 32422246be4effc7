//! Rutas del subsistema de planificación

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::planning_controller::PlanningController;
use crate::dto::planning_dto::{
    CancelResponse, JobListItem, JobListQuery, JobStatusResponse, MapDataQuery, MapDataResponse,
    PlanRequest, PlanResponse, ViolationsResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_planning_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_plan).get(list_jobs))
        .route("/map-data", get(map_data))
        .route("/:job_id", get(get_status))
        .route("/:job_id/violations", get(get_violations))
        .route("/:job_id/cancel", post(cancel_job))
}

/// POST /api/planning - crear y encolar un trabajo de planificación
async fn create_plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> AppResult<(StatusCode, Json<PlanResponse>)> {
    let response = PlanningController::new(state).create_plan(request).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// GET /api/planning - listar trabajos recientes
async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> AppResult<Json<Vec<JobListItem>>> {
    let jobs = PlanningController::new(state).list_jobs(query).await?;
    Ok(Json(jobs))
}

/// GET /api/planning/:job_id - estado del trabajo
async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<JobStatusResponse>> {
    let status = PlanningController::new(state).get_status(job_id).await?;
    Ok(Json(status))
}

/// GET /api/planning/:job_id/violations - reporte de violaciones
async fn get_violations(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<ViolationsResponse>> {
    let report = PlanningController::new(state).get_violations(job_id).await?;
    Ok(Json(report))
}

/// GET /api/planning/map-data - depósito y rutas para el mapa
async fn map_data(
    State(state): State<AppState>,
    Query(query): Query<MapDataQuery>,
) -> AppResult<Json<MapDataResponse>> {
    let data = PlanningController::new(state).map_data(query).await?;
    Ok(Json(data))
}

/// POST /api/planning/:job_id/cancel - cancelar un trabajo
async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<CancelResponse>> {
    let response = PlanningController::new(state).cancel(job_id).await?;
    Ok(Json(response))
}
