//! Rutas de Depot

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::depot_controller::DepotController;
use crate::dto::depot_dto::{CreateDepotRequest, DepotResponse};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_depot_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_depots).post(create_depot))
        .route("/:id", get(get_depot))
}

async fn create_depot(
    State(state): State<AppState>,
    Json(request): Json<CreateDepotRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DepotResponse>>)> {
    let response = DepotController::new(state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_depots(State(state): State<AppState>) -> AppResult<Json<Vec<DepotResponse>>> {
    let depots = DepotController::new(state).list().await?;
    Ok(Json(depots))
}

async fn get_depot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DepotResponse>> {
    let depot = DepotController::new(state).get_by_id(id).await?;
    Ok(Json(depot))
}
