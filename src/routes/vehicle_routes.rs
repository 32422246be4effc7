//! Rutas de Vehicle

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{CreateVehicleRequest, VehicleResponse};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/:id", get(get_vehicle))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<VehicleResponse>>)> {
    let response = VehicleController::new(state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_vehicles(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<VehicleResponse>>> {
    let vehicles = VehicleController::new(state).list().await?;
    Ok(Json(vehicles))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<VehicleResponse>> {
    let vehicle = VehicleController::new(state).get_by_id(id).await?;
    Ok(Json(vehicle))
}
