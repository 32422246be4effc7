//! Rutas de Shipment

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::shipment_controller::ShipmentController;
use crate::dto::shipment_dto::{CreateShipmentRequest, ShipmentResponse};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_shipment_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shipments).post(create_shipment))
        .route("/:id", get(get_shipment))
}

async fn create_shipment(
    State(state): State<AppState>,
    Json(request): Json<CreateShipmentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ShipmentResponse>>)> {
    let response = ShipmentController::new(state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_shipments(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ShipmentResponse>>> {
    let shipments = ShipmentController::new(state).list().await?;
    Ok(Json(shipments))
}

async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ShipmentResponse>> {
    let shipment = ShipmentController::new(state).get_by_id(id).await?;
    Ok(Json(shipment))
}
