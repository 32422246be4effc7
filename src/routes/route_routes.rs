//! Rutas de Route

use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::route_controller::RouteController;
use crate::dto::route_dto::{RouteResponse, UpdateRouteStatusRequest};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_route_router() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_route))
        .route("/:id/status", patch(update_route_status))
}

async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RouteResponse>> {
    let route = RouteController::new(state).get_by_id(id).await?;
    Ok(Json(route))
}

async fn update_route_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRouteStatusRequest>,
) -> AppResult<Json<RouteResponse>> {
    let route = RouteController::new(state).update_status(id, request).await?;
    Ok(Json(route))
}
