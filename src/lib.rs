//! Backend de planificación de rutas frigoríficas
//!
//! VRPTW con modelo de factibilidad termodinámica: constructor del
//! modelo, solver de búsqueda con ventanas horarias y disyunciones,
//! tracker de temperatura post-solución y orquestador asíncrono de
//! trabajos.

pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::cors::cors_middleware;
use crate::repositories::store::Store;
use crate::services::worker::QueueHandle;
use crate::state::AppState;

/// Construir el estado compartido y el receptor de la cola de trabajos
pub fn build_state(config: EnvironmentConfig) -> (AppState, mpsc::Receiver<Uuid>) {
    let (queue, rx) = QueueHandle::new(config.queue_capacity);
    let state = AppState::new(config, Store::new(), queue);
    (state, rx)
}

/// Construir el router completo de la API
pub fn build_router(state: AppState) -> Router {
    let cors = cors_middleware(&state.config.cors_origins);

    Router::new()
        .nest("/api/planning", routes::planning_routes::create_planning_router())
        .nest("/api/vehicles", routes::vehicle_routes::create_vehicle_router())
        .nest("/api/shipments", routes::shipment_routes::create_shipment_router())
        .nest("/api/routes", routes::route_routes::create_route_router())
        .nest("/api/depots", routes::depot_routes::create_depot_router())
        .layer(cors)
        .with_state(state)
}
