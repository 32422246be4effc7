//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: configuración inmutable, almacén y
//! handle a la cola de trabajos.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::store::Store;
use crate::services::worker::QueueHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub store: Store,
    pub queue: QueueHandle,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, store: Store, queue: QueueHandle) -> Self {
        Self {
            config: Arc::new(config),
            store,
            queue,
        }
    }
}
