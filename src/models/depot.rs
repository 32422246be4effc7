//! Modelo de Depot
//!
//! Depósito de origen de las rutas. Su ventana operativa define el
//! horizonte de planificación.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Depot {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,

    // Ventana operativa en minutos desde medianoche
    pub open_minutes: u32,
    pub close_minutes: u32,

    pub created_at: DateTime<Utc>,
}

impl Depot {
    pub fn new(
        name: String,
        address: String,
        latitude: f64,
        longitude: f64,
        open_minutes: u32,
        close_minutes: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            address,
            latitude,
            longitude,
            open_minutes,
            close_minutes,
            created_at: Utc::now(),
        }
    }
}
