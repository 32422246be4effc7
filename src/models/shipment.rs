//! Modelo de Shipment
//!
//! Envío con ventanas horarias múltiples (1 o 2 intervalos disjuntos por
//! día), techo de temperatura de carga y nivel de SLA.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::enums::{ShipmentStatus, SlaTier};
use crate::utils::time::minutes_to_hhmm;

/// Ventana horaria en minutos desde medianoche, start < end
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_minutes: u32,
    pub end_minutes: u32,
}

impl TimeWindow {
    pub fn new(start_minutes: u32, end_minutes: u32) -> Self {
        Self {
            start_minutes,
            end_minutes,
        }
    }

    pub fn display(&self) -> String {
        format!(
            "{}-{}",
            minutes_to_hhmm(self.start_minutes),
            minutes_to_hhmm(self.end_minutes)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub order_number: String,
    pub delivery_address: String,
    pub latitude: f64,
    pub longitude: f64,

    // Demanda
    pub weight_kg: f64,
    pub volume_m3: f64,

    // Ventanas horarias (1 o 2 intervalos disjuntos)
    pub time_windows: Vec<TimeWindow>,
    pub service_duration_minutes: u32,

    // Restricciones de temperatura
    pub temp_ceiling: f64,
    pub temp_floor: Option<f64>,

    // SLA y prioridad
    pub sla_tier: SlaTier,
    /// Prioridad 0-100; a mayor prioridad, más resiste el descarte
    pub priority: i32,

    pub status: ShipmentStatus,
    pub route_id: Option<Uuid>,
    pub route_sequence: Option<u32>,

    pub created_at: DateTime<Utc>,
}

impl Shipment {
    pub fn is_pending(&self) -> bool {
        self.status == ShipmentStatus::Pending
    }

    pub fn windows_display(&self) -> String {
        self.time_windows
            .iter()
            .map(|tw| tw.display())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
