//! Modelos de Route y RouteStop
//!
//! Una ruta pertenece a un trabajo de planificación y posee sus paradas.
//! Las paradas referencian envíos por id (sin punteros inversos). La ruta
//! lleva un contador de versión para actualizaciones optimistas.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::enums::{RouteStatus, SlaTier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub route_code: String,
    pub plan_date: NaiveDate,
    pub job_id: Uuid,

    pub vehicle_id: Uuid,
    pub license_plate: String,
    pub driver_id: Option<Uuid>,
    pub driver_name: Option<String>,

    pub status: RouteStatus,

    // Totales
    pub total_stops: u32,
    pub total_distance_meters: i64,
    pub total_duration_minutes: i64,
    pub total_weight_kg: f64,
    pub total_volume_m3: f64,

    // Temperatura predicha
    pub initial_temperature: f64,
    pub predicted_final_temp: f64,
    pub predicted_max_temp: f64,
    pub is_temperature_feasible: bool,

    // Horarios en minutos desde medianoche
    pub departure_minutes: u32,
    pub return_minutes: u32,

    // Depósito de origen
    pub depot_latitude: f64,
    pub depot_longitude: f64,

    /// Contador de versión para concurrencia optimista; una escritura
    /// con versión vieja se rechaza con CONFLICT
    pub version: i64,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStop {
    pub id: Uuid,
    pub route_id: Uuid,
    pub shipment_id: Uuid,
    pub order_number: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,

    /// Secuencia 1-based, contigua dentro de la ruta
    pub sequence: u32,

    // Horarios en minutos desde medianoche
    pub arrival_minutes: u32,
    pub departure_minutes: u32,
    pub service_duration_minutes: u32,
    pub wait_minutes: u32,
    pub target_window_index: usize,

    // Tramo desde la parada anterior
    pub distance_from_prev_meters: i64,
    pub travel_time_from_prev_minutes: i64,

    // Predicción termodinámica
    pub predicted_arrival_temp: f64,
    pub transit_temp_rise: f64,
    pub service_temp_rise: f64,
    pub cooling_applied: f64,
    pub predicted_departure_temp: f64,
    pub is_temp_feasible: bool,

    // Restricción del envío
    pub temp_ceiling: f64,
    pub sla_tier: SlaTier,
}
