//! DTOs del subsistema de planificación
//!
//! Request de plan, polling de estado, reporte de violaciones y datos
//! para el mapa.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::enums::{JobErrorKind, JobState, PlanningStrategy};
use crate::models::job::{PlanSummary, PlanningJob, TemperatureViolation, UnassignedDiagnostic};
use crate::utils::time::minutes_to_hhmm;

/// Request para iniciar un trabajo de planificación
#[derive(Debug, Deserialize, Validate)]
pub struct PlanRequest {
    pub plan_date: NaiveDate,

    /// Depósito por referencia o coordenadas inline
    pub depot_id: Option<Uuid>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub depot_latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub depot_longitude: Option<f64>,

    /// Salida más temprana desde el depósito, formato "HH:MM"
    pub planned_departure_time: String,

    pub ambient_temperature: Option<f64>,
    pub initial_cargo_temperature: Option<f64>,

    #[validate(range(min = 10, max = 900))]
    pub time_limit_seconds: Option<u32>,

    pub strategy: Option<PlanningStrategy>,
}

/// Response inmediata al encolar el trabajo
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub job_id: Uuid,
    pub status: JobState,
    pub message: String,
    pub shipment_count: usize,
    pub vehicle_count: usize,
}

/// Estado completo del trabajo para polling
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobState,
    pub progress: u8,
    pub plan_date: NaiveDate,

    pub created_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_summary: Option<PlanSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub route_ids: Vec<Uuid>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unassigned_shipment_ids: Vec<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<JobErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<PlanningJob> for JobStatusResponse {
    fn from(job: PlanningJob) -> Self {
        let duration_seconds = job.duration_seconds();
        Self {
            job_id: job.id,
            status: job.state,
            progress: job.progress,
            plan_date: job.plan_date,
            created_at: job.created_at.to_rfc3339(),
            started_at: job.started_at.map(|dt| dt.to_rfc3339()),
            finished_at: job.finished_at.map(|dt| dt.to_rfc3339()),
            duration_seconds,
            result_summary: job.result_summary,
            route_ids: job.route_ids,
            unassigned_shipment_ids: job.unassigned_shipment_ids,
            error_kind: job.error_kind,
            error_message: job.error_message,
        }
    }
}

/// Item del listado de trabajos
#[derive(Debug, Serialize)]
pub struct JobListItem {
    pub job_id: Uuid,
    pub status: JobState,
    pub progress: u8,
    pub plan_date: NaiveDate,
    pub created_at: String,
    pub routes_created: usize,
}

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub plan_date: Option<NaiveDate>,
    pub status: Option<JobState>,
    pub limit: Option<usize>,
}

/// Resumen del reporte de violaciones
#[derive(Debug, Serialize)]
pub struct ViolationsSummary {
    pub total_temp_violations: usize,
    pub total_unassigned: usize,
}

/// Reporte de violaciones del trabajo
#[derive(Debug, Serialize)]
pub struct ViolationsResponse {
    pub job_id: Uuid,
    pub temperature_violations: Vec<TemperatureViolation>,
    pub unassigned_shipments: Vec<UnassignedDiagnostic>,
    pub summary: ViolationsSummary,
}

/// Query del endpoint de datos para el mapa
#[derive(Debug, Deserialize)]
pub struct MapDataQuery {
    pub plan_date: NaiveDate,
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize)]
pub struct MapStopData {
    pub sequence: u32,
    #[serde(rename = "shipmentId")]
    pub shipment_id: Uuid,
    #[serde(rename = "orderNumber")]
    pub order_number: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "arrivalTime")]
    pub arrival_time: String,
    #[serde(rename = "departureTime")]
    pub departure_time: String,
    pub temperature: f64,
    #[serde(rename = "tempLimit")]
    pub temp_limit: f64,
    pub feasible: bool,
}

#[derive(Debug, Serialize)]
pub struct MapRouteData {
    #[serde(rename = "vehicleId")]
    pub vehicle_id: Uuid,
    #[serde(rename = "licensePlate")]
    pub license_plate: String,
    #[serde(rename = "totalDistanceKm")]
    pub total_distance_km: f64,
    #[serde(rename = "totalTimeMinutes")]
    pub total_time_minutes: i64,
    pub stops: Vec<MapStopData>,
}

#[derive(Debug, Serialize)]
pub struct MapDataResponse {
    pub depot: Option<MapPoint>,
    pub routes: Vec<MapRouteData>,
}

impl MapStopData {
    pub fn from_stop(stop: &crate::models::route::RouteStop) -> Self {
        Self {
            sequence: stop.sequence,
            shipment_id: stop.shipment_id,
            order_number: stop.order_number.clone(),
            address: stop.address.clone(),
            lat: stop.latitude,
            lon: stop.longitude,
            arrival_time: minutes_to_hhmm(stop.arrival_minutes),
            departure_time: minutes_to_hhmm(stop.departure_minutes),
            temperature: stop.predicted_arrival_temp,
            temp_limit: stop.temp_ceiling,
            feasible: stop.is_temp_feasible,
        }
    }
}

/// Response al cancelar un trabajo
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub job_id: Uuid,
    pub status: JobState,
    pub message: String,
}
