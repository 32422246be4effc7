//! Modelo de PlanningJob
//!
//! Trabajo asíncrono de planificación. El estado es la fuente única de
//! verdad para el polling: transiciones monótonas y progreso no
//! decreciente. El trabajo almacena el reporte de violaciones para que
//! el endpoint de diagnóstico funcione también en trabajos FAILED.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::enums::{DiagnosticKind, JobErrorKind, JobState, PlanningStrategy, SlaTier};

/// Parámetros capturados al crear el trabajo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobParameters {
    pub depot_latitude: f64,
    pub depot_longitude: f64,
    pub depot_address: String,
    pub planned_departure_minutes: u32,
    pub horizon_end_minutes: u32,
    pub ambient_temperature: f64,
    pub initial_cargo_temperature: f64,
    pub time_limit_seconds: u32,
    pub strategy: PlanningStrategy,
}

/// Resumen de resultados de un plan completado
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub routes_created: usize,
    pub vehicles_used: usize,
    pub shipments_assigned: usize,
    pub shipments_unassigned: usize,
    pub total_distance_km: f64,
    pub total_duration_minutes: i64,
    pub total_cost: i64,
    pub solver_status: String,
    pub solver_time_seconds: f64,
    pub is_feasible: bool,
}

/// Causa probable de un envío sin asignar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikelyReason {
    #[serde(rename = "type")]
    pub kind: DiagnosticKind,
    pub message: String,
    pub parameter: String,
    pub current_value: String,
    pub constraint_value: String,
}

/// Diagnóstico de un envío sin asignar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnassignedDiagnostic {
    pub shipment_id: Uuid,
    pub order_number: String,
    pub address: String,
    pub time_windows: String,
    pub temp_limit: f64,
    pub sla_tier: SlaTier,
    pub weight_kg: f64,
    pub likely_reasons: Vec<LikelyReason>,
}

/// Parada con violación de temperatura predicha
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureViolation {
    pub shipment_id: Uuid,
    pub order_number: String,
    pub address: String,
    pub sequence: u32,
    pub predicted_temp: f64,
    pub temp_limit: f64,
    pub violation_amount: f64,
    pub sla_tier: SlaTier,
}

/// Reporte de violaciones persistido en el trabajo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanViolations {
    pub temperature_violations: Vec<TemperatureViolation>,
    pub unassigned_shipments: Vec<UnassignedDiagnostic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningJob {
    pub id: Uuid,
    pub plan_date: NaiveDate,
    pub state: JobState,
    /// Progreso 0-100, monótono no decreciente
    pub progress: u8,

    pub parameters: JobParameters,

    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    pub route_ids: Vec<Uuid>,
    pub unassigned_shipment_ids: Vec<Uuid>,
    pub result_summary: Option<PlanSummary>,
    pub violations: Option<PlanViolations>,

    pub error_kind: Option<JobErrorKind>,
    pub error_message: Option<String>,
}

impl PlanningJob {
    pub fn new(plan_date: NaiveDate, parameters: JobParameters) -> Self {
        Self {
            id: Uuid::new_v4(),
            plan_date,
            state: JobState::Pending,
            progress: 0,
            parameters,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            route_ids: Vec::new(),
            unassigned_shipment_ids: Vec::new(),
            result_summary: None,
            violations: None,
            error_kind: None,
            error_message: None,
        }
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }
}
