//! Enums del dominio
//!
//! Este módulo define los tipos enumerados del sistema. Los grados de
//! aislamiento y tipos de puerta llevan asociados sus coeficientes
//! termodinámicos.

use serde::{Deserialize, Serialize};

/// Grado de aislamiento del vehículo.
///
/// Determina el coeficiente de transferencia de calor (valor K) usado en
/// la fórmula: ΔT_drive = Horas_viaje × (T_ambiente − T_actual) × K
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsulationGrade {
    Premium,
    Standard,
    Basic,
}

impl InsulationGrade {
    /// Coeficiente de transferencia de calor para este grado
    pub fn k_value(&self) -> f64 {
        match self {
            InsulationGrade::Premium => 0.02,
            InsulationGrade::Standard => 0.05,
            InsulationGrade::Basic => 0.10,
        }
    }
}

/// Tipo de puerta del vehículo.
///
/// Determina el coeficiente de pérdida de calor durante el servicio:
/// ΔT_svc = Horas_servicio × C_puerta × (1 − 0.5 × cortina)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoorType {
    Roll,
    Swing,
}

impl DoorType {
    /// Coeficiente de puerta para este tipo
    pub fn coefficient(&self) -> f64 {
        match self {
            DoorType::Roll => 0.8,
            DoorType::Swing => 1.2,
        }
    }
}

/// Nivel de SLA que determina la dureza de las restricciones
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlaTier {
    Strict,
    Standard,
}

impl SlaTier {
    /// Los envíos STRICT no admiten violaciones ni descartes con penalidad
    pub fn is_hard_constraint(&self) -> bool {
        matches!(self, SlaTier::Strict)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlaTier::Strict => "STRICT",
            SlaTier::Standard => "STANDARD",
        }
    }
}

/// Ciclo de vida de un envío
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Failed,
    Cancelled,
}

/// Disponibilidad del vehículo
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Available,
    InUse,
    Maintenance,
    Offline,
}

/// Ciclo de vida de una ruta
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Planning,
    Scheduled,
    InProgress,
    Completed,
    Aborted,
}

impl RouteStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PLANNING" => Some(RouteStatus::Planning),
            "SCHEDULED" => Some(RouteStatus::Scheduled),
            "IN_PROGRESS" => Some(RouteStatus::InProgress),
            "COMPLETED" => Some(RouteStatus::Completed),
            "ABORTED" => Some(RouteStatus::Aborted),
            _ => None,
        }
    }
}

/// Estado de un trabajo de planificación.
///
/// Las transiciones son monótonas: PENDING → RUNNING → COMPLETED/FAILED.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Clase de error con la que falló un trabajo
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobErrorKind {
    Precondition,
    Timeout,
    Infeasible,
    Cancelled,
    Internal,
}

/// Estrategia de optimización del plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanningStrategy {
    MinimizeVehicles,
    MinimizeDistance,
}

/// Causa probable de que un envío quede sin asignar
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    TimeWindow,
    StrictSla,
    Temperature,
    CapacityOrRouting,
}
