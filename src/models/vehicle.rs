//! Modelo de Vehicle
//!
//! Vehículo refrigerado con sus propiedades termodinámicas: grado de
//! aislamiento, tipo de puerta, cortina de tiras y tasa de enfriamiento.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::enums::{DoorType, InsulationGrade, VehicleStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub license_plate: String,

    // Capacidad
    pub capacity_weight_kg: f64,
    pub capacity_volume_m3: f64,

    // Propiedades termodinámicas
    pub insulation_grade: InsulationGrade,
    pub door_type: DoorType,
    pub has_strip_curtains: bool,
    /// Cambio de temperatura por refrigeración activa, por hora de
    /// tránsito (negativo = enfría)
    pub cooling_rate: f64,
    /// Temperatura mínima que la unidad frigorífica puede mantener
    pub min_temp_capability: f64,

    // Estado operativo
    pub status: VehicleStatus,

    // Conductor asignado
    pub driver_id: Option<Uuid>,
    pub driver_name: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn is_available(&self) -> bool {
        self.status == VehicleStatus::Available
    }

    /// Valor K según el grado de aislamiento
    pub fn k_value(&self) -> f64 {
        self.insulation_grade.k_value()
    }

    /// Coeficiente de puerta según el tipo
    pub fn door_coefficient(&self) -> f64 {
        self.door_type.coefficient()
    }
}
