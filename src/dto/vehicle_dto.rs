//! DTOs de Vehicle

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::enums::{DoorType, InsulationGrade, VehicleStatus};
use crate::models::vehicle::Vehicle;

fn default_min_temp_capability() -> f64 {
    -25.0
}

/// Request para registrar un vehículo refrigerado
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 3, max = 20))]
    pub license_plate: String,

    #[validate(range(min = 1.0))]
    pub capacity_weight_kg: f64,

    #[validate(range(min = 0.1))]
    pub capacity_volume_m3: f64,

    pub insulation_grade: InsulationGrade,
    pub door_type: DoorType,

    #[serde(default)]
    pub has_strip_curtains: bool,

    /// °C por hora de tránsito, negativo = enfría
    #[validate(range(max = 0.0))]
    pub cooling_rate: f64,

    #[serde(default = "default_min_temp_capability")]
    pub min_temp_capability: f64,

    pub driver_name: Option<String>,
}

impl CreateVehicleRequest {
    pub fn into_model(self) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            license_plate: self.license_plate,
            capacity_weight_kg: self.capacity_weight_kg,
            capacity_volume_m3: self.capacity_volume_m3,
            insulation_grade: self.insulation_grade,
            door_type: self.door_type,
            has_strip_curtains: self.has_strip_curtains,
            cooling_rate: self.cooling_rate,
            min_temp_capability: self.min_temp_capability,
            status: VehicleStatus::Available,
            driver_id: self.driver_name.as_ref().map(|_| Uuid::new_v4()),
            driver_name: self.driver_name,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Response de vehículo para la API
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub license_plate: String,
    pub capacity_weight_kg: f64,
    pub capacity_volume_m3: f64,
    pub insulation_grade: InsulationGrade,
    pub door_type: DoorType,
    pub has_strip_curtains: bool,
    pub cooling_rate: f64,
    pub min_temp_capability: f64,
    pub status: VehicleStatus,
    pub driver_name: Option<String>,
    pub created_at: String,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            license_plate: vehicle.license_plate,
            capacity_weight_kg: vehicle.capacity_weight_kg,
            capacity_volume_m3: vehicle.capacity_volume_m3,
            insulation_grade: vehicle.insulation_grade,
            door_type: vehicle.door_type,
            has_strip_curtains: vehicle.has_strip_curtains,
            cooling_rate: vehicle.cooling_rate,
            min_temp_capability: vehicle.min_temp_capability,
            status: vehicle.status,
            driver_name: vehicle.driver_name,
            created_at: vehicle.created_at.to_rfc3339(),
        }
    }
}
