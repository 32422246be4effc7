use uuid::Uuid;

use crate::models::enums::VehicleStatus;
use crate::models::vehicle::Vehicle;
use crate::repositories::store::Store;
use crate::utils::errors::{AppError, AppResult};

pub struct VehicleRepository {
    store: Store,
}

impl VehicleRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        let mut inner = self.store.write().await;

        // Verificar que la matrícula no esté registrada
        if inner
            .vehicles
            .values()
            .any(|v| v.license_plate == vehicle.license_plate)
        {
            return Err(AppError::Conflict(format!(
                "Vehicle with license plate '{}' already exists",
                vehicle.license_plate
            )));
        }

        inner.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let inner = self.store.read().await;
        Ok(inner.vehicles.get(&id).cloned())
    }

    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        let inner = self.store.read().await;
        let mut vehicles: Vec<Vehicle> = inner.vehicles.values().cloned().collect();
        vehicles.sort_by_key(|v| v.created_at);
        Ok(vehicles)
    }

    /// Snapshot de la flota disponible al inicio de un trabajo
    pub async fn find_available(&self) -> AppResult<Vec<Vehicle>> {
        let inner = self.store.read().await;
        let mut vehicles: Vec<Vehicle> = inner
            .vehicles
            .values()
            .filter(|v| v.is_available())
            .cloned()
            .collect();
        vehicles.sort_by_key(|v| v.id);
        Ok(vehicles)
    }

    pub async fn count_available(&self) -> AppResult<usize> {
        let inner = self.store.read().await;
        Ok(inner.vehicles.values().filter(|v| v.is_available()).count())
    }

    pub async fn update_status(&self, id: Uuid, status: VehicleStatus) -> AppResult<Vehicle> {
        let mut inner = self.store.write().await;
        let vehicle = inner
            .vehicles
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;
        vehicle.status = status;
        Ok(vehicle.clone())
    }
}
