use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{CreateVehicleRequest, VehicleResponse};
use crate::dto::ApiResponse;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct VehicleController {
    repository: VehicleRepository,
}

impl VehicleController {
    pub fn new(state: AppState) -> Self {
        Self {
            repository: VehicleRepository::new(state.store.clone()),
        }
    }

    pub async fn create(
        &self,
        request: CreateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;

        let vehicle = self.repository.create(request.into_model()).await?;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehículo registrado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<VehicleResponse> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;
        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn list(&self) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.repository.list().await?;
        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }
}
