use uuid::Uuid;
use validator::Validate;

use crate::dto::shipment_dto::{CreateShipmentRequest, ShipmentResponse};
use crate::dto::ApiResponse;
use crate::repositories::shipment_repository::ShipmentRepository;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct ShipmentController {
    repository: ShipmentRepository,
}

impl ShipmentController {
    pub fn new(state: AppState) -> Self {
        Self {
            repository: ShipmentRepository::new(state.store.clone()),
        }
    }

    pub async fn create(
        &self,
        request: CreateShipmentRequest,
    ) -> AppResult<ApiResponse<ShipmentResponse>> {
        request.validate()?;

        let shipment = self.repository.create(request.into_model()?).await?;

        Ok(ApiResponse::success_with_message(
            ShipmentResponse::from(shipment),
            "Envío registrado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ShipmentResponse> {
        let shipment = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shipment not found".to_string()))?;
        Ok(ShipmentResponse::from(shipment))
    }

    pub async fn list(&self) -> AppResult<Vec<ShipmentResponse>> {
        let shipments = self.repository.list().await?;
        Ok(shipments.into_iter().map(ShipmentResponse::from).collect())
    }
}
