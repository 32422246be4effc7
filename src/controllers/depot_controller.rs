use uuid::Uuid;
use validator::Validate;

use crate::dto::depot_dto::{CreateDepotRequest, DepotResponse};
use crate::dto::ApiResponse;
use crate::repositories::depot_repository::DepotRepository;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct DepotController {
    repository: DepotRepository,
}

impl DepotController {
    pub fn new(state: AppState) -> Self {
        Self {
            repository: DepotRepository::new(state.store.clone()),
        }
    }

    pub async fn create(
        &self,
        request: CreateDepotRequest,
    ) -> AppResult<ApiResponse<DepotResponse>> {
        request.validate()?;

        let depot = self.repository.create(request.into_model()?).await?;

        Ok(ApiResponse::success_with_message(
            DepotResponse::from(depot),
            "Depósito registrado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<DepotResponse> {
        let depot = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Depot not found".to_string()))?;
        Ok(DepotResponse::from(depot))
    }

    pub async fn list(&self) -> AppResult<Vec<DepotResponse>> {
        let depots = self.repository.list().await?;
        Ok(depots.into_iter().map(DepotResponse::from).collect())
    }
}
