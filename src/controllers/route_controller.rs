use uuid::Uuid;

use crate::dto::route_dto::{RouteResponse, UpdateRouteStatusRequest};
use crate::models::enums::RouteStatus;
use crate::repositories::route_repository::RouteRepository;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct RouteController {
    repository: RouteRepository,
}

impl RouteController {
    pub fn new(state: AppState) -> Self {
        Self {
            repository: RouteRepository::new(state.store.clone()),
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<RouteResponse> {
        let (route, stops) = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Route not found".to_string()))?;
        Ok(RouteResponse::from_route(route, stops))
    }

    /// Actualización optimista: una versión vieja se rechaza con
    /// CONFLICT y el llamador reintenta con la versión fresca
    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateRouteStatusRequest,
    ) -> AppResult<RouteResponse> {
        let status = RouteStatus::parse(&request.status).ok_or_else(|| {
            AppError::Validation(format!("Unknown route status '{}'", request.status))
        })?;

        let route = self
            .repository
            .update_status(id, status, request.version)
            .await?;
        let stops = self
            .repository
            .find_by_id(id)
            .await?
            .map(|(_, stops)| stops)
            .unwrap_or_default();
        Ok(RouteResponse::from_route(route, stops))
    }
}
