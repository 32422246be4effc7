use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::enums::RouteStatus;
use crate::models::route::{Route, RouteStop};
use crate::repositories::store::Store;
use crate::utils::errors::{AppError, AppResult};

pub struct RouteRepository {
    store: Store,
}

impl RouteRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<(Route, Vec<RouteStop>)>> {
        let inner = self.store.read().await;
        Ok(inner.routes.get(&id).map(|route| {
            let stops = inner.route_stops.get(&id).cloned().unwrap_or_default();
            (route.clone(), stops)
        }))
    }

    /// Rutas de una fecha de plan, opcionalmente filtradas por trabajo
    pub async fn find_by_plan_date(
        &self,
        plan_date: NaiveDate,
        job_id: Option<Uuid>,
    ) -> AppResult<Vec<(Route, Vec<RouteStop>)>> {
        let inner = self.store.read().await;
        let mut routes: Vec<(Route, Vec<RouteStop>)> = inner
            .routes
            .values()
            .filter(|r| r.plan_date == plan_date)
            .filter(|r| job_id.map(|id| r.job_id == id).unwrap_or(true))
            .map(|route| {
                let stops = inner
                    .route_stops
                    .get(&route.id)
                    .cloned()
                    .unwrap_or_default();
                (route.clone(), stops)
            })
            .collect();
        routes.sort_by_key(|(r, _)| (r.created_at, r.id));
        Ok(routes)
    }

    /// Actualización de estado con concurrencia optimista: una escritura
    /// con versión vieja se rechaza con CONFLICT y el llamador reintenta
    pub async fn update_status(
        &self,
        id: Uuid,
        status: RouteStatus,
        expected_version: i64,
    ) -> AppResult<Route> {
        let mut inner = self.store.write().await;
        let route = inner
            .routes
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Route not found".to_string()))?;

        if route.version != expected_version {
            return Err(AppError::Conflict(format!(
                "Route version mismatch: expected {}, found {}",
                expected_version, route.version
            )));
        }

        route.status = status;
        route.version += 1;
        Ok(route.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::SlaTier;
    use chrono::Utc;

    fn test_route(plan_date: NaiveDate, job_id: Uuid) -> Route {
        Route {
            id: Uuid::new_v4(),
            route_code: "R-TEST".to_string(),
            plan_date,
            job_id,
            vehicle_id: Uuid::new_v4(),
            license_plate: "AAA-111".to_string(),
            driver_id: None,
            driver_name: None,
            status: RouteStatus::Scheduled,
            total_stops: 1,
            total_distance_meters: 1000,
            total_duration_minutes: 30,
            total_weight_kg: 100.0,
            total_volume_m3: 1.0,
            initial_temperature: -5.0,
            predicted_final_temp: -4.0,
            predicted_max_temp: -4.0,
            is_temperature_feasible: true,
            departure_minutes: 480,
            return_minutes: 510,
            depot_latitude: 25.0330,
            depot_longitude: 121.5654,
            version: 1,
            created_at: Utc::now(),
        }
    }

    fn test_stop(route_id: Uuid) -> RouteStop {
        RouteStop {
            id: Uuid::new_v4(),
            route_id,
            shipment_id: Uuid::new_v4(),
            order_number: "ORD-1".to_string(),
            address: "Dirección 1".to_string(),
            latitude: 25.05,
            longitude: 121.58,
            sequence: 1,
            arrival_minutes: 485,
            departure_minutes: 500,
            service_duration_minutes: 15,
            wait_minutes: 0,
            target_window_index: 0,
            distance_from_prev_meters: 500,
            travel_time_from_prev_minutes: 5,
            predicted_arrival_temp: -4.5,
            transit_temp_rise: 0.3,
            service_temp_rise: 0.2,
            cooling_applied: -0.2,
            predicted_departure_temp: -4.3,
            is_temp_feasible: true,
            temp_ceiling: 5.0,
            sla_tier: SlaTier::Strict,
        }
    }

    #[tokio::test]
    async fn test_optimistic_lock_rejects_stale_version() {
        let store = Store::new();
        let repo = RouteRepository::new(store.clone());
        let plan_date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let route = test_route(plan_date, Uuid::new_v4());
        let route_id = route.id;

        {
            let mut inner = store.write().await;
            inner.route_stops.insert(route_id, vec![test_stop(route_id)]);
            inner.routes.insert(route_id, route);
        }

        // Primera actualización con la versión correcta
        let updated = repo
            .update_status(route_id, RouteStatus::InProgress, 1)
            .await
            .unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.status, RouteStatus::InProgress);

        // Escritura con versión vieja: CONFLICT
        let stale = repo.update_status(route_id, RouteStatus::Completed, 1).await;
        assert!(matches!(stale, Err(AppError::Conflict(_))));

        // Reintento con la versión fresca
        let retried = repo
            .update_status(route_id, RouteStatus::Completed, 2)
            .await
            .unwrap();
        assert_eq!(retried.version, 3);
    }

    #[tokio::test]
    async fn test_find_by_plan_date_filters_by_job() {
        let store = Store::new();
        let repo = RouteRepository::new(store.clone());
        let plan_date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let job_a = Uuid::new_v4();
        let job_b = Uuid::new_v4();

        {
            let mut inner = store.write().await;
            let route_a = test_route(plan_date, job_a);
            let route_b = test_route(plan_date, job_b);
            inner.routes.insert(route_a.id, route_a);
            inner.routes.insert(route_b.id, route_b);
        }

        assert_eq!(repo.find_by_plan_date(plan_date, None).await.unwrap().len(), 2);
        let filtered = repo.find_by_plan_date(plan_date, Some(job_a)).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].0.job_id, job_a);
    }
}
