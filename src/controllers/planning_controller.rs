//! Controller del subsistema de planificación
//!
//! Orquesta el lado request del ciclo de vida: validación, chequeo de
//! precondiciones, creación del trabajo PENDING y encolado. El lado
//! asíncrono (solver, progreso, persistencia) vive en el worker.

use uuid::Uuid;
use validator::Validate;

use crate::dto::planning_dto::{
    CancelResponse, JobListItem, JobListQuery, JobStatusResponse, MapDataQuery, MapDataResponse,
    MapPoint, MapRouteData, MapStopData, PlanRequest, PlanResponse, ViolationsResponse,
    ViolationsSummary,
};
use crate::models::enums::{JobErrorKind, JobState, PlanningStrategy};
use crate::models::job::{JobParameters, PlanningJob};
use crate::repositories::depot_repository::DepotRepository;
use crate::repositories::job_repository::JobRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::repositories::shipment_repository::ShipmentRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::time::{parse_hhmm, MINUTES_PER_DAY};

pub struct PlanningController {
    state: AppState,
}

impl PlanningController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Crear un trabajo de planificación y encolarlo.
    /// Devuelve de inmediato; el solver corre en el pool de workers.
    pub async fn create_plan(&self, request: PlanRequest) -> AppResult<PlanResponse> {
        request.validate()?;

        let requested_departure = parse_hhmm(&request.planned_departure_time)?;

        // Resolver el depósito: referencia, coordenadas inline o default.
        // Su ventana operativa define el horizonte de planificación.
        let (depot_latitude, depot_longitude, depot_address, depot_open, horizon_end) =
            self.resolve_depot(&request).await?;

        // Ningún vehículo sale antes de que abra el depósito
        let departure_minutes = requested_departure.max(depot_open);

        if departure_minutes >= horizon_end {
            return Err(AppError::Validation(format!(
                "planned_departure_time {} is outside the depot operating window",
                request.planned_departure_time
            )));
        }

        let config = &self.state.config;
        let time_limit = request
            .time_limit_seconds
            .unwrap_or(config.solver_time_limit_default);
        if time_limit > config.solver_time_limit_max {
            return Err(AppError::Validation(format!(
                "time_limit_seconds {} exceeds the maximum of {}",
                time_limit, config.solver_time_limit_max
            )));
        }

        // Precondiciones: al menos un vehículo disponible y un envío pendiente
        let vehicle_count = VehicleRepository::new(self.state.store.clone())
            .count_available()
            .await?;
        if vehicle_count == 0 {
            return Err(AppError::PreconditionFailure(
                "No available vehicles found for planning".to_string(),
            ));
        }

        let shipment_count = ShipmentRepository::new(self.state.store.clone())
            .count_pending()
            .await?;
        if shipment_count == 0 {
            return Err(AppError::PreconditionFailure(
                "No pending shipments found for planning".to_string(),
            ));
        }

        let parameters = JobParameters {
            depot_latitude,
            depot_longitude,
            depot_address,
            planned_departure_minutes: departure_minutes,
            horizon_end_minutes: horizon_end,
            ambient_temperature: request
                .ambient_temperature
                .unwrap_or(config.default_ambient_temperature),
            initial_cargo_temperature: request
                .initial_cargo_temperature
                .unwrap_or(config.default_initial_vehicle_temp),
            time_limit_seconds: time_limit,
            strategy: request
                .strategy
                .unwrap_or(PlanningStrategy::MinimizeVehicles),
        };

        let job_repo = JobRepository::new(self.state.store.clone());
        let job = job_repo
            .create(PlanningJob::new(request.plan_date, parameters))
            .await?;

        self.state.queue.enqueue(job.id).await?;

        tracing::info!(
            "📋 Trabajo {} encolado: {} envíos, {} vehículos",
            job.id,
            shipment_count,
            vehicle_count
        );

        Ok(PlanResponse {
            job_id: job.id,
            status: JobState::Pending,
            message: "Planning job queued successfully. Poll the status endpoint for results."
                .to_string(),
            shipment_count,
            vehicle_count,
        })
    }

    async fn resolve_depot(
        &self,
        request: &PlanRequest,
    ) -> AppResult<(f64, f64, String, u32, u32)> {
        let config = &self.state.config;

        if let Some(depot_id) = request.depot_id {
            let depot = DepotRepository::new(self.state.store.clone())
                .find_by_id(depot_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Depot with id '{}' not found", depot_id))
                })?;
            return Ok((
                depot.latitude,
                depot.longitude,
                depot.address,
                depot.open_minutes,
                depot.close_minutes,
            ));
        }

        match (request.depot_latitude, request.depot_longitude) {
            (Some(lat), Some(lon)) => Ok((
                lat,
                lon,
                format!("({:.4}, {:.4})", lat, lon),
                0,
                MINUTES_PER_DAY - 1,
            )),
            (None, None) => Ok((
                config.default_depot_latitude,
                config.default_depot_longitude,
                config.default_depot_address.clone(),
                0,
                MINUTES_PER_DAY - 1,
            )),
            _ => Err(AppError::Validation(
                "depot_latitude and depot_longitude must be provided together".to_string(),
            )),
        }
    }

    pub async fn get_status(&self, job_id: Uuid) -> AppResult<JobStatusResponse> {
        let job = JobRepository::new(self.state.store.clone())
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Planning job not found".to_string()))?;
        Ok(JobStatusResponse::from(job))
    }

    pub async fn list_jobs(&self, query: JobListQuery) -> AppResult<Vec<JobListItem>> {
        let jobs = JobRepository::new(self.state.store.clone())
            .list(query.plan_date, query.status, query.limit.unwrap_or(20))
            .await?;

        Ok(jobs
            .into_iter()
            .map(|job| JobListItem {
                job_id: job.id,
                status: job.state,
                progress: job.progress,
                plan_date: job.plan_date,
                created_at: job.created_at.to_rfc3339(),
                routes_created: job
                    .result_summary
                    .as_ref()
                    .map(|s| s.routes_created)
                    .unwrap_or(0),
            })
            .collect())
    }

    /// Reporte de violaciones: paradas con violación térmica y envíos
    /// sin asignar con sus diagnósticos. Funciona también para trabajos
    /// FAILED (el reporte se persiste en el trabajo).
    pub async fn get_violations(&self, job_id: Uuid) -> AppResult<ViolationsResponse> {
        let job = JobRepository::new(self.state.store.clone())
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Planning job not found".to_string()))?;

        let violations = job.violations.unwrap_or_default();
        let summary = ViolationsSummary {
            total_temp_violations: violations.temperature_violations.len(),
            total_unassigned: violations.unassigned_shipments.len(),
        };

        Ok(ViolationsResponse {
            job_id,
            temperature_violations: violations.temperature_violations,
            unassigned_shipments: violations.unassigned_shipments,
            summary,
        })
    }

    /// Datos para el mapa: depósito + rutas con paradas ordenadas
    pub async fn map_data(&self, query: MapDataQuery) -> AppResult<MapDataResponse> {
        let routes = RouteRepository::new(self.state.store.clone())
            .find_by_plan_date(query.plan_date, query.job_id)
            .await?;

        let depot = routes.first().map(|(route, _)| MapPoint {
            lat: route.depot_latitude,
            lon: route.depot_longitude,
        });

        let map_routes = routes
            .into_iter()
            .map(|(route, mut stops)| {
                stops.sort_by_key(|s| s.sequence);
                MapRouteData {
                    vehicle_id: route.vehicle_id,
                    license_plate: route.license_plate,
                    total_distance_km: route.total_distance_meters as f64 / 1000.0,
                    total_time_minutes: route.total_duration_minutes,
                    stops: stops.iter().map(MapStopData::from_stop).collect(),
                }
            })
            .collect();

        Ok(MapDataResponse {
            depot,
            routes: map_routes,
        })
    }

    /// Cancelar un trabajo PENDING o RUNNING. La transición es
    /// RUNNING → FAILED con clase CANCELLED cuando el solver observa la
    /// bandera.
    pub async fn cancel(&self, job_id: Uuid) -> AppResult<CancelResponse> {
        let job_repo = JobRepository::new(self.state.store.clone());
        let job = job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Planning job not found".to_string()))?;

        if job.state.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Cannot cancel job in state {:?}",
                job.state
            )));
        }

        self.state.queue.cancel(job_id).await;

        // Un trabajo que aún no arrancó se marca FAILED directamente
        if job.state == JobState::Pending {
            job_repo
                .mark_failed(
                    job_id,
                    JobErrorKind::Cancelled,
                    "Job cancelled before execution".to_string(),
                    None,
                )
                .await?;
            return Ok(CancelResponse {
                job_id,
                status: JobState::Failed,
                message: "Job cancelled".to_string(),
            });
        }

        Ok(CancelResponse {
            job_id,
            status: JobState::Running,
            message: "Cancellation requested; the solver will stop at the next checkpoint"
                .to_string(),
        })
    }
}
