//! Repositorio de trabajos de planificación
//!
//! Hace cumplir el ciclo de vida del trabajo: transiciones monótonas
//! (PENDING → RUNNING → COMPLETED/FAILED), progreso no decreciente y
//! persistencia del plan todo-o-nada en una sola sección de escritura.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::models::enums::{JobErrorKind, JobState, ShipmentStatus};
use crate::models::job::{PlanSummary, PlanViolations, PlanningJob};
use crate::models::route::{Route, RouteStop};
use crate::repositories::store::Store;
use crate::utils::errors::{AppError, AppResult};

pub struct JobRepository {
    store: Store,
}

impl JobRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, job: PlanningJob) -> AppResult<PlanningJob> {
        let mut inner = self.store.write().await;
        inner.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PlanningJob>> {
        let inner = self.store.read().await;
        Ok(inner.jobs.get(&id).cloned())
    }

    pub async fn list(
        &self,
        plan_date: Option<NaiveDate>,
        state: Option<JobState>,
        limit: usize,
    ) -> AppResult<Vec<PlanningJob>> {
        let inner = self.store.read().await;
        let mut jobs: Vec<PlanningJob> = inner
            .jobs
            .values()
            .filter(|j| plan_date.map(|d| j.plan_date == d).unwrap_or(true))
            .filter(|j| state.map(|s| j.state == s).unwrap_or(true))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit);
        Ok(jobs)
    }

    /// PENDING → RUNNING
    pub async fn mark_running(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.store.write().await;
        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Planning job not found".to_string()))?;

        if job.state != JobState::Pending {
            return Err(AppError::Conflict(format!(
                "Cannot start job in state {:?}",
                job.state
            )));
        }

        job.state = JobState::Running;
        job.started_at = Some(Utc::now());
        job.progress = job.progress.max(5);
        Ok(())
    }

    /// Escritura de progreso monótona: valores menores al actual se
    /// ignoran, igual que cualquier escritura sobre un estado terminal
    pub async fn update_progress(&self, id: Uuid, progress: u8) -> AppResult<()> {
        let mut inner = self.store.write().await;
        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Planning job not found".to_string()))?;

        if job.state.is_terminal() {
            return Ok(());
        }
        job.progress = job.progress.max(progress.min(100));
        Ok(())
    }

    /// RUNNING/PENDING → FAILED
    pub async fn mark_failed(
        &self,
        id: Uuid,
        kind: JobErrorKind,
        message: String,
        violations: Option<PlanViolations>,
    ) -> AppResult<()> {
        let mut inner = self.store.write().await;
        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Planning job not found".to_string()))?;

        if job.state.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Cannot fail job in terminal state {:?}",
                job.state
            )));
        }

        job.state = JobState::Failed;
        job.finished_at = Some(Utc::now());
        job.error_kind = Some(kind);
        job.error_message = Some(message);
        if violations.is_some() {
            job.violations = violations;
        }
        Ok(())
    }

    /// Persistencia atómica del plan: rutas, paradas, estados de envíos
    /// y transición RUNNING → COMPLETED en una única sección de
    /// escritura. Ningún resultado parcial queda visible.
    pub async fn complete_with_plan(
        &self,
        id: Uuid,
        routes: Vec<(Route, Vec<RouteStop>)>,
        unassigned_shipment_ids: Vec<Uuid>,
        summary: PlanSummary,
        violations: PlanViolations,
    ) -> AppResult<()> {
        let mut inner = self.store.write().await;

        let job = inner
            .jobs
            .get(&id)
            .ok_or_else(|| AppError::NotFound("Planning job not found".to_string()))?;
        if job.state != JobState::Running {
            return Err(AppError::Conflict(format!(
                "Cannot complete job in state {:?}",
                job.state
            )));
        }

        let mut route_ids = Vec::with_capacity(routes.len());
        for (route, stops) in routes {
            route_ids.push(route.id);

            // Actualizar envíos asignados con su ruta y secuencia
            for stop in &stops {
                if let Some(shipment) = inner.shipments.get_mut(&stop.shipment_id) {
                    shipment.status = ShipmentStatus::Assigned;
                    shipment.route_id = Some(route.id);
                    shipment.route_sequence = Some(stop.sequence);
                }
            }

            inner.route_stops.insert(route.id, stops);
            inner.routes.insert(route.id, route);
        }

        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Planning job not found".to_string()))?;
        job.state = JobState::Completed;
        job.progress = 100;
        job.finished_at = Some(Utc::now());
        job.route_ids = route_ids;
        job.unassigned_shipment_ids = unassigned_shipment_ids;
        job.result_summary = Some(summary);
        job.violations = Some(violations);
        Ok(())
    }

    /// Borrar un trabajo cascadea a sus rutas y paradas
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.store.write().await;
        let job = inner
            .jobs
            .remove(&id)
            .ok_or_else(|| AppError::NotFound("Planning job not found".to_string()))?;

        for route_id in &job.route_ids {
            inner.routes.remove(route_id);
            inner.route_stops.remove(route_id);
        }
        Ok(())
    }
}
