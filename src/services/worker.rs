//! Cola de tareas y pool de workers
//!
//! El orquestador corre dentro del proceso de atención de requests y
//! delega el trabajo del solver a un pool acotado de workers. El solve
//! es CPU puro y corre en `spawn_blocking` para no matar de hambre a
//! los handlers. Cada trabajo lleva una bandera de cancelación que el
//! solver consulta entre iteraciones, y un muestreador de progreso que
//! es el único escritor del campo de progreso (acotado en 95 hasta
//! completar).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::enums::JobErrorKind;
use crate::models::job::PlanningJob;
use crate::repositories::job_repository::JobRepository;
use crate::repositories::shipment_repository::ShipmentRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::solver::assembler::assemble_plan;
use crate::services::solver::data_model::build_data_model;
use crate::services::solver::engine::SolverEngine;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

/// Margen sobre el límite del solver antes de declarar timeout duro
const DEADLINE_OVERHEAD_SECS: u64 = 30;

/// Handle clonable a la cola de trabajos y al registro de cancelaciones
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::Sender<Uuid>,
    cancellations: Arc<RwLock<HashMap<Uuid, Arc<AtomicBool>>>>,
}

impl QueueHandle {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Uuid>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx,
                cancellations: Arc::new(RwLock::new(HashMap::new())),
            },
            rx,
        )
    }

    /// Encolar un trabajo y registrar su bandera de cancelación
    pub async fn enqueue(&self, job_id: Uuid) -> AppResult<()> {
        self.cancellations
            .write()
            .await
            .insert(job_id, Arc::new(AtomicBool::new(false)));

        self.tx
            .send(job_id)
            .await
            .map_err(|_| AppError::Internal("Task queue is closed".to_string()))
    }

    pub async fn cancellation_flag(&self, job_id: Uuid) -> Arc<AtomicBool> {
        let mut flags = self.cancellations.write().await;
        flags
            .entry(job_id)
            .or_insert_with(|| Arc::new(AtomicBool::new(false)))
            .clone()
    }

    /// Señalar cancelación; devuelve si había una bandera registrada
    pub async fn cancel(&self, job_id: Uuid) -> bool {
        let flags = self.cancellations.read().await;
        match flags.get(&job_id) {
            Some(flag) => {
                flag.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    async fn remove(&self, job_id: Uuid) {
        self.cancellations.write().await.remove(&job_id);
    }
}

/// Lanzar el pool de workers sobre el receptor de la cola
pub fn spawn_workers(state: AppState, rx: mpsc::Receiver<Uuid>) {
    let rx = Arc::new(Mutex::new(rx));
    for worker_index in 0..state.config.worker_count.max(1) {
        let state = state.clone();
        let rx = rx.clone();
        tokio::spawn(async move {
            info!("👷 Worker {} iniciado", worker_index);
            loop {
                let job_id = {
                    let mut guard = rx.lock().await;
                    guard.recv().await
                };
                match job_id {
                    Some(job_id) => run_job(&state, job_id).await,
                    None => {
                        info!("👷 Worker {} terminado: cola cerrada", worker_index);
                        break;
                    }
                }
            }
        });
    }
}

/// Ejecutar un trabajo de planificación de punta a punta
pub async fn run_job(state: &AppState, job_id: Uuid) {
    let job_repo = JobRepository::new(state.store.clone());

    let job = match job_repo.find_by_id(job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            warn!("⚠️ Trabajo {} no encontrado en la cola", job_id);
            return;
        }
        Err(e) => {
            error!("❌ Error cargando trabajo {}: {}", job_id, e);
            return;
        }
    };

    let cancel_flag = state.queue.cancellation_flag(job_id).await;

    // Cancelado mientras esperaba en la cola
    if cancel_flag.load(Ordering::Relaxed) {
        let _ = job_repo
            .mark_failed(
                job_id,
                JobErrorKind::Cancelled,
                "Job cancelled before execution".to_string(),
                None,
            )
            .await;
        state.queue.remove(job_id).await;
        return;
    }

    if let Err(e) = job_repo.mark_running(job_id).await {
        // Otro actor ya lo movió de PENDING (p. ej. cancelación)
        warn!("⚠️ Trabajo {} no se pudo iniciar: {}", job_id, e);
        state.queue.remove(job_id).await;
        return;
    }

    info!("🚚 Trabajo {} en ejecución", job_id);

    // Un reintento automático ante fallas internas; luego FAILED
    let mut outcome = execute_plan(state, &job, &cancel_flag).await;
    if matches!(outcome, Err(AppError::Internal(_))) {
        warn!("⚠️ Reintentando trabajo {} tras falla interna", job_id);
        outcome = execute_plan(state, &job, &cancel_flag).await;
    }

    if let Err(e) = outcome {
        let kind = match &e {
            AppError::PreconditionFailure(_) => JobErrorKind::Precondition,
            AppError::SolverTimeout(_) => JobErrorKind::Timeout,
            AppError::Infeasible(_) => JobErrorKind::Infeasible,
            AppError::Conflict(_) if cancel_flag.load(Ordering::Relaxed) => JobErrorKind::Cancelled,
            _ => JobErrorKind::Internal,
        };
        if let Err(mark_err) = job_repo.mark_failed(job_id, kind, e.to_string(), None).await {
            warn!("⚠️ No se pudo marcar FAILED el trabajo {}: {}", job_id, mark_err);
        }
        error!("❌ Trabajo {} falló: {}", job_id, e);
    }

    state.queue.remove(job_id).await;
}

/// Snapshot, modelo, solve, ensamblado y persistencia atómica
async fn execute_plan(
    state: &AppState,
    job: &PlanningJob,
    cancel_flag: &Arc<AtomicBool>,
) -> AppResult<()> {
    let job_repo = JobRepository::new(state.store.clone());
    let vehicle_repo = VehicleRepository::new(state.store.clone());
    let shipment_repo = ShipmentRepository::new(state.store.clone());

    // Snapshots inmutables durante todo el solve
    let vehicles = vehicle_repo.find_available().await?;
    let shipments = shipment_repo.find_pending().await?;

    if vehicles.is_empty() {
        return Err(AppError::PreconditionFailure(
            "No available vehicles found for planning".to_string(),
        ));
    }
    if shipments.is_empty() {
        return Err(AppError::PreconditionFailure(
            "No pending shipments found for planning".to_string(),
        ));
    }

    info!(
        "📦 Snapshot: {} vehículos disponibles, {} envíos pendientes",
        vehicles.len(),
        shipments.len()
    );

    let model = build_data_model(&vehicles, &shipments, &job.parameters, &state.config);
    let time_limit_seconds = job.parameters.time_limit_seconds as u64;

    // Muestreador de progreso: único escritor del campo, acotado en 95
    let sampler = {
        let job_repo = JobRepository::new(state.store.clone());
        let job_id = job.id;
        let interval = Duration::from_secs(state.config.progress_update_interval_secs.max(1));
        tokio::spawn(async move {
            let started = std::time::Instant::now();
            loop {
                tokio::time::sleep(interval).await;
                let elapsed = started.elapsed().as_secs_f64();
                let ratio = (elapsed / time_limit_seconds.max(1) as f64).min(1.0);
                let progress = (5.0 + ratio * 90.0).min(95.0) as u8;
                if job_repo.update_progress(job_id, progress).await.is_err() {
                    break;
                }
            }
        })
    };

    // El solver corre CPU-bound en su propio dominio de ejecución
    let solve_handle = {
        let model = model.clone();
        let cancel = cancel_flag.clone();
        tokio::task::spawn_blocking(move || SolverEngine::new(&model).solve(&cancel))
    };

    let hard_deadline = Duration::from_secs(time_limit_seconds + DEADLINE_OVERHEAD_SECS);
    let solve_result = tokio::time::timeout(hard_deadline, solve_handle).await;
    sampler.abort();

    let outcome = match solve_result {
        Err(_) => {
            // Señalar al solver colgado y reportar timeout duro
            cancel_flag.store(true, Ordering::Relaxed);
            return Err(AppError::SolverTimeout(format!(
                "Solver exceeded hard deadline of {}s with no solution",
                hard_deadline.as_secs()
            )));
        }
        Ok(Err(join_err)) => {
            return Err(AppError::Internal(format!(
                "Solver task panicked: {}",
                join_err
            )));
        }
        Ok(Ok(outcome)) => outcome,
    };

    // Cancelación observada: el trabajo falla con clase CANCELLED y no
    // se persiste ningún resultado parcial
    if cancel_flag.load(Ordering::Relaxed) {
        return job_repo
            .mark_failed(
                job.id,
                JobErrorKind::Cancelled,
                "Job cancelled while solving".to_string(),
                None,
            )
            .await;
    }

    let plan = assemble_plan(&model, &outcome, job.plan_date, job.id);

    // Veredicto autoritativo del tracker: una violación STRICT marca el
    // trabajo FAILED y no persiste rutas
    if plan.strict_temperature_breach {
        let breached: Vec<String> = plan
            .violations
            .temperature_violations
            .iter()
            .filter(|v| v.sla_tier.is_hard_constraint())
            .map(|v| format!("{} ({:.1}°C > {:.1}°C)", v.order_number, v.predicted_temp, v.temp_limit))
            .collect();
        return job_repo
            .mark_failed(
                job.id,
                JobErrorKind::Infeasible,
                format!(
                    "Temperature ceiling breached for STRICT shipments: {}",
                    breached.join(", ")
                ),
                Some(plan.violations),
            )
            .await;
    }

    let summary = plan.summary.clone();
    job_repo
        .complete_with_plan(
            job.id,
            plan.routes,
            plan.unassigned_shipment_ids,
            plan.summary,
            plan.violations,
        )
        .await?;

    info!(
        "✅ Trabajo {} completado: {} rutas, {} asignados, {} sin asignar, {:.1} km",
        job.id,
        summary.routes_created,
        summary.shipments_assigned,
        summary.shipments_unassigned,
        summary.total_distance_km
    );
    Ok(())
}
