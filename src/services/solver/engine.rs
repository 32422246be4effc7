//! Motor del solver VRP
//!
//! Búsqueda en dos fases sobre el modelo canónico:
//!
//! 1. Primera solución por inserción más barata en paralelo (evita
//!    descartes prematuros de envíos).
//! 2. Mejora metaheurística por ruina-y-reconstrucción sobre el
//!    presupuesto de tiempo restante.
//!
//! Termina al agotar el presupuesto de tiempo, al alcanzar la meseta de
//! mejora, o al observar la bandera de cancelación (consultada entre
//! iteraciones de búsqueda). El objetivo lexicográfico
//! (flota → distancia → slack) está codificado en el costo entero:
//! costo fijo dominante por vehículo, costo de arco por distancia y un
//! coeficiente chico sobre el span global de la dimensión de tiempo.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::services::solver::data_model::{VrpDataModel, GLOBAL_SPAN_COEFFICIENT};
use crate::services::solver::insertion::{
    cheapest_insertion, evaluate_route, route_cost, RouteSchedule, SolutionState,
};
use crate::services::temperature::TemperatureTracker;

/// Semilla fija: la búsqueda es determinista para un mismo snapshot
const SEARCH_SEED: u64 = 0xC01D_CAFE;

/// Estado terminal del solver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// La mejora alcanzó la meseta (óptimo local)
    Optimal,
    /// Se agotó el presupuesto de tiempo con solución en mano
    Feasible,
    /// Cancelado antes de completar la búsqueda
    Cancelled,
}

impl SolverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::Feasible => "FEASIBLE",
            SolverStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Ruta resuelta para un vehículo usado
#[derive(Debug, Clone)]
pub struct SolvedRoute {
    pub vehicle_index: usize,
    pub nodes: Vec<usize>,
    pub schedule: RouteSchedule,
}

/// Resultado completo del solver
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolverStatus,
    pub routes: Vec<SolvedRoute>,
    pub unassigned: Vec<usize>,
    pub total_cost: i64,
    pub solver_time_seconds: f64,
    pub iterations: u64,
}

/// Clave de comparación lexicográfica entre soluciones: costo total,
/// luego menos vehículos, luego menor duración máxima de ruta, y por
/// último orden determinista por vehículo
type SolutionKey = (i64, usize, i64, Vec<usize>);

pub struct SolverEngine<'a> {
    model: &'a VrpDataModel,
}

impl<'a> SolverEngine<'a> {
    pub fn new(model: &'a VrpDataModel) -> Self {
        Self { model }
    }

    pub fn solve(&self, cancel: &AtomicBool) -> SolveOutcome {
        let start = Instant::now();
        let deadline = start + self.model.time_limit;

        log::info!(
            "🔍 Iniciando solver VRP: {} nodos, {} vehículos, límite {}s",
            self.model.num_nodes(),
            self.model.num_vehicles(),
            self.model.time_limit.as_secs()
        );

        // Preselección: un envío cuyo techo térmico se viola incluso en
        // el mejor caso (viaje directo desde el depósito con el mejor
        // vehículo) nunca puede servirse; queda fuera de la búsqueda
        let mut best = SolutionState::new(self.model);
        let impossible: Vec<usize> = best
            .unassigned
            .iter()
            .copied()
            .filter(|&n| self.thermally_impossible(n))
            .collect();
        best.unassigned.retain(|n| !impossible.contains(n));

        // Fase 1: primera solución
        cheapest_insertion(self.model, &mut best);
        let mut best_key = self.solution_key(&best);

        // Fase 2: ruina y reconstrucción
        let mut rng = SmallRng::seed_from_u64(SEARCH_SEED);
        let mut iterations: u64 = 0;
        let mut no_improvement: u32 = 0;
        let mut status = SolverStatus::Optimal;

        loop {
            if cancel.load(Ordering::Relaxed) {
                status = SolverStatus::Cancelled;
                break;
            }
            if Instant::now() >= deadline {
                status = SolverStatus::Feasible;
                break;
            }
            if no_improvement >= self.model.plateau_iterations {
                status = SolverStatus::Optimal;
                break;
            }
            if best.unassigned.is_empty() && self.assigned_count(&best) == 0 {
                // Nada que mejorar
                break;
            }

            iterations += 1;

            let mut candidate = best.clone();
            self.ruin(&mut candidate, &mut rng, iterations);
            cheapest_insertion(self.model, &mut candidate);

            let key = self.solution_key(&candidate);
            if key < best_key {
                best = candidate;
                best_key = key;
                no_improvement = 0;
            } else {
                no_improvement += 1;
            }
        }

        let solver_time_seconds = start.elapsed().as_secs_f64();

        let routes: Vec<SolvedRoute> = best
            .routes
            .iter()
            .enumerate()
            .filter(|(_, nodes)| !nodes.is_empty())
            .map(|(vehicle_index, nodes)| SolvedRoute {
                vehicle_index,
                nodes: nodes.clone(),
                schedule: best.schedules[vehicle_index].clone(),
            })
            .collect();

        let mut unassigned = best.unassigned.clone();
        unassigned.extend(impossible);
        unassigned.sort_unstable();

        log::info!(
            "✅ Solver terminado: status={}, vehículos={}, asignados={}, sin asignar={}, iteraciones={}",
            status.as_str(),
            routes.len(),
            routes.iter().map(|r| r.nodes.len()).sum::<usize>(),
            unassigned.len(),
            iterations
        );

        SolveOutcome {
            status,
            routes,
            unassigned,
            total_cost: best_key.0,
            solver_time_seconds,
            iterations,
        }
    }

    fn assigned_count(&self, state: &SolutionState) -> usize {
        state.routes.iter().map(|r| r.len()).sum()
    }

    /// Verdadero si el techo térmico del nodo se viola incluso con el
    /// mejor vehículo en viaje directo desde el depósito
    fn thermally_impossible(&self, node_idx: usize) -> bool {
        let node = &self.model.nodes[node_idx];
        let tracker = TemperatureTracker::new(self.model.ambient_temperature);
        let travel = self.model.time_matrix[self.model.depot_index()][node_idx] as f64;

        self.model.vehicles.iter().all(|vehicle| {
            if node.temp_ceiling < vehicle.min_temp_capability {
                return true;
            }
            let arrival = vehicle.initial_temp
                + tracker.transit_rise(&vehicle.profile, travel, vehicle.initial_temp)
                + tracker.cooling_effect(&vehicle.profile, travel);
            arrival > node.temp_ceiling
        })
    }

    /// Costo total de la solución: rutas + span global + descartes
    fn solution_cost(&self, state: &SolutionState) -> i64 {
        let mut cost: i64 = state
            .schedules
            .iter()
            .map(|s| route_cost(self.model, s))
            .sum();

        // Coeficiente chico sobre el span global de la dimensión de
        // tiempo (nivel 3: empuja hacia finales tempranos / más slack)
        let used: Vec<&RouteSchedule> =
            state.schedules.iter().filter(|s| !s.is_empty()).collect();
        if !used.is_empty() {
            let max_return = used.iter().map(|s| s.return_minutes).max().unwrap_or(0);
            let min_departure = used
                .iter()
                .map(|s| s.departure_minutes)
                .min()
                .unwrap_or(0);
            cost += GLOBAL_SPAN_COEFFICIENT * (max_return - min_departure);
        }

        // Penalidades de disyunción por envíos descartados
        for &node in &state.unassigned {
            cost += self.model.disjunction_penalty(&self.model.nodes[node]);
        }

        cost
    }

    fn solution_key(&self, state: &SolutionState) -> SolutionKey {
        let vehicles_used = state.routes.iter().filter(|r| !r.is_empty()).count();
        let max_duration = state
            .schedules
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.duration_minutes())
            .max()
            .unwrap_or(0);
        let used_vehicles: Vec<usize> = state
            .routes
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_empty())
            .map(|(i, _)| i)
            .collect();

        (
            self.solution_cost(state),
            vehicles_used,
            max_duration,
            used_vehicles,
        )
    }

    /// Fase de ruina: remueve una fracción de los nodos asignados.
    /// Alterna entre remoción aleatoria y remoción de los peores nodos
    /// (mayor desvío aportado a su ruta).
    fn ruin(&self, state: &mut SolutionState, rng: &mut SmallRng, iteration: u64) {
        let assigned: Vec<(usize, usize)> = state
            .routes
            .iter()
            .enumerate()
            .flat_map(|(v, nodes)| nodes.iter().map(move |&n| (v, n)))
            .collect();

        if assigned.is_empty() {
            return;
        }

        let fraction = rng.gen_range(10..=30);
        let count = ((assigned.len() * fraction) / 100).max(1);

        let removed: Vec<(usize, usize)> = if iteration % 2 == 0 {
            self.worst_nodes(state, &assigned, count)
        } else {
            let mut pool = assigned;
            let mut picked = Vec::with_capacity(count);
            for _ in 0..count.min(pool.len()) {
                let idx = rng.gen_range(0..pool.len());
                picked.push(pool.swap_remove(idx));
            }
            picked
        };

        let mut touched_vehicles: Vec<usize> = Vec::new();
        for (vehicle, node) in removed {
            state.routes[vehicle].retain(|&n| n != node);
            state.unassigned.push(node);
            if !touched_vehicles.contains(&vehicle) {
                touched_vehicles.push(vehicle);
            }
        }

        // Remover paradas nunca invalida una ruta factible, pero la
        // programación cambia y hay que recalcularla
        for vehicle in touched_vehicles {
            if let Some(schedule) = evaluate_route(
                self.model,
                &self.model.vehicles[vehicle],
                &state.routes[vehicle],
            ) {
                state.schedules[vehicle] = schedule;
            }
        }
    }

    /// Nodos con mayor desvío (costo de rodeo) dentro de sus rutas
    fn worst_nodes(
        &self,
        state: &SolutionState,
        assigned: &[(usize, usize)],
        count: usize,
    ) -> Vec<(usize, usize)> {
        let mut scored: Vec<(i64, usize, usize)> = assigned
            .iter()
            .map(|&(vehicle, node)| {
                let route = &state.routes[vehicle];
                let pos = route.iter().position(|&n| n == node).unwrap_or(0);
                let prev = if pos == 0 {
                    self.model.depot_index()
                } else {
                    route[pos - 1]
                };
                let next = if pos + 1 < route.len() {
                    route[pos + 1]
                } else {
                    self.model.depot_index()
                };
                let detour = self.model.distance_matrix[prev][node]
                    + self.model.distance_matrix[node][next]
                    - self.model.distance_matrix[prev][next];
                (detour, vehicle, node)
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.2.cmp(&b.2)));
        scored
            .into_iter()
            .take(count)
            .map(|(_, vehicle, node)| (vehicle, node))
            .collect()
    }
}
