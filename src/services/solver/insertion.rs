//! Evaluación de rutas e inserción más barata
//!
//! La evaluación de una ruta aplica todas las dimensiones del modelo:
//! tiempo (con ventanas múltiples y espera permitida), capacidad de peso
//! y volumen, techo de temperatura para envíos STRICT y acumulación
//! laboral. La construcción de la primera solución es una inserción más
//! barata en paralelo sobre todos los vehículos, guiada por el beneficio
//! de evitar la penalidad de descarte.

use rayon::prelude::*;

use crate::services::solver::data_model::{VehicleData, VrpDataModel};
use crate::services::temperature::{RouteLeg, TemperatureTracker};

/// Parada programada dentro de una ruta
#[derive(Debug, Clone, Copy)]
pub struct StopSchedule {
    pub node: usize,
    pub arrival: i64,
    pub departure: i64,
    pub wait: i64,
    pub window_index: usize,
}

/// Programación completa de una ruta
#[derive(Debug, Clone, Default)]
pub struct RouteSchedule {
    pub stops: Vec<StopSchedule>,
    pub departure_minutes: i64,
    pub return_minutes: i64,
    pub distance_meters: i64,
    /// Minutos de conducción + servicio (sin esperas), para la dimensión laboral
    pub drive_service_minutes: i64,
    pub weight_g: i64,
    pub volume_l: i64,
    /// Grados acumulados de violación térmica en envíos STANDARD
    pub standard_violation_degrees: f64,
}

impl RouteSchedule {
    fn empty(earliest_departure: i64) -> Self {
        Self {
            departure_minutes: earliest_departure,
            return_minutes: earliest_departure,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn duration_minutes(&self) -> i64 {
        self.return_minutes - self.departure_minutes
    }
}

/// Elegir la ventana más temprana donde la entrega cabe completa:
/// espera antes de abrir permitida, `llegada + servicio ≤ fin`.
fn select_window(
    windows: &[(i64, i64)],
    raw_arrival: i64,
    service: i64,
) -> Option<(usize, i64)> {
    for (index, &(start, end)) in windows.iter().enumerate() {
        let arrival = raw_arrival.max(start);
        if arrival + service <= end {
            return Some((index, arrival));
        }
    }
    None
}

/// Evaluar la secuencia de nodos para un vehículo.
///
/// Devuelve `None` cuando alguna restricción dura no se cumple:
/// capacidad excedida, ninguna ventana alcanzable, retorno fuera del
/// horizonte, o techo térmico de un envío STRICT superado.
pub fn evaluate_route(
    model: &VrpDataModel,
    vehicle: &VehicleData,
    nodes: &[usize],
) -> Option<RouteSchedule> {
    if nodes.is_empty() {
        return Some(RouteSchedule::empty(model.earliest_departure));
    }

    // Capacidad (slack cero, acotada por vehículo)
    let weight_g: i64 = nodes.iter().map(|&n| model.nodes[n].demand_weight_g).sum();
    let volume_l: i64 = nodes.iter().map(|&n| model.nodes[n].demand_volume_l).sum();
    if weight_g > vehicle.capacity_weight_g || volume_l > vehicle.capacity_volume_l {
        return None;
    }

    // La unidad frigorífica debe poder alcanzar el techo exigido
    for &n in nodes {
        if model.nodes[n].temp_ceiling < vehicle.min_temp_capability {
            return None;
        }
    }

    // Dimensión de tiempo
    let mut stops = Vec::with_capacity(nodes.len());
    let mut current = model.earliest_departure;
    let mut prev = model.depot_index();
    let mut distance = 0i64;
    let mut drive_service = 0i64;

    for &node_idx in nodes {
        let node = &model.nodes[node_idx];
        let travel = model.time_matrix[prev][node_idx];
        let raw_arrival = current + travel;

        let (window_index, arrival) =
            select_window(&node.time_windows, raw_arrival, node.service_duration)?;

        stops.push(StopSchedule {
            node: node_idx,
            arrival,
            departure: arrival + node.service_duration,
            wait: arrival - raw_arrival,
            window_index,
        });

        distance += model.distance_matrix[prev][node_idx];
        drive_service += travel + node.service_duration;
        current = arrival + node.service_duration;
        prev = node_idx;
    }

    // Tramo de regreso al depósito, dentro del horizonte
    let return_travel = model.time_matrix[prev][model.depot_index()];
    let return_minutes = current + return_travel;
    if return_minutes > model.horizon_end {
        return None;
    }
    distance += model.distance_matrix[prev][model.depot_index()];
    drive_service += return_travel;

    // Dimensión térmica: simulación conservadora del tracker sobre la
    // ruta candidata. STRICT es restricción dura; STANDARD acumula
    // grados de violación que se penalizan en el costo.
    let tracker = TemperatureTracker::new(model.ambient_temperature);
    let legs: Vec<RouteLeg> = stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            let node = &model.nodes[stop.node];
            let from = if i == 0 {
                model.depot_index()
            } else {
                stops[i - 1].node
            };
            RouteLeg {
                travel_minutes: model.time_matrix[from][stop.node] as f64,
                service_minutes: node.service_duration as f64,
                temp_ceiling: node.temp_ceiling,
                temp_floor: node.temp_floor,
            }
        })
        .collect();
    let temps = tracker.track_route(&vehicle.profile, vehicle.initial_temp, &legs);

    let mut standard_violation_degrees = 0.0;
    for (stop, temp) in stops.iter().zip(temps.iter()) {
        if !temp.is_feasible {
            if model.nodes[stop.node].is_strict_sla {
                return None;
            }
            standard_violation_degrees += temp.violation_amount;
        }
    }

    Some(RouteSchedule {
        stops,
        departure_minutes: model.earliest_departure,
        return_minutes,
        distance_meters: distance,
        drive_service_minutes: drive_service,
        weight_g,
        volume_l,
        standard_violation_degrees,
    })
}

/// Costo de una ruta: fijo por vehículo usado + distancia + penalidades
/// blandas (térmica STANDARD y laboral)
pub fn route_cost(model: &VrpDataModel, schedule: &RouteSchedule) -> i64 {
    if schedule.is_empty() {
        return 0;
    }

    let mut cost = model.vehicle_fixed_cost + schedule.distance_meters;
    cost += (schedule.standard_violation_degrees * model.temp_violation_penalty as f64) as i64;
    cost += labor_penalty(model, schedule);
    cost
}

/// Penalidad por exceder la cota laboral blanda:
/// P = max(costo_fijo, distancia_de_ruta) × max(1, horas_de_exceso)
fn labor_penalty(model: &VrpDataModel, schedule: &RouteSchedule) -> i64 {
    let Some(labor) = model.labor else {
        return 0;
    };

    let bound = labor.soft_bound();
    if schedule.drive_service_minutes <= bound {
        return 0;
    }

    let overage_minutes = schedule.drive_service_minutes - bound;
    let overage_hours = (overage_minutes + 59) / 60;
    model.vehicle_fixed_cost.max(schedule.distance_meters) * overage_hours.max(1)
}

/// Estado de una solución en construcción o mejora
#[derive(Debug, Clone)]
pub struct SolutionState {
    /// Secuencia de nodos por vehículo (vacía = vehículo sin usar)
    pub routes: Vec<Vec<usize>>,
    pub schedules: Vec<RouteSchedule>,
    pub unassigned: Vec<usize>,
}

impl SolutionState {
    pub fn new(model: &VrpDataModel) -> Self {
        let routes = vec![Vec::new(); model.num_vehicles()];
        let schedules = vec![RouteSchedule::empty(model.earliest_departure); model.num_vehicles()];
        let unassigned = (1..model.num_nodes()).collect();
        Self {
            routes,
            schedules,
            unassigned,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct InsertionCandidate {
    node: usize,
    vehicle: usize,
    position: usize,
    cost_delta: i64,
    /// Penalidad de descarte evitada menos el delta de costo
    benefit: i64,
}

/// Mejor posición de inserción para un nodo en la solución actual
fn best_insertion_for_node(
    model: &VrpDataModel,
    state: &SolutionState,
    node: usize,
) -> Option<InsertionCandidate> {
    let mut best: Option<InsertionCandidate> = None;

    for vehicle_index in 0..model.num_vehicles() {
        let vehicle = &model.vehicles[vehicle_index];
        let route = &state.routes[vehicle_index];
        let base_cost = route_cost(model, &state.schedules[vehicle_index]);

        let mut candidate_nodes = Vec::with_capacity(route.len() + 1);
        for position in 0..=route.len() {
            candidate_nodes.clear();
            candidate_nodes.extend_from_slice(&route[..position]);
            candidate_nodes.push(node);
            candidate_nodes.extend_from_slice(&route[position..]);

            if let Some(schedule) = evaluate_route(model, vehicle, &candidate_nodes) {
                let delta = route_cost(model, &schedule) - base_cost;
                let penalty = model.disjunction_penalty(&model.nodes[node]);
                let candidate = InsertionCandidate {
                    node,
                    vehicle: vehicle_index,
                    position,
                    cost_delta: delta,
                    benefit: penalty - delta,
                };

                let better = match &best {
                    None => true,
                    Some(current) => {
                        (candidate.cost_delta, candidate.vehicle, candidate.position)
                            < (current.cost_delta, current.vehicle, current.position)
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
        }
    }

    best
}

/// Inserción más barata en paralelo.
///
/// En cada ronda se evalúan todos los nodos sin asignar sobre todos los
/// vehículos y posiciones, y se materializa la inserción de mayor
/// beneficio (penalidad de descarte evitada menos costo de inserción).
/// Los nodos que no admiten ninguna inserción rentable quedan sin
/// asignar y pagan su penalidad de disyunción.
pub fn cheapest_insertion(model: &VrpDataModel, state: &mut SolutionState) {
    loop {
        if state.unassigned.is_empty() {
            return;
        }

        let candidates: Vec<InsertionCandidate> = state
            .unassigned
            .par_iter()
            .filter_map(|&node| best_insertion_for_node(model, state, node))
            .collect();

        // Selección determinista: mayor beneficio, luego nodo y vehículo
        // más bajos
        let Some(best) = candidates.into_iter().reduce(|a, b| {
            if (b.benefit, std::cmp::Reverse(b.node), std::cmp::Reverse(b.vehicle))
                > (a.benefit, std::cmp::Reverse(a.node), std::cmp::Reverse(a.vehicle))
            {
                b
            } else {
                a
            }
        }) else {
            return;
        };

        if best.benefit <= 0 {
            // Descartar es más barato que insertar
            return;
        }

        state.routes[best.vehicle].insert(best.position, best.node);
        match evaluate_route(model, &model.vehicles[best.vehicle], &state.routes[best.vehicle]) {
            Some(schedule) => state.schedules[best.vehicle] = schedule,
            None => {
                // La evaluación del candidato ya validó la ruta; si esto
                // ocurre revertimos y cortamos la construcción
                state.routes[best.vehicle].retain(|&n| n != best.node);
                return;
            }
        }
        state.unassigned.retain(|&n| n != best.node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::EnvironmentConfig;
    use crate::models::enums::SlaTier;
    use crate::services::solver::data_model::tests::{test_params, test_shipment, test_vehicle};
    use crate::services::solver::data_model::build_data_model;

    fn simple_model() -> VrpDataModel {
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![test_shipment("ORD-1", 25.05, 121.58, vec![(480, 600)])];
        build_data_model(&vehicles, &shipments, &test_params(), &EnvironmentConfig::default())
    }

    #[test]
    fn test_empty_route_schedule() {
        let model = simple_model();
        let schedule = evaluate_route(&model, &model.vehicles[0], &[]).unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.distance_meters, 0);
        assert_eq!(schedule.duration_minutes(), 0);
    }

    #[test]
    fn test_single_stop_schedule_within_window() {
        let model = simple_model();
        let schedule = evaluate_route(&model, &model.vehicles[0], &[1]).unwrap();

        assert_eq!(schedule.stops.len(), 1);
        let stop = schedule.stops[0];
        assert!(stop.arrival >= 480);
        assert!(stop.arrival + 15 <= 600);
        assert_eq!(stop.departure, stop.arrival + 15);
        // ida y vuelta simétricas
        assert_eq!(schedule.distance_meters, 2 * model.distance_matrix[0][1]);
    }

    #[test]
    fn test_waiting_before_window_opens() {
        // Ventana que abre bastante después de la salida: se espera
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![test_shipment("ORD-1", 25.05, 121.58, vec![(700, 800)])];
        let model = build_data_model(&vehicles, &shipments, &test_params(), &EnvironmentConfig::default());

        let schedule = evaluate_route(&model, &model.vehicles[0], &[1]).unwrap();
        let stop = schedule.stops[0];
        assert_eq!(stop.arrival, 700);
        assert!(stop.wait > 0);
    }

    #[test]
    fn test_second_window_selected_when_first_unreachable() {
        // Primera ventana termina antes de poder llegar; elige la segunda
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![test_shipment(
            "ORD-1",
            25.05,
            121.58,
            vec![(360, 390), (840, 900)],
        )];
        let model = build_data_model(&vehicles, &shipments, &test_params(), &EnvironmentConfig::default());

        let schedule = evaluate_route(&model, &model.vehicles[0], &[1]).unwrap();
        let stop = schedule.stops[0];
        assert_eq!(stop.window_index, 1);
        assert!(stop.arrival >= 840);
        assert!(stop.arrival + 15 <= 900);
    }

    #[test]
    fn test_service_must_fit_inside_window() {
        // La ventana alcanza a abrir pero el servicio no cabe completo
        let vehicles = vec![test_vehicle("AAA-111")];
        let mut shipment = test_shipment("ORD-1", 25.05, 121.58, vec![(480, 500)]);
        shipment.service_duration_minutes = 30;
        let model = build_data_model(&vehicles, &[shipment], &test_params(), &EnvironmentConfig::default());

        assert!(evaluate_route(&model, &model.vehicles[0], &[1]).is_none());
    }

    #[test]
    fn test_window_after_last_end_is_infeasible() {
        // La última ventana termina antes de la llegada más temprana
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![test_shipment("ORD-1", 25.05, 121.58, vec![(480, 483)])];
        let model = build_data_model(&vehicles, &shipments, &test_params(), &EnvironmentConfig::default());

        assert!(evaluate_route(&model, &model.vehicles[0], &[1]).is_none());
    }

    #[test]
    fn test_capacity_exceeded_rejected() {
        let vehicles = vec![test_vehicle("AAA-111")];
        let mut shipment = test_shipment("ORD-1", 25.05, 121.58, vec![(480, 600)]);
        shipment.weight_kg = 1500.0;
        let model = build_data_model(&vehicles, &[shipment], &test_params(), &EnvironmentConfig::default());

        assert!(evaluate_route(&model, &model.vehicles[0], &[1]).is_none());
    }

    #[test]
    fn test_strict_temperature_breach_rejected() {
        // Vehículo de aislamiento pobre, sin frío, ambiente 40 °C y
        // envío STRICT con techo 0 °C lejos del depósito
        let mut vehicle = test_vehicle("AAA-111");
        vehicle.insulation_grade = crate::models::enums::InsulationGrade::Basic;
        vehicle.has_strip_curtains = false;
        vehicle.cooling_rate = 0.0;

        let mut shipment = test_shipment("ORD-1", 25.45, 121.95, vec![(480, 1200)]);
        shipment.temp_ceiling = 0.0;

        let mut params = test_params();
        params.ambient_temperature = 40.0;

        let model = build_data_model(&[vehicle], &[shipment], &params, &EnvironmentConfig::default());
        assert!(evaluate_route(&model, &model.vehicles[0], &[1]).is_none());
    }

    #[test]
    fn test_standard_temperature_breach_accumulates_degrees() {
        let mut vehicle = test_vehicle("AAA-111");
        vehicle.insulation_grade = crate::models::enums::InsulationGrade::Basic;
        vehicle.has_strip_curtains = false;
        vehicle.cooling_rate = 0.0;

        let mut shipment = test_shipment("ORD-1", 25.45, 121.95, vec![(480, 1200)]);
        shipment.temp_ceiling = 0.0;
        shipment.sla_tier = SlaTier::Standard;

        let mut params = test_params();
        params.ambient_temperature = 40.0;

        let model = build_data_model(&[vehicle], &[shipment], &params, &EnvironmentConfig::default());
        let schedule = evaluate_route(&model, &model.vehicles[0], &[1]).unwrap();
        assert!(schedule.standard_violation_degrees > 0.0);
    }

    #[test]
    fn test_cheapest_insertion_assigns_single_shipment() {
        let model = simple_model();
        let mut state = SolutionState::new(&model);
        cheapest_insertion(&model, &mut state);

        assert!(state.unassigned.is_empty());
        assert_eq!(state.routes[0], vec![1]);
    }

    #[test]
    fn test_cheapest_insertion_leaves_unreachable_unassigned() {
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![test_shipment("ORD-1", 25.05, 121.58, vec![(480, 483)])];
        let model = build_data_model(&vehicles, &shipments, &test_params(), &EnvironmentConfig::default());

        let mut state = SolutionState::new(&model);
        cheapest_insertion(&model, &mut state);

        assert_eq!(state.unassigned, vec![1]);
        assert!(state.routes[0].is_empty());
    }

    #[test]
    fn test_labor_penalty_applies_when_enabled() {
        let vehicles = vec![test_vehicle("AAA-111")];
        // Envío muy lejano para acumular muchos minutos de conducción
        let shipments = vec![test_shipment("ORD-1", 26.2, 122.3, vec![(0, 1439)])];
        let mut config = EnvironmentConfig::default();
        config.enable_labor_dimension = true;
        config.driver_daily_limit_minutes = 60;
        config.driver_weekly_limit_minutes = 600;

        let mut params = test_params();
        params.planned_departure_minutes = 0;
        let model = build_data_model(&vehicles, &shipments, &params, &config);

        let schedule = evaluate_route(&model, &model.vehicles[0], &[1]).unwrap();
        assert!(schedule.drive_service_minutes > 60);
        assert!(route_cost(&model, &schedule) > model.vehicle_fixed_cost + schedule.distance_meters);
    }
}
