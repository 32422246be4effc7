//! Ensamblador del plan
//!
//! Post-procesa la asignación cruda del solver en rutas con paradas
//! ordenadas y temperaturas predichas. El tracker termodinámico corre
//! acá como veredicto autoritativo: cualquier violación STRICT que
//! sobreviva marca el plan como no persistible (el trabajo falla).
//! También clasifica los envíos sin asignar con diagnósticos de causa
//! probable.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::models::enums::{DiagnosticKind, RouteStatus, SlaTier};
use crate::models::job::{
    LikelyReason, PlanSummary, PlanViolations, TemperatureViolation, UnassignedDiagnostic,
};
use crate::models::route::{Route, RouteStop};
use crate::services::solver::data_model::{PlanNode, VrpDataModel};
use crate::services::solver::engine::SolveOutcome;
use crate::services::temperature::{RouteLeg, TemperatureTracker};
use crate::utils::time::minutes_to_hhmm;

/// Plan ensamblado, listo para persistir de forma atómica
#[derive(Debug, Clone)]
pub struct AssembledPlan {
    pub routes: Vec<(Route, Vec<RouteStop>)>,
    pub unassigned_shipment_ids: Vec<Uuid>,
    pub violations: PlanViolations,
    pub summary: PlanSummary,
    /// Alguna parada STRICT viola su techo según el tracker; el plan no
    /// debe persistirse y el trabajo pasa a FAILED
    pub strict_temperature_breach: bool,
}

pub fn assemble_plan(
    model: &VrpDataModel,
    outcome: &SolveOutcome,
    plan_date: NaiveDate,
    job_id: Uuid,
) -> AssembledPlan {
    let tracker = TemperatureTracker::new(model.ambient_temperature);
    let job_suffix: String = {
        let simple = job_id.simple().to_string();
        simple[simple.len() - 8..].to_string()
    };

    let mut routes = Vec::new();
    let mut temperature_violations = Vec::new();
    let mut strict_temperature_breach = false;
    let mut total_distance = 0i64;
    let mut total_duration = 0i64;
    let mut shipments_assigned = 0usize;

    for solved in &outcome.routes {
        let vehicle = &model.vehicles[solved.vehicle_index];
        let schedule = &solved.schedule;
        let route_id = Uuid::new_v4();

        // Tramos para el tracker: viaje desde la parada anterior + servicio
        let legs: Vec<RouteLeg> = schedule
            .stops
            .iter()
            .enumerate()
            .map(|(i, stop)| {
                let node = &model.nodes[stop.node];
                let from = if i == 0 {
                    model.depot_index()
                } else {
                    schedule.stops[i - 1].node
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

        let mut stops = Vec::with_capacity(schedule.stops.len());
        let mut prev_node = model.depot_index();
        let mut total_weight_kg = 0.0;
        let mut total_volume_m3 = 0.0;

        for (i, (stop, temp)) in schedule.stops.iter().zip(temps.iter()).enumerate() {
            let node = &model.nodes[stop.node];
            let sla_tier = if node.is_strict_sla {
                SlaTier::Strict
            } else {
                SlaTier::Standard
            };

            if !temp.is_feasible {
                temperature_violations.push(TemperatureViolation {
                    shipment_id: node.shipment_id.unwrap_or_default(),
                    order_number: node.order_number.clone().unwrap_or_default(),
                    address: node.address.clone(),
                    sequence: (i + 1) as u32,
                    predicted_temp: temp.arrival_temp,
                    temp_limit: node.temp_ceiling,
                    violation_amount: temp.violation_amount,
                    sla_tier,
                });
                if node.is_strict_sla {
                    strict_temperature_breach = true;
                }
            }

            stops.push(RouteStop {
                id: Uuid::new_v4(),
                route_id,
                shipment_id: node.shipment_id.unwrap_or_default(),
                order_number: node.order_number.clone().unwrap_or_default(),
                address: node.address.clone(),
                latitude: node.latitude,
                longitude: node.longitude,
                sequence: (i + 1) as u32,
                arrival_minutes: stop.arrival as u32,
                departure_minutes: stop.departure as u32,
                service_duration_minutes: node.service_duration as u32,
                wait_minutes: stop.wait as u32,
                target_window_index: stop.window_index,
                distance_from_prev_meters: model.distance_matrix[prev_node][stop.node],
                travel_time_from_prev_minutes: model.time_matrix[prev_node][stop.node],
                predicted_arrival_temp: temp.arrival_temp,
                transit_temp_rise: temp.transit_rise,
                service_temp_rise: temp.service_rise,
                cooling_applied: temp.cooling_applied,
                predicted_departure_temp: temp.departure_temp,
                is_temp_feasible: temp.is_feasible,
                temp_ceiling: node.temp_ceiling,
                sla_tier,
            });

            total_weight_kg += node.demand_weight_g as f64 / 1000.0;
            total_volume_m3 += node.demand_volume_l as f64 / 1000.0;
            prev_node = stop.node;
        }

        let is_temperature_feasible = TemperatureTracker::is_route_feasible(&temps);
        let final_temp = temps.last().map(|t| t.departure_temp).unwrap_or(vehicle.initial_temp);
        let max_temp = temps
            .iter()
            .map(|t| t.arrival_temp)
            .fold(vehicle.initial_temp, f64::max);

        let route = Route {
            id: route_id,
            route_code: format!(
                "R-{}-{}-{}",
                plan_date.format("%Y%m%d"),
                vehicle.license_plate,
                job_suffix
            ),
            plan_date,
            job_id,
            vehicle_id: vehicle.vehicle_id,
            license_plate: vehicle.license_plate.clone(),
            driver_id: vehicle.driver_id,
            driver_name: vehicle.driver_name.clone(),
            status: RouteStatus::Scheduled,
            total_stops: stops.len() as u32,
            total_distance_meters: schedule.distance_meters,
            total_duration_minutes: schedule.duration_minutes(),
            total_weight_kg,
            total_volume_m3,
            initial_temperature: vehicle.initial_temp,
            predicted_final_temp: final_temp,
            predicted_max_temp: max_temp,
            is_temperature_feasible,
            departure_minutes: schedule.departure_minutes as u32,
            return_minutes: schedule.return_minutes as u32,
            depot_latitude: model.nodes[model.depot_index()].latitude,
            depot_longitude: model.nodes[model.depot_index()].longitude,
            version: 1,
            created_at: Utc::now(),
        };

        total_distance += schedule.distance_meters;
        total_duration += schedule.duration_minutes();
        shipments_assigned += stops.len();
        routes.push((route, stops));
    }

    // Diagnósticos para envíos sin asignar
    let mut unassigned_shipment_ids = Vec::new();
    let mut unassigned_diagnostics = Vec::new();
    for &node_idx in &outcome.unassigned {
        let node = &model.nodes[node_idx];
        if let Some(shipment_id) = node.shipment_id {
            unassigned_shipment_ids.push(shipment_id);
            unassigned_diagnostics.push(diagnose_unassigned(model, node, shipment_id));
        }
    }

    let is_feasible = !strict_temperature_breach
        && routes.iter().all(|(route, _)| route.is_temperature_feasible);

    let summary = PlanSummary {
        routes_created: routes.len(),
        vehicles_used: routes.len(),
        shipments_assigned,
        shipments_unassigned: unassigned_shipment_ids.len(),
        total_distance_km: total_distance as f64 / 1000.0,
        total_duration_minutes: total_duration,
        total_cost: outcome.total_cost,
        solver_status: outcome.status.as_str().to_string(),
        solver_time_seconds: outcome.solver_time_seconds,
        is_feasible,
    };

    AssembledPlan {
        routes,
        unassigned_shipment_ids,
        violations: PlanViolations {
            temperature_violations,
            unassigned_shipments: unassigned_diagnostics,
        },
        summary,
        strict_temperature_breach,
    }
}

/// Analizar las causas probables de que un envío quedara sin asignar
fn diagnose_unassigned(
    model: &VrpDataModel,
    node: &PlanNode,
    shipment_id: Uuid,
) -> UnassignedDiagnostic {
    let mut likely_reasons = Vec::new();

    // Ninguna ventana alcanzable desde el depósito
    let earliest_arrival =
        model.earliest_departure + model.time_matrix[model.depot_index()][node.index];
    let window_reachable = node.time_windows.iter().any(|&(start, end)| {
        earliest_arrival.max(start) + node.service_duration <= end
    });
    if !window_reachable {
        let last_end = node.time_windows.iter().map(|&(_, end)| end).max().unwrap_or(0);
        likely_reasons.push(LikelyReason {
            kind: DiagnosticKind::TimeWindow,
            message: format!(
                "Time window ends at {}, but earliest possible arrival is {}",
                minutes_to_hhmm(last_end as u32),
                minutes_to_hhmm(earliest_arrival.max(0) as u32)
            ),
            parameter: "planned_departure_time".to_string(),
            current_value: minutes_to_hhmm(model.earliest_departure as u32),
            constraint_value: minutes_to_hhmm(last_end as u32),
        });
    }

    // Techo térmico inalcanzable incluso en viaje directo con el mejor vehículo
    let tracker = TemperatureTracker::new(model.ambient_temperature);
    let travel = model.time_matrix[model.depot_index()][node.index] as f64;
    let best_case_arrival = model
        .vehicles
        .iter()
        .filter(|v| node.temp_ceiling >= v.min_temp_capability)
        .map(|v| {
            v.initial_temp
                + tracker.transit_rise(&v.profile, travel, v.initial_temp)
                + tracker.cooling_effect(&v.profile, travel)
        })
        .fold(f64::INFINITY, f64::min);
    if best_case_arrival > node.temp_ceiling {
        let current = if best_case_arrival.is_finite() {
            format!("{:.1}°C predicted on direct drive", best_case_arrival)
        } else {
            "no vehicle can hold the required temperature".to_string()
        };
        likely_reasons.push(LikelyReason {
            kind: DiagnosticKind::Temperature,
            message: format!(
                "Temperature ceiling {:.1}°C cannot be met by any vehicle",
                node.temp_ceiling
            ),
            parameter: "temp_ceiling".to_string(),
            current_value: current,
            constraint_value: format!("{:.1}°C", node.temp_ceiling),
        });
    }

    // STRICT agrava cualquier causa anterior
    if node.is_strict_sla {
        likely_reasons.push(LikelyReason {
            kind: DiagnosticKind::StrictSla,
            message: "STRICT SLA cannot be satisfied with current constraints".to_string(),
            parameter: "sla_tier".to_string(),
            current_value: "STRICT".to_string(),
            constraint_value: "Must meet all constraints".to_string(),
        });
    }

    // Sin causa específica: capacidad o ruteo
    if likely_reasons.is_empty()
        || (likely_reasons.len() == 1 && likely_reasons[0].kind == DiagnosticKind::StrictSla)
    {
        likely_reasons.push(LikelyReason {
            kind: DiagnosticKind::CapacityOrRouting,
            message: "Could not fit into any route due to capacity or routing constraints"
                .to_string(),
            parameter: "multiple".to_string(),
            current_value: "N/A".to_string(),
            constraint_value: "Vehicle capacity or route optimization".to_string(),
        });
    }

    let windows_display = node
        .time_windows
        .iter()
        .map(|&(start, end)| {
            format!(
                "{}-{}",
                minutes_to_hhmm(start as u32),
                minutes_to_hhmm(end as u32)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    UnassignedDiagnostic {
        shipment_id,
        order_number: node.order_number.clone().unwrap_or_default(),
        address: node.address.clone(),
        time_windows: windows_display,
        temp_limit: node.temp_ceiling,
        sla_tier: if node.is_strict_sla {
            SlaTier::Strict
        } else {
            SlaTier::Standard
        },
        weight_kg: node.demand_weight_g as f64 / 1000.0,
        likely_reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::EnvironmentConfig;
    use crate::models::enums::{InsulationGrade, SlaTier as Tier};
    use crate::services::solver::data_model::tests::{test_params, test_shipment, test_vehicle};
    use crate::services::solver::data_model::build_data_model;
    use crate::services::solver::engine::SolverEngine;
    use std::sync::atomic::AtomicBool;

    fn fast_config() -> EnvironmentConfig {
        let mut config = EnvironmentConfig::default();
        config.solver_plateau_iterations = 40;
        config
    }

    fn solve_and_assemble(model: &VrpDataModel) -> AssembledPlan {
        let cancel = AtomicBool::new(false);
        let outcome = SolverEngine::new(model).solve(&cancel);
        assemble_plan(
            model,
            &outcome,
            NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_stop_sequences_contiguous_from_one() {
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![
            test_shipment("ORD-1", 25.050, 121.580, vec![(480, 900)]),
            test_shipment("ORD-2", 25.055, 121.585, vec![(480, 900)]),
            test_shipment("ORD-3", 25.045, 121.575, vec![(480, 900)]),
        ];
        let model = build_data_model(&vehicles, &shipments, &test_params(), &fast_config());
        let plan = solve_and_assemble(&model);

        assert_eq!(plan.routes.len(), 1);
        let (route, stops) = &plan.routes[0];
        assert_eq!(route.total_stops as usize, stops.len());
        for (i, stop) in stops.iter().enumerate() {
            assert_eq!(stop.sequence, (i + 1) as u32);
            assert!(stop.arrival_minutes <= stop.departure_minutes);
            assert_eq!(
                stop.departure_minutes - stop.arrival_minutes,
                stop.service_duration_minutes
            );
        }
    }

    #[test]
    fn test_route_totals_and_temperatures() {
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![test_shipment("ORD-1", 25.050, 121.580, vec![(480, 900)])];
        let model = build_data_model(&vehicles, &shipments, &test_params(), &fast_config());
        let plan = solve_and_assemble(&model);

        let (route, stops) = &plan.routes[0];
        assert!(route.is_temperature_feasible);
        assert!((route.total_weight_kg - 100.0).abs() < 1e-9);
        assert!((route.initial_temperature - (-5.0)).abs() < 1e-9);
        assert_eq!(route.version, 1);
        assert!(route.route_code.starts_with("R-20240715-AAA-111-"));
        assert!(stops[0].is_temp_feasible);
        assert!(plan.summary.is_feasible);
        assert_eq!(plan.summary.vehicles_used, 1);
    }

    #[test]
    fn test_time_window_diagnostic_for_unreachable_strict() {
        // Ventana que cierra antes de la llegada más temprana posible
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![test_shipment("ORD-1", 25.050, 121.580, vec![(480, 483)])];
        let model = build_data_model(&vehicles, &shipments, &test_params(), &fast_config());
        let plan = solve_and_assemble(&model);

        assert_eq!(plan.unassigned_shipment_ids.len(), 1);
        let diag = &plan.violations.unassigned_shipments[0];
        let kinds: Vec<DiagnosticKind> = diag.likely_reasons.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&DiagnosticKind::TimeWindow));
        assert!(kinds.contains(&DiagnosticKind::StrictSla));
        assert!(plan.routes.is_empty());
        assert!(!plan.strict_temperature_breach);
    }

    #[test]
    fn test_temperature_diagnostic_for_impossible_ceiling() {
        let mut vehicle = test_vehicle("AAA-111");
        vehicle.insulation_grade = InsulationGrade::Basic;
        vehicle.has_strip_curtains = false;
        vehicle.cooling_rate = 0.0;

        let mut shipment = test_shipment("ORD-1", 25.44, 121.57, vec![(0, 1439)]);
        shipment.temp_ceiling = 0.0;
        shipment.sla_tier = Tier::Standard;

        let mut params = test_params();
        params.ambient_temperature = 40.0;
        params.planned_departure_minutes = 0;

        let model = build_data_model(&[vehicle], &[shipment], &params, &fast_config());
        let plan = solve_and_assemble(&model);

        assert_eq!(plan.unassigned_shipment_ids.len(), 1);
        let diag = &plan.violations.unassigned_shipments[0];
        let temp_reason = diag
            .likely_reasons
            .iter()
            .find(|r| r.kind == DiagnosticKind::Temperature)
            .expect("expected TEMPERATURE diagnostic");
        assert_eq!(temp_reason.parameter, "temp_ceiling");
    }

    #[test]
    fn test_capacity_or_routing_fallback_diagnostic() {
        // Ventanas alcanzables y temperatura viable, pero capacidad
        // insuficiente para el segundo envío
        let mut vehicle = test_vehicle("AAA-111");
        vehicle.capacity_weight_kg = 120.0;

        let mut first = test_shipment("ORD-1", 25.050, 121.580, vec![(480, 900)]);
        first.sla_tier = Tier::Standard;
        first.priority = 90;
        let mut second = test_shipment("ORD-2", 25.051, 121.581, vec![(480, 900)]);
        second.sla_tier = Tier::Standard;
        second.priority = 10;

        let model = build_data_model(&[vehicle], &[first, second], &test_params(), &fast_config());
        let plan = solve_and_assemble(&model);

        assert_eq!(plan.unassigned_shipment_ids.len(), 1);
        let diag = &plan.violations.unassigned_shipments[0];
        assert_eq!(diag.order_number, "ORD-2");
        let kinds: Vec<DiagnosticKind> = diag.likely_reasons.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::CapacityOrRouting]);
    }

    #[test]
    fn test_replaying_tracker_reproduces_persisted_temperatures() {
        // Round-trip: volver a correr el tracker sobre la secuencia
        // persistida reproduce las temperaturas dentro de 1e-6
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![
            test_shipment("ORD-1", 25.050, 121.580, vec![(480, 900)]),
            test_shipment("ORD-2", 25.060, 121.590, vec![(480, 900)]),
        ];
        let model = build_data_model(&vehicles, &shipments, &test_params(), &fast_config());
        let plan = solve_and_assemble(&model);

        let (route, stops) = &plan.routes[0];
        let tracker = TemperatureTracker::new(model.ambient_temperature);
        let legs: Vec<RouteLeg> = stops
            .iter()
            .map(|stop| RouteLeg {
                travel_minutes: stop.travel_time_from_prev_minutes as f64,
                service_minutes: stop.service_duration_minutes as f64,
                temp_ceiling: stop.temp_ceiling,
                temp_floor: None,
            })
            .collect();
        let replayed = tracker.track_route(
            &model.vehicles[0].profile,
            route.initial_temperature,
            &legs,
        );

        for (stop, temp) in stops.iter().zip(replayed.iter()) {
            assert!((stop.predicted_arrival_temp - temp.arrival_temp).abs() < 1e-6);
            assert!((stop.predicted_departure_temp - temp.departure_temp).abs() < 1e-6);
            assert!((stop.transit_temp_rise - temp.transit_rise).abs() < 1e-6);
            assert!((stop.service_temp_rise - temp.service_rise).abs() < 1e-6);
            assert!((stop.cooling_applied - temp.cooling_applied).abs() < 1e-6);
        }
    }
}
