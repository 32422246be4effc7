//! Modelo de datos del solver VRP
//!
//! Normaliza los snapshots de vehículos y envíos en un modelo canónico:
//! nodos (el depósito es siempre el índice 0), matrices de
//! distancia/tiempo, demandas enteras, ventanas horarias por nodo y
//! costos del objetivo lexicográfico. Todas las cantidades son enteras
//! para la búsqueda de costo entero.

use std::time::Duration;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::models::enums::PlanningStrategy;
use crate::models::job::JobParameters;
use crate::models::shipment::Shipment;
use crate::models::vehicle::Vehicle;
use crate::services::geo_service::{build_distance_matrix, build_time_matrix};
use crate::services::temperature::ThermalProfile;

/// Coeficiente sobre el span global de la dimensión de tiempo; empuja
/// hacia finales más tempranos (nivel 3 del objetivo)
pub const GLOBAL_SPAN_COEFFICIENT: i64 = 10;

/// Nodo del modelo: depósito (índice 0) o punto de entrega
#[derive(Debug, Clone)]
pub struct PlanNode {
    pub index: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,

    // Solo para nodos de envío
    pub shipment_id: Option<Uuid>,
    pub order_number: Option<String>,

    /// Ventanas horarias en minutos desde medianoche (1 o 2 intervalos)
    pub time_windows: Vec<(i64, i64)>,
    pub service_duration: i64,

    // Demanda entera: kg → gramos, m³ → litros
    pub demand_weight_g: i64,
    pub demand_volume_l: i64,

    pub temp_ceiling: f64,
    pub temp_floor: Option<f64>,
    pub is_strict_sla: bool,
    pub priority: i32,
}

impl PlanNode {
    pub fn is_depot(&self) -> bool {
        self.shipment_id.is_none()
    }
}

/// Vehículo del modelo con capacidades enteras y perfil térmico
#[derive(Debug, Clone)]
pub struct VehicleData {
    pub index: usize,
    pub vehicle_id: Uuid,
    pub license_plate: String,

    pub capacity_weight_g: i64,
    pub capacity_volume_l: i64,

    pub profile: ThermalProfile,
    pub min_temp_capability: f64,
    pub initial_temp: f64,

    pub driver_id: Option<Uuid>,
    pub driver_name: Option<String>,
}

/// Límites de la dimensión laboral opcional
#[derive(Debug, Clone, Copy)]
pub struct LaborLimits {
    pub daily_limit_minutes: i64,
    pub weekly_limit_minutes: i64,
}

impl LaborLimits {
    /// Cota superior blanda: mínimo entre lo restante diario y semanal
    pub fn soft_bound(&self) -> i64 {
        self.daily_limit_minutes.min(self.weekly_limit_minutes)
    }
}

/// Modelo canónico completo para el solver
#[derive(Debug, Clone)]
pub struct VrpDataModel {
    pub nodes: Vec<PlanNode>,
    pub vehicles: Vec<VehicleData>,

    /// Distancias en metros, simétrica, diagonal cero
    pub distance_matrix: Vec<Vec<i64>>,
    /// Tiempos de viaje en minutos
    pub time_matrix: Vec<Vec<i64>>,

    // Parámetros ambientales
    pub ambient_temperature: f64,
    pub initial_cargo_temperature: f64,

    /// Salida más temprana desde el depósito (minutos desde medianoche)
    pub earliest_departure: i64,
    /// Fin del horizonte de planificación
    pub horizon_end: i64,

    pub time_limit: Duration,
    pub plateau_iterations: u32,
    pub strategy: PlanningStrategy,

    // Costos
    /// Costo fijo efectivo por vehículo usado (ya ajustado por estrategia)
    pub vehicle_fixed_cost: i64,
    /// Base para penalidades de descarte de envíos STANDARD
    pub drop_penalty_base: i64,
    pub temp_violation_penalty: i64,
    pub late_delivery_penalty: i64,
    pub infeasible_cost: i64,

    pub labor: Option<LaborLimits>,
}

impl VrpDataModel {
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    pub fn depot_index(&self) -> usize {
        0
    }

    /// Penalidad de descarte del nodo (disyunción).
    ///
    /// STRICT: costo "efectivamente infinito" que impide el descarte
    /// frente a cualquier solución factible. STANDARD: penalidad finita
    /// escalada por prioridad, de modo que los envíos de mayor prioridad
    /// resisten más el descarte. La base ya supera el costo fijo de un
    /// vehículo, así que nunca conviene descartar solo para achicar la
    /// flota.
    pub fn disjunction_penalty(&self, node: &PlanNode) -> i64 {
        if node.is_strict_sla {
            self.infeasible_cost
        } else {
            let priority_multiplier = (100 + node.priority.clamp(0, 100)) as f64 / 100.0;
            (self.drop_penalty_base as f64 * priority_multiplier) as i64
        }
    }
}

/// Cota superior de la distancia de cualquier ruta factible: suma por
/// nodo del arco saliente más largo. Sirve para dimensionar el costo
/// fijo de modo que un vehículo extra siempre cueste más que cualquier
/// ahorro de distancia.
fn route_distance_upper_bound(distance_matrix: &[Vec<i64>]) -> i64 {
    distance_matrix
        .iter()
        .map(|row| row.iter().copied().max().unwrap_or(0))
        .sum()
}

/// Construir el modelo canónico a partir de los snapshots
pub fn build_data_model(
    vehicles: &[Vehicle],
    shipments: &[Shipment],
    params: &JobParameters,
    config: &EnvironmentConfig,
) -> VrpDataModel {
    let horizon_end = params.horizon_end_minutes as i64;

    // Nodo 0: el depósito, abierto durante todo el horizonte
    let mut nodes = Vec::with_capacity(shipments.len() + 1);
    nodes.push(PlanNode {
        index: 0,
        latitude: params.depot_latitude,
        longitude: params.depot_longitude,
        address: params.depot_address.clone(),
        shipment_id: None,
        order_number: None,
        time_windows: vec![(0, horizon_end)],
        service_duration: 0,
        demand_weight_g: 0,
        demand_volume_l: 0,
        temp_ceiling: f64::MAX,
        temp_floor: None,
        is_strict_sla: false,
        priority: 0,
    });

    // Un nodo por envío, índices densos y estables durante la corrida
    for (offset, shipment) in shipments.iter().enumerate() {
        let mut windows: Vec<(i64, i64)> = shipment
            .time_windows
            .iter()
            .map(|tw| (tw.start_minutes as i64, tw.end_minutes as i64))
            .collect();
        if windows.is_empty() {
            windows.push((0, horizon_end));
        }
        windows.sort();

        nodes.push(PlanNode {
            index: offset + 1,
            latitude: shipment.latitude,
            longitude: shipment.longitude,
            address: shipment.delivery_address.clone(),
            shipment_id: Some(shipment.id),
            order_number: Some(shipment.order_number.clone()),
            time_windows: windows,
            service_duration: shipment.service_duration_minutes as i64,
            demand_weight_g: (shipment.weight_kg * 1000.0).round() as i64,
            demand_volume_l: (shipment.volume_m3 * 1000.0).round() as i64,
            temp_ceiling: shipment.temp_ceiling,
            temp_floor: shipment.temp_floor,
            is_strict_sla: shipment.sla_tier.is_hard_constraint(),
            priority: shipment.priority,
        });
    }

    // Orden determinista de vehículos por id
    let mut sorted_vehicles: Vec<&Vehicle> = vehicles.iter().collect();
    sorted_vehicles.sort_by_key(|v| v.id);

    let vehicle_data: Vec<VehicleData> = sorted_vehicles
        .iter()
        .enumerate()
        .map(|(index, v)| VehicleData {
            index,
            vehicle_id: v.id,
            license_plate: v.license_plate.clone(),
            capacity_weight_g: (v.capacity_weight_kg * 1000.0).round() as i64,
            capacity_volume_l: (v.capacity_volume_m3 * 1000.0).round() as i64,
            profile: ThermalProfile {
                k_value: v.k_value(),
                door_coefficient: v.door_coefficient(),
                has_strip_curtains: v.has_strip_curtains,
                cooling_rate: v.cooling_rate,
            },
            min_temp_capability: v.min_temp_capability,
            initial_temp: params.initial_cargo_temperature,
            driver_id: v.driver_id,
            driver_name: v.driver_name.clone(),
        })
        .collect();

    let coordinates: Vec<(f64, f64)> = nodes.iter().map(|n| (n.latitude, n.longitude)).collect();
    let distance_matrix = build_distance_matrix(&coordinates);
    let time_matrix = build_time_matrix(&distance_matrix, config.average_speed_kmh);

    // Costo fijo por vehículo según la estrategia. Para minimizar flota
    // debe dominar cualquier ahorro de distancia: ≥ 10 × la cota de
    // distancia de ruta. Para minimizar distancia queda un valor chico
    // que solo desempata.
    let distance_bound = route_distance_upper_bound(&distance_matrix);
    let vehicle_fixed_cost = match params.strategy {
        PlanningStrategy::MinimizeVehicles => {
            config.vehicle_fixed_cost.max(10 * distance_bound)
        }
        PlanningStrategy::MinimizeDistance => (config.vehicle_fixed_cost / 100).max(1),
    };

    // La base de descarte se ancla en el mayor de ambos costos fijos
    // para que agregar un envío a una ruta existente siempre gane
    // frente a descartarlo.
    let drop_penalty_base = 3 * vehicle_fixed_cost.max(config.vehicle_fixed_cost);

    let labor = config.enable_labor_dimension.then_some(LaborLimits {
        daily_limit_minutes: config.driver_daily_limit_minutes,
        weekly_limit_minutes: config.driver_weekly_limit_minutes,
    });

    VrpDataModel {
        nodes,
        vehicles: vehicle_data,
        distance_matrix,
        time_matrix,
        ambient_temperature: params.ambient_temperature,
        initial_cargo_temperature: params.initial_cargo_temperature,
        earliest_departure: params.planned_departure_minutes as i64,
        horizon_end,
        time_limit: Duration::from_secs(params.time_limit_seconds as u64),
        plateau_iterations: config.solver_plateau_iterations,
        strategy: params.strategy,
        vehicle_fixed_cost,
        drop_penalty_base,
        temp_violation_penalty: config.temp_violation_penalty,
        late_delivery_penalty: config.late_delivery_penalty,
        infeasible_cost: config.infeasible_cost,
        labor,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::enums::{
        DoorType, InsulationGrade, ShipmentStatus, SlaTier, VehicleStatus,
    };
    use crate::models::shipment::TimeWindow;
    use chrono::Utc;

    pub(crate) fn test_vehicle(plate: &str) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            license_plate: plate.to_string(),
            capacity_weight_kg: 1000.0,
            capacity_volume_m3: 10.0,
            insulation_grade: InsulationGrade::Standard,
            door_type: DoorType::Roll,
            has_strip_curtains: true,
            cooling_rate: -2.5,
            min_temp_capability: -20.0,
            status: VehicleStatus::Available,
            driver_id: None,
            driver_name: Some("Conductor Uno".to_string()),
            created_at: Utc::now(),
        }
    }

    pub(crate) fn test_shipment(order: &str, lat: f64, lon: f64, windows: Vec<(u32, u32)>) -> Shipment {
        Shipment {
            id: Uuid::new_v4(),
            order_number: order.to_string(),
            delivery_address: format!("Dirección {}", order),
            latitude: lat,
            longitude: lon,
            weight_kg: 100.0,
            volume_m3: 1.0,
            time_windows: windows
                .into_iter()
                .map(|(s, e)| TimeWindow::new(s, e))
                .collect(),
            service_duration_minutes: 15,
            temp_ceiling: 5.0,
            temp_floor: None,
            sla_tier: SlaTier::Strict,
            priority: 50,
            status: ShipmentStatus::Pending,
            route_id: None,
            route_sequence: None,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn test_params() -> JobParameters {
        JobParameters {
            depot_latitude: 25.0330,
            depot_longitude: 121.5654,
            depot_address: "Depósito central".to_string(),
            planned_departure_minutes: 480,
            horizon_end_minutes: 1439,
            ambient_temperature: 30.0,
            initial_cargo_temperature: -5.0,
            time_limit_seconds: 2,
            strategy: PlanningStrategy::MinimizeVehicles,
        }
    }

    #[test]
    fn test_depot_is_node_zero() {
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![test_shipment("ORD-1", 25.05, 121.58, vec![(480, 600)])];
        let model = build_data_model(&vehicles, &shipments, &test_params(), &EnvironmentConfig::default());

        assert_eq!(model.num_nodes(), 2);
        assert!(model.nodes[0].is_depot());
        assert_eq!(model.nodes[0].service_duration, 0);
        assert_eq!(model.nodes[1].shipment_id, Some(shipments[0].id));
    }

    #[test]
    fn test_integer_demands() {
        let vehicles = vec![test_vehicle("AAA-111")];
        let mut shipment = test_shipment("ORD-1", 25.05, 121.58, vec![(480, 600)]);
        shipment.weight_kg = 123.456;
        shipment.volume_m3 = 2.5;
        let model = build_data_model(&vehicles, &[shipment], &test_params(), &EnvironmentConfig::default());

        assert_eq!(model.nodes[1].demand_weight_g, 123_456);
        assert_eq!(model.nodes[1].demand_volume_l, 2_500);
        assert_eq!(model.vehicles[0].capacity_weight_g, 1_000_000);
        assert_eq!(model.vehicles[0].capacity_volume_l, 10_000);
    }

    #[test]
    fn test_strict_disjunction_penalty_is_infeasible_cost() {
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![test_shipment("ORD-1", 25.05, 121.58, vec![(480, 600)])];
        let config = EnvironmentConfig::default();
        let model = build_data_model(&vehicles, &shipments, &test_params(), &config);

        assert_eq!(
            model.disjunction_penalty(&model.nodes[1]),
            config.infeasible_cost
        );
    }

    #[test]
    fn test_standard_penalty_scales_with_priority() {
        let vehicles = vec![test_vehicle("AAA-111")];
        let mut low = test_shipment("ORD-1", 25.05, 121.58, vec![(480, 600)]);
        low.sla_tier = SlaTier::Standard;
        low.priority = 10;
        let mut high = test_shipment("ORD-2", 25.06, 121.59, vec![(480, 600)]);
        high.sla_tier = SlaTier::Standard;
        high.priority = 90;

        let model = build_data_model(
            &vehicles,
            &[low, high],
            &test_params(),
            &EnvironmentConfig::default(),
        );

        let penalty_low = model.disjunction_penalty(&model.nodes[1]);
        let penalty_high = model.disjunction_penalty(&model.nodes[2]);
        assert!(penalty_high > penalty_low);
    }

    #[test]
    fn test_fixed_cost_dominates_distance_for_minimize_vehicles() {
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![
            test_shipment("ORD-1", 25.05, 121.58, vec![(480, 600)]),
            test_shipment("ORD-2", 25.06, 121.59, vec![(480, 600)]),
        ];
        let model = build_data_model(&vehicles, &shipments, &test_params(), &EnvironmentConfig::default());

        let bound = route_distance_upper_bound(&model.distance_matrix);
        assert!(model.vehicle_fixed_cost >= 10 * bound);
    }

    #[test]
    fn test_minimize_distance_uses_small_fixed_cost() {
        let vehicles = vec![test_vehicle("AAA-111")];
        let shipments = vec![test_shipment("ORD-1", 25.05, 121.58, vec![(480, 600)])];
        let mut params = test_params();
        params.strategy = PlanningStrategy::MinimizeDistance;
        let config = EnvironmentConfig::default();
        let model = build_data_model(&vehicles, &shipments, &params, &config);

        assert!(model.vehicle_fixed_cost < config.vehicle_fixed_cost);
    }

    #[test]
    fn test_vehicles_sorted_by_id() {
        let v1 = test_vehicle("AAA-111");
        let v2 = test_vehicle("BBB-222");
        let shipments = vec![test_shipment("ORD-1", 25.05, 121.58, vec![(480, 600)])];
        let model = build_data_model(
            &[v1.clone(), v2.clone()],
            &shipments,
            &test_params(),
            &EnvironmentConfig::default(),
        );

        let mut expected = [v1.id, v2.id];
        expected.sort();
        assert_eq!(model.vehicles[0].vehicle_id, expected[0]);
        assert_eq!(model.vehicles[1].vehicle_id, expected[1]);
    }
}
