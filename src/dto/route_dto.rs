//! DTOs de Route

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::enums::{RouteStatus, SlaTier};
use crate::models::route::{Route, RouteStop};
use crate::utils::time::minutes_to_hhmm;

/// Parada de ruta con su análisis termodinámico
#[derive(Debug, Serialize)]
pub struct RouteStopResponse {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub order_number: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub sequence: u32,
    pub arrival_time: String,
    pub departure_time: String,
    pub service_duration_minutes: u32,
    pub wait_minutes: u32,
    pub target_window_index: usize,
    pub distance_from_prev_meters: i64,
    pub travel_time_from_prev_minutes: i64,
    pub predicted_arrival_temp: f64,
    pub transit_temp_rise: f64,
    pub service_temp_rise: f64,
    pub cooling_applied: f64,
    pub predicted_departure_temp: f64,
    pub is_temp_feasible: bool,
    pub temp_ceiling: f64,
    pub sla_tier: SlaTier,
}

impl From<RouteStop> for RouteStopResponse {
    fn from(stop: RouteStop) -> Self {
        Self {
            id: stop.id,
            shipment_id: stop.shipment_id,
            order_number: stop.order_number,
            address: stop.address,
            latitude: stop.latitude,
            longitude: stop.longitude,
            sequence: stop.sequence,
            arrival_time: minutes_to_hhmm(stop.arrival_minutes),
            departure_time: minutes_to_hhmm(stop.departure_minutes),
            service_duration_minutes: stop.service_duration_minutes,
            wait_minutes: stop.wait_minutes,
            target_window_index: stop.target_window_index,
            distance_from_prev_meters: stop.distance_from_prev_meters,
            travel_time_from_prev_minutes: stop.travel_time_from_prev_minutes,
            predicted_arrival_temp: stop.predicted_arrival_temp,
            transit_temp_rise: stop.transit_temp_rise,
            service_temp_rise: stop.service_temp_rise,
            cooling_applied: stop.cooling_applied,
            predicted_departure_temp: stop.predicted_departure_temp,
            is_temp_feasible: stop.is_temp_feasible,
            temp_ceiling: stop.temp_ceiling,
            sla_tier: stop.sla_tier,
        }
    }
}

/// Response de ruta completa con paradas ordenadas
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub id: Uuid,
    pub route_code: String,
    pub plan_date: String,
    pub job_id: Uuid,
    pub vehicle_id: Uuid,
    pub license_plate: String,
    pub driver_name: Option<String>,
    pub status: RouteStatus,
    pub total_stops: u32,
    pub total_distance_km: f64,
    pub total_duration_minutes: i64,
    pub total_weight_kg: f64,
    pub total_volume_m3: f64,
    pub initial_temperature: f64,
    pub predicted_final_temp: f64,
    pub predicted_max_temp: f64,
    pub is_temperature_feasible: bool,
    pub departure_time: String,
    pub return_time: String,
    pub version: i64,
    pub stops: Vec<RouteStopResponse>,
}

impl RouteResponse {
    pub fn from_route(route: Route, mut stops: Vec<RouteStop>) -> Self {
        stops.sort_by_key(|s| s.sequence);
        Self {
            id: route.id,
            route_code: route.route_code,
            plan_date: route.plan_date.to_string(),
            job_id: route.job_id,
            vehicle_id: route.vehicle_id,
            license_plate: route.license_plate,
            driver_name: route.driver_name,
            status: route.status,
            total_stops: route.total_stops,
            total_distance_km: route.total_distance_meters as f64 / 1000.0,
            total_duration_minutes: route.total_duration_minutes,
            total_weight_kg: route.total_weight_kg,
            total_volume_m3: route.total_volume_m3,
            initial_temperature: route.initial_temperature,
            predicted_final_temp: route.predicted_final_temp,
            predicted_max_temp: route.predicted_max_temp,
            is_temperature_feasible: route.is_temperature_feasible,
            departure_time: minutes_to_hhmm(route.departure_minutes),
            return_time: minutes_to_hhmm(route.return_minutes),
            version: route.version,
            stops: stops.into_iter().map(RouteStopResponse::from).collect(),
        }
    }
}

/// Request para actualizar el estado de una ruta con lock optimista
#[derive(Debug, Deserialize)]
pub struct UpdateRouteStatusRequest {
    pub status: String,
    pub version: i64,
}
