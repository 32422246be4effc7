//! Tracker termodinámico
//!
//! Función pura y determinista sobre la secuencia de tramos de una ruta.
//! Predice la temperatura de la carga en cada parada y emite el
//! veredicto de factibilidad. Se ejecuta una vez por ruta candidata
//! después de resolver; no tiene efectos secundarios.
//!
//! Fórmulas (tiempos en HORAS; los coeficientes están calibrados así y
//! mezclar minutos produce errores de orden de magnitud):
//! - ΔT_drive  = t_drive × (T_ambiente − T_actual) × K
//! - ΔT_cool   = t_drive × R            (R negativo = enfría)
//! - ΔT_svc    = t_svc × C × (1 − 0.5 × cortina)

use serde::{Deserialize, Serialize};

/// Perfil térmico de un vehículo
#[derive(Debug, Clone, Copy)]
pub struct ThermalProfile {
    /// Coeficiente de transferencia de calor del aislamiento
    pub k_value: f64,
    /// Coeficiente de pérdida por apertura de puerta
    pub door_coefficient: f64,
    pub has_strip_curtains: bool,
    /// Cambio de temperatura por refrigeración activa, por hora de tránsito
    pub cooling_rate: f64,
}

/// Tramo de ruta: viaje hasta la parada y servicio en ella.
///
/// Los tiempos llegan en minutos (la unidad del solver) y se convierten
/// a horas internamente.
#[derive(Debug, Clone, Copy)]
pub struct RouteLeg {
    pub travel_minutes: f64,
    pub service_minutes: f64,
    pub temp_ceiling: f64,
    pub temp_floor: Option<f64>,
}

/// Predicción de temperatura en una parada
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StopTemperature {
    pub before_arrival: f64,
    pub transit_rise: f64,
    pub cooling_applied: f64,
    pub arrival_temp: f64,
    pub service_rise: f64,
    pub departure_temp: f64,
    pub is_feasible: bool,
    pub violation_amount: f64,
}

/// Tracker de temperatura a lo largo de una ruta
#[derive(Debug, Clone, Copy)]
pub struct TemperatureTracker {
    ambient_temperature: f64,
}

impl TemperatureTracker {
    pub fn new(ambient_temperature: f64) -> Self {
        Self {
            ambient_temperature,
        }
    }

    /// Subida de temperatura durante el tránsito
    pub fn transit_rise(&self, profile: &ThermalProfile, travel_minutes: f64, current: f64) -> f64 {
        let hours = travel_minutes / 60.0;
        hours * (self.ambient_temperature - current) * profile.k_value
    }

    /// Efecto de la refrigeración activa durante el tránsito
    pub fn cooling_effect(&self, profile: &ThermalProfile, travel_minutes: f64) -> f64 {
        let hours = travel_minutes / 60.0;
        hours * profile.cooling_rate
    }

    /// Subida de temperatura por apertura de puerta durante el servicio.
    /// La cortina de tiras reduce la pérdida a la mitad.
    pub fn service_rise(&self, profile: &ThermalProfile, service_minutes: f64) -> f64 {
        let hours = service_minutes / 60.0;
        let curtain_factor = if profile.has_strip_curtains { 0.5 } else { 1.0 };
        hours * profile.door_coefficient * curtain_factor
    }

    /// Predecir la temperatura en cada parada de la ruta.
    ///
    /// `initial_temp` es la temperatura de la carga al salir del depósito.
    pub fn track_route(
        &self,
        profile: &ThermalProfile,
        initial_temp: f64,
        legs: &[RouteLeg],
    ) -> Vec<StopTemperature> {
        let mut results = Vec::with_capacity(legs.len());
        let mut current = initial_temp;

        for leg in legs {
            let transit_rise = self.transit_rise(profile, leg.travel_minutes, current);
            let cooling = self.cooling_effect(profile, leg.travel_minutes);
            let arrival = current + transit_rise + cooling;

            let service_rise = self.service_rise(profile, leg.service_minutes);
            let departure = arrival + service_rise;

            let mut is_feasible = arrival <= leg.temp_ceiling;
            let mut violation = (arrival - leg.temp_ceiling).max(0.0);

            if let Some(floor) = leg.temp_floor {
                if arrival < floor {
                    is_feasible = false;
                    violation = violation.max(floor - arrival);
                }
            }

            results.push(StopTemperature {
                before_arrival: current,
                transit_rise,
                cooling_applied: cooling,
                arrival_temp: arrival,
                service_rise,
                departure_temp: departure,
                is_feasible,
                violation_amount: violation,
            });

            current = departure;
        }

        results
    }

    /// La ruta es factible si todas sus paradas lo son
    pub fn is_route_feasible(stops: &[StopTemperature]) -> bool {
        stops.iter().all(|s| s.is_feasible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ThermalProfile {
        ThermalProfile {
            k_value: 0.05,
            door_coefficient: 0.8,
            has_strip_curtains: false,
            cooling_rate: -2.5,
        }
    }

    fn leg(travel: f64, service: f64, ceiling: f64) -> RouteLeg {
        RouteLeg {
            travel_minutes: travel,
            service_minutes: service,
            temp_ceiling: ceiling,
            temp_floor: None,
        }
    }

    #[test]
    fn test_returns_result_for_each_stop() {
        let tracker = TemperatureTracker::new(30.0);
        let stops = tracker.track_route(&profile(), -5.0, &[leg(10.0, 15.0, 5.0), leg(8.0, 15.0, 8.0)]);
        assert_eq!(stops.len(), 2);
    }

    #[test]
    fn test_first_stop_starts_from_initial_temp() {
        let tracker = TemperatureTracker::new(30.0);
        let p = profile();
        let stops = tracker.track_route(&p, -5.0, &[leg(12.0, 15.0, 5.0)]);

        let expected_rise = (12.0 / 60.0) * (30.0 - (-5.0)) * 0.05;
        let expected_cooling = (12.0 / 60.0) * -2.5;
        let expected_arrival = -5.0 + expected_rise + expected_cooling;

        assert!((stops[0].before_arrival - (-5.0)).abs() < 1e-9);
        assert!((stops[0].arrival_temp - expected_arrival).abs() < 1e-9);
    }

    #[test]
    fn test_departure_equals_arrival_plus_service_rise() {
        let tracker = TemperatureTracker::new(30.0);
        let stops = tracker.track_route(&profile(), -5.0, &[leg(10.0, 20.0, 5.0)]);
        let s = &stops[0];
        assert!((s.departure_temp - (s.arrival_temp + s.service_rise)).abs() < 1e-9);
    }

    #[test]
    fn test_strip_curtains_halve_service_rise() {
        let tracker = TemperatureTracker::new(30.0);
        let without = profile();
        let with = ThermalProfile {
            has_strip_curtains: true,
            ..without
        };

        let rise_without = tracker.service_rise(&without, 30.0);
        let rise_with = tracker.service_rise(&with, 30.0);
        assert!((rise_with - rise_without / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_chained_stops_carry_departure_temp() {
        let tracker = TemperatureTracker::new(30.0);
        let stops = tracker.track_route(&profile(), -5.0, &[leg(10.0, 15.0, 5.0), leg(5.0, 10.0, 8.0)]);
        assert!((stops[1].before_arrival - stops[0].departure_temp).abs() < 1e-9);
    }

    #[test]
    fn test_ceiling_violation_detected() {
        // Aislamiento pobre, sin refrigeración, ambiente muy caliente
        let tracker = TemperatureTracker::new(40.0);
        let p = ThermalProfile {
            k_value: 0.10,
            door_coefficient: 1.2,
            has_strip_curtains: false,
            cooling_rate: 0.0,
        };
        let stops = tracker.track_route(&p, -5.0, &[leg(90.0, 15.0, 0.0)]);

        // ΔT = 1.5h × 45 × 0.10 = 6.75 → llegada en 1.75 °C, techo 0 °C
        assert!(!stops[0].is_feasible);
        assert!((stops[0].arrival_temp - 1.75).abs() < 1e-9);
        assert!((stops[0].violation_amount - 1.75).abs() < 1e-9);
        assert!(!TemperatureTracker::is_route_feasible(&stops));
    }

    #[test]
    fn test_floor_violation_detected() {
        // Refrigeración agresiva por debajo del piso permitido
        let tracker = TemperatureTracker::new(10.0);
        let p = ThermalProfile {
            k_value: 0.02,
            door_coefficient: 0.8,
            has_strip_curtains: true,
            cooling_rate: -20.0,
        };
        let legs = [RouteLeg {
            travel_minutes: 60.0,
            service_minutes: 10.0,
            temp_ceiling: 8.0,
            temp_floor: Some(0.0),
        }];
        let stops = tracker.track_route(&p, 2.0, &legs);
        assert!(!stops[0].is_feasible);
        assert!(stops[0].violation_amount > 0.0);
    }

    #[test]
    fn test_deterministic_replay_reproduces_temperatures() {
        // Re-ejecutar el tracker sobre la misma secuencia reproduce las
        // temperaturas almacenadas dentro de 1e-6
        let tracker = TemperatureTracker::new(32.5);
        let p = profile();
        let legs = [leg(13.0, 15.0, 5.0), leg(7.0, 10.0, 6.0), leg(22.0, 20.0, 8.0)];

        let first = tracker.track_route(&p, -4.5, &legs);
        let second = tracker.track_route(&p, -4.5, &legs);

        for (a, b) in first.iter().zip(second.iter()) {
            assert!((a.arrival_temp - b.arrival_temp).abs() < 1e-6);
            assert!((a.departure_temp - b.departure_temp).abs() < 1e-6);
            assert!((a.transit_rise - b.transit_rise).abs() < 1e-6);
            assert!((a.service_rise - b.service_rise).abs() < 1e-6);
            assert!((a.cooling_applied - b.cooling_applied).abs() < 1e-6);
        }
    }
}
