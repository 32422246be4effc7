//! DTOs de Shipment

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::enums::{ShipmentStatus, SlaTier};
use crate::models::shipment::{Shipment, TimeWindow};
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::time::parse_hhmm;

/// Ventana horaria en formato "HH:MM"
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeWindowDto {
    pub start: String,
    pub end: String,
}

fn default_service_duration() -> u32 {
    15
}

/// Request para registrar un envío
#[derive(Debug, Deserialize, Validate)]
pub struct CreateShipmentRequest {
    #[validate(length(min = 1, max = 50))]
    pub order_number: String,

    #[validate(length(min = 1, max = 200))]
    pub delivery_address: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(range(min = 0.1))]
    pub weight_kg: f64,

    #[serde(default)]
    pub volume_m3: f64,

    /// 1 o 2 intervalos disjuntos por día
    pub time_windows: Vec<TimeWindowDto>,

    #[serde(default = "default_service_duration")]
    #[validate(range(min = 1, max = 240))]
    pub service_duration_minutes: u32,

    pub temp_ceiling: f64,
    pub temp_floor: Option<f64>,

    pub sla_tier: SlaTier,

    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub priority: i32,
}

impl CreateShipmentRequest {
    /// Validar y convertir a modelo. Las ventanas deben ser 1 o 2
    /// intervalos con inicio < fin, disjuntos entre sí.
    pub fn into_model(self) -> AppResult<Shipment> {
        if self.time_windows.is_empty() || self.time_windows.len() > 2 {
            return Err(validation_error(
                "time_windows must contain 1 or 2 intervals",
            ));
        }

        let mut windows = Vec::with_capacity(self.time_windows.len());
        for tw in &self.time_windows {
            let start = parse_hhmm(&tw.start)?;
            let end = parse_hhmm(&tw.end)?;
            if start >= end {
                return Err(validation_error("time window start must be before end"));
            }
            windows.push(TimeWindow::new(start, end));
        }
        windows.sort_by_key(|w| w.start_minutes);

        if windows.len() == 2 && windows[0].end_minutes > windows[1].start_minutes {
            return Err(validation_error("time windows must be disjoint"));
        }

        if let Some(floor) = self.temp_floor {
            if floor >= self.temp_ceiling {
                return Err(validation_error("temp_floor must be below temp_ceiling"));
            }
        }

        Ok(Shipment {
            id: Uuid::new_v4(),
            order_number: self.order_number,
            delivery_address: self.delivery_address,
            latitude: self.latitude,
            longitude: self.longitude,
            weight_kg: self.weight_kg,
            volume_m3: self.volume_m3,
            time_windows: windows,
            service_duration_minutes: self.service_duration_minutes,
            temp_ceiling: self.temp_ceiling,
            temp_floor: self.temp_floor,
            sla_tier: self.sla_tier,
            priority: self.priority,
            status: ShipmentStatus::Pending,
            route_id: None,
            route_sequence: None,
            created_at: chrono::Utc::now(),
        })
    }
}

/// Response de envío para la API
#[derive(Debug, Serialize)]
pub struct ShipmentResponse {
    pub id: Uuid,
    pub order_number: String,
    pub delivery_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub weight_kg: f64,
    pub volume_m3: f64,
    pub time_windows: String,
    pub service_duration_minutes: u32,
    pub temp_ceiling: f64,
    pub temp_floor: Option<f64>,
    pub sla_tier: SlaTier,
    pub priority: i32,
    pub status: ShipmentStatus,
    pub route_id: Option<Uuid>,
    pub route_sequence: Option<u32>,
    pub created_at: String,
}

impl From<Shipment> for ShipmentResponse {
    fn from(shipment: Shipment) -> Self {
        let time_windows = shipment.windows_display();
        Self {
            id: shipment.id,
            order_number: shipment.order_number,
            delivery_address: shipment.delivery_address,
            latitude: shipment.latitude,
            longitude: shipment.longitude,
            weight_kg: shipment.weight_kg,
            volume_m3: shipment.volume_m3,
            time_windows,
            service_duration_minutes: shipment.service_duration_minutes,
            temp_ceiling: shipment.temp_ceiling,
            temp_floor: shipment.temp_floor,
            sla_tier: shipment.sla_tier,
            priority: shipment.priority,
            status: shipment.status,
            route_id: shipment.route_id,
            route_sequence: shipment.route_sequence,
            created_at: shipment.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CreateShipmentRequest {
        CreateShipmentRequest {
            order_number: "ORD-1".to_string(),
            delivery_address: "Dirección 1".to_string(),
            latitude: 25.05,
            longitude: 121.58,
            weight_kg: 100.0,
            volume_m3: 1.0,
            time_windows: vec![TimeWindowDto {
                start: "08:00".to_string(),
                end: "10:00".to_string(),
            }],
            service_duration_minutes: 15,
            temp_ceiling: 5.0,
            temp_floor: None,
            sla_tier: SlaTier::Strict,
            priority: 50,
        }
    }

    #[test]
    fn test_single_window_parsed() {
        let shipment = base_request().into_model().unwrap();
        assert_eq!(shipment.time_windows.len(), 1);
        assert_eq!(shipment.time_windows[0].start_minutes, 480);
        assert_eq!(shipment.time_windows[0].end_minutes, 600);
    }

    #[test]
    fn test_two_disjoint_windows_sorted() {
        let mut request = base_request();
        request.time_windows = vec![
            TimeWindowDto {
                start: "14:00".to_string(),
                end: "15:00".to_string(),
            },
            TimeWindowDto {
                start: "06:00".to_string(),
                end: "06:30".to_string(),
            },
        ];
        let shipment = request.into_model().unwrap();
        assert_eq!(shipment.time_windows[0].start_minutes, 360);
        assert_eq!(shipment.time_windows[1].start_minutes, 840);
    }

    #[test]
    fn test_overlapping_windows_rejected() {
        let mut request = base_request();
        request.time_windows = vec![
            TimeWindowDto {
                start: "08:00".to_string(),
                end: "10:00".to_string(),
            },
            TimeWindowDto {
                start: "09:00".to_string(),
                end: "11:00".to_string(),
            },
        ];
        assert!(request.into_model().is_err());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let mut request = base_request();
        request.time_windows = vec![TimeWindowDto {
            start: "10:00".to_string(),
            end: "08:00".to_string(),
        }];
        assert!(request.into_model().is_err());
    }

    #[test]
    fn test_three_windows_rejected() {
        let mut request = base_request();
        request.time_windows = vec![
            TimeWindowDto {
                start: "06:00".to_string(),
                end: "07:00".to_string(),
            },
            TimeWindowDto {
                start: "08:00".to_string(),
                end: "09:00".to_string(),
            },
            TimeWindowDto {
                start: "10:00".to_string(),
                end: "11:00".to_string(),
            },
        ];
        assert!(request.into_model().is_err());
    }

    #[test]
    fn test_floor_above_ceiling_rejected() {
        let mut request = base_request();
        request.temp_floor = Some(6.0);
        assert!(request.into_model().is_err());
    }
}
