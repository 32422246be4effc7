//! DTOs de Depot

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::depot::Depot;
use crate::utils::errors::AppResult;
use crate::utils::time::{minutes_to_hhmm, parse_hhmm};

fn default_open_time() -> String {
    "00:00".to_string()
}

fn default_close_time() -> String {
    "23:59".to_string()
}

/// Request para registrar un depósito
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDepotRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 200))]
    pub address: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[serde(default = "default_open_time")]
    pub open_time: String,

    #[serde(default = "default_close_time")]
    pub close_time: String,
}

impl CreateDepotRequest {
    pub fn into_model(self) -> AppResult<Depot> {
        let open_minutes = parse_hhmm(&self.open_time)?;
        let close_minutes = parse_hhmm(&self.close_time)?;
        if open_minutes >= close_minutes {
            return Err(crate::utils::errors::validation_error(
                "depot open_time must be before close_time",
            ));
        }
        Ok(Depot::new(
            self.name,
            self.address,
            self.latitude,
            self.longitude,
            open_minutes,
            close_minutes,
        ))
    }
}

/// Response de depósito para la API
#[derive(Debug, Serialize)]
pub struct DepotResponse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub open_time: String,
    pub close_time: String,
    pub created_at: String,
}

impl From<Depot> for DepotResponse {
    fn from(depot: Depot) -> Self {
        Self {
            id: depot.id,
            name: depot.name,
            address: depot.address,
            latitude: depot.latitude,
            longitude: depot.longitude,
            open_time: minutes_to_hhmm(depot.open_minutes),
            close_time: minutes_to_hhmm(depot.close_minutes),
            created_at: depot.created_at.to_rfc3339(),
        }
    }
}
