//! Almacén en memoria
//!
//! El almacén relacional es un colaborador externo; este módulo lo
//! reemplaza detrás de la misma superficie de repositorios. Todas las
//! escrituras toman secciones cortas bajo el lock; la persistencia del
//! plan es una única sección de escritura (todo o nada).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::models::depot::Depot;
use crate::models::job::PlanningJob;
use crate::models::route::{Route, RouteStop};
use crate::models::shipment::Shipment;
use crate::models::vehicle::Vehicle;

#[derive(Debug, Default)]
pub(crate) struct StoreInner {
    pub depots: HashMap<Uuid, Depot>,
    pub vehicles: HashMap<Uuid, Vehicle>,
    pub shipments: HashMap<Uuid, Shipment>,
    pub routes: HashMap<Uuid, Route>,
    /// Paradas por ruta, ordenadas por secuencia
    pub route_stops: HashMap<Uuid, Vec<RouteStop>>,
    pub jobs: HashMap<Uuid, PlanningJob>,
}

/// Handle clonable al estado compartido
#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<StoreInner>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().await
    }
}
