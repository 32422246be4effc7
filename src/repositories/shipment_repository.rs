use uuid::Uuid;

use crate::models::shipment::Shipment;
use crate::repositories::store::Store;
use crate::utils::errors::{AppError, AppResult};

pub struct ShipmentRepository {
    store: Store,
}

impl ShipmentRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, shipment: Shipment) -> AppResult<Shipment> {
        let mut inner = self.store.write().await;

        if inner
            .shipments
            .values()
            .any(|s| s.order_number == shipment.order_number)
        {
            return Err(AppError::Conflict(format!(
                "Shipment with order number '{}' already exists",
                shipment.order_number
            )));
        }

        inner.shipments.insert(shipment.id, shipment.clone());
        Ok(shipment)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Shipment>> {
        let inner = self.store.read().await;
        Ok(inner.shipments.get(&id).cloned())
    }

    pub async fn list(&self) -> AppResult<Vec<Shipment>> {
        let inner = self.store.read().await;
        let mut shipments: Vec<Shipment> = inner.shipments.values().cloned().collect();
        shipments.sort_by_key(|s| s.created_at);
        Ok(shipments)
    }

    /// Snapshot de envíos pendientes al inicio de un trabajo.
    /// Orden determinista por id para que la corrida sea reproducible.
    pub async fn find_pending(&self) -> AppResult<Vec<Shipment>> {
        let inner = self.store.read().await;
        let mut shipments: Vec<Shipment> = inner
            .shipments
            .values()
            .filter(|s| s.is_pending())
            .cloned()
            .collect();
        shipments.sort_by_key(|s| s.id);
        Ok(shipments)
    }

    pub async fn count_pending(&self) -> AppResult<usize> {
        let inner = self.store.read().await;
        Ok(inner.shipments.values().filter(|s| s.is_pending()).count())
    }
}
