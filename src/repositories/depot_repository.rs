use uuid::Uuid;

use crate::models::depot::Depot;
use crate::repositories::store::Store;
use crate::utils::errors::AppResult;

pub struct DepotRepository {
    store: Store,
}

impl DepotRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, depot: Depot) -> AppResult<Depot> {
        let mut inner = self.store.write().await;
        inner.depots.insert(depot.id, depot.clone());
        Ok(depot)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Depot>> {
        let inner = self.store.read().await;
        Ok(inner.depots.get(&id).cloned())
    }

    pub async fn list(&self) -> AppResult<Vec<Depot>> {
        let inner = self.store.read().await;
        let mut depots: Vec<Depot> = inner.depots.values().cloned().collect();
        depots.sort_by_key(|d| d.created_at);
        Ok(depots)
    }
}
