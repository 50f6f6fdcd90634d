use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{DecrementOutcome, Item, NewItem, ITEM_NOT_FOUND_MESSAGE};

use super::{ItemStore, DUPLICATE_BARCODE_MESSAGE};

/// Item store backed by a vector behind an async lock. Serves deployments
/// that run without a database; contents vanish on restart.
///
/// Every mutation takes the write lock for its whole read-modify-write, so
/// two concurrent decrements of the last unit cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    items: RwLock<Vec<Item>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the store with the given records, ids and timestamps included.
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn list(&self) -> Result<Vec<Item>, ServiceError> {
        let mut items = self.items.read().await.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn find_by_barcode(&self, barcode: &str) -> Result<Option<Item>, ServiceError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.barcode == barcode).cloned())
    }

    async fn insert(&self, new_item: NewItem) -> Result<Item, ServiceError> {
        let mut items = self.items.write().await;
        if items.iter().any(|item| item.barcode == new_item.barcode) {
            return Err(ServiceError::Conflict(DUPLICATE_BARCODE_MESSAGE.to_string()));
        }

        let item = new_item.into_item(Uuid::new_v4().to_string(), Utc::now());
        items.push(item.clone());
        Ok(item)
    }

    async fn update(&self, item: Item) -> Result<Item, ServiceError> {
        let mut items = self.items.write().await;
        if items
            .iter()
            .any(|existing| existing.barcode == item.barcode && existing.id != item.id)
        {
            return Err(ServiceError::Conflict(DUPLICATE_BARCODE_MESSAGE.to_string()));
        }

        let slot = items
            .iter_mut()
            .find(|existing| existing.id == item.id)
            .ok_or_else(|| ServiceError::NotFound(ITEM_NOT_FOUND_MESSAGE.to_string()))?;
        *slot = item.clone();
        Ok(item)
    }

    async fn decrement(&self, barcode: &str) -> Result<DecrementOutcome, ServiceError> {
        let mut items = self.items.write().await;
        let item = match items.iter_mut().find(|item| item.barcode == barcode) {
            Some(item) => item,
            None => return Ok(DecrementOutcome::not_found()),
        };

        if item.quantity <= 0 {
            return Ok(DecrementOutcome::out_of_stock(item.clone()));
        }

        item.quantity -= 1;
        Ok(DecrementOutcome::decremented(item.clone()))
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(self.items.read().await.len() as u64)
    }
}
