use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::entities::item::{self, ActiveModel, Column, Entity as Items};
use crate::errors::ServiceError;
use crate::models::{DecrementOutcome, Item, NewItem, ITEM_NOT_FOUND_MESSAGE};

use super::{ItemStore, DUPLICATE_BARCODE_MESSAGE};

/// Item store backed by sea-orm. Works against Postgres in production and
/// sqlite in tests; the decrement runs as one conditional UPDATE so parallel
/// scans can never drive a quantity below zero.
#[derive(Debug, Clone)]
pub struct DbItemStore {
    db: Arc<DatabaseConnection>,
}

impl DbItemStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn fetch_by_barcode(&self, barcode: &str) -> Result<Option<item::Model>, ServiceError> {
        Items::find()
            .filter(Column::Barcode.eq(barcode))
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

#[async_trait]
impl ItemStore for DbItemStore {
    async fn list(&self) -> Result<Vec<Item>, ServiceError> {
        let models = Items::find()
            .order_by_desc(Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(models.into_iter().map(Item::from).collect())
    }

    async fn find_by_barcode(&self, barcode: &str) -> Result<Option<Item>, ServiceError> {
        Ok(self.fetch_by_barcode(barcode).await?.map(Item::from))
    }

    async fn insert(&self, new_item: NewItem) -> Result<Item, ServiceError> {
        // The unique index on barcode backs this check against racing inserts.
        if self.fetch_by_barcode(&new_item.barcode).await?.is_some() {
            return Err(ServiceError::Conflict(DUPLICATE_BARCODE_MESSAGE.to_string()));
        }

        let model = item::active_model_for_insert(new_item, Uuid::new_v4().to_string(), Utc::now())
            .insert(self.db.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(model.into())
    }

    async fn update(&self, item: Item) -> Result<Item, ServiceError> {
        let existing = Items::find_by_id(item.id.clone())
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(ITEM_NOT_FOUND_MESSAGE.to_string()))?;

        if existing.barcode != item.barcode {
            let taken = Items::find()
                .filter(Column::Barcode.eq(item.barcode.as_str()))
                .filter(Column::Id.ne(item.id.as_str()))
                .one(self.db.as_ref())
                .await
                .map_err(ServiceError::DatabaseError)?;
            if taken.is_some() {
                return Err(ServiceError::Conflict(DUPLICATE_BARCODE_MESSAGE.to_string()));
            }
        }

        let model = ActiveModel::from(item)
            .update(self.db.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(model.into())
    }

    async fn decrement(&self, barcode: &str) -> Result<DecrementOutcome, ServiceError> {
        let updated = Items::update_many()
            .col_expr(Column::Quantity, Expr::col(Column::Quantity).sub(1))
            .filter(Column::Barcode.eq(barcode))
            .filter(Column::Quantity.gt(0))
            .exec(self.db.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)?;

        let current = self.fetch_by_barcode(barcode).await?;
        match (updated.rows_affected, current) {
            (0, None) => Ok(DecrementOutcome::not_found()),
            (0, Some(model)) => Ok(DecrementOutcome::out_of_stock(model.into())),
            (_, Some(model)) => Ok(DecrementOutcome::decremented(model.into())),
            (_, None) => Err(ServiceError::InternalError(
                "decremented row vanished before readback".to_string(),
            )),
        }
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        Items::find()
            .count(self.db.as_ref())
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
