use std::sync::Arc;

use serde::Deserialize;
use strum::Display;
use tracing::{error, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{DecrementOutcome, Item, ITEM_NOT_FOUND_MESSAGE};
use crate::storage::ItemStore;

/// Column a listing can be ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Display, ToSchema)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SortField {
    Name,
    Quantity,
    PurchasePrice,
    Supplier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Listing parameters. Everything is optional; the unfiltered listing comes
/// back newest first.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ItemQuery {
    /// Substring matched against name, barcode and supplier.
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub sort_by: Option<SortField>,
    /// Ignored unless `sortBy` is present; defaults to ascending.
    pub sort_order: Option<SortDirection>,
}

/// Read and mutate operations over the item collection. Creation goes
/// through the add-item workflow instead, which owns the create-or-merge
/// decision.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn ItemStore>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(store: Arc<dyn ItemStore>, event_sender: EventSender) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    /// The whole collection, newest first.
    pub async fn list_items(&self) -> Result<Vec<Item>, ServiceError> {
        self.store.list().await
    }

    /// Listing with the category/subcategory selection, text search and
    /// ordering applied in that order.
    #[instrument(skip(self))]
    pub async fn browse(&self, query: &ItemQuery) -> Result<Vec<Item>, ServiceError> {
        let items = self.store.list().await?;
        let mut items = select_items(
            items,
            query.category_id.as_deref(),
            query.subcategory_id.as_deref(),
        );
        if let Some(search) = query.search.as_deref() {
            items = search_items(items, search);
        }
        if let Some(field) = query.sort_by {
            sort_items(
                &mut items,
                field,
                query.sort_order.unwrap_or(SortDirection::Asc),
            );
        }
        Ok(items)
    }

    pub async fn find_by_barcode(&self, barcode: &str) -> Result<Option<Item>, ServiceError> {
        self.store.find_by_barcode(barcode).await
    }

    pub async fn get_by_barcode(&self, barcode: &str) -> Result<Item, ServiceError> {
        self.store
            .find_by_barcode(barcode)
            .await?
            .ok_or_else(|| ServiceError::NotFound(ITEM_NOT_FOUND_MESSAGE.to_string()))
    }

    /// Full-record overwrite keyed by the item id.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub async fn update_item(&self, item: Item) -> Result<Item, ServiceError> {
        let updated = self.store.update(item).await?;

        self.event_sender
            .send(Event::ItemUpdated {
                item_id: updated.id.clone(),
                barcode: updated.barcode.clone(),
            })
            .await
            .map_err(|e| {
                error!("Failed to send ItemUpdated event: {}", e);
                ServiceError::EventError(e)
            })?;

        Ok(updated)
    }

    /// Removes one unit for a scanned barcode. Misses and empty stock come
    /// back as outcomes so the scanner loop can keep running.
    #[instrument(skip(self))]
    pub async fn decrement_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<DecrementOutcome, ServiceError> {
        let outcome = self.store.decrement(barcode).await?;

        if outcome.success {
            if let Some(item) = outcome.item.as_ref() {
                // The scan outcome stands even when the event queue is down.
                if let Err(e) = self
                    .event_sender
                    .send(Event::StockDecremented {
                        item_id: item.id.clone(),
                        barcode: item.barcode.clone(),
                        remaining: item.quantity,
                    })
                    .await
                {
                    error!("Failed to send StockDecremented event: {}", e);
                }
            }
        }

        Ok(outcome)
    }

    pub async fn item_count(&self) -> Result<u64, ServiceError> {
        self.store.count().await
    }
}

/// Applies the sidebar selection: a chosen subcategory narrows by itself and
/// overrides any category choice, otherwise the category applies.
pub fn select_items(
    items: Vec<Item>,
    category_id: Option<&str>,
    subcategory_id: Option<&str>,
) -> Vec<Item> {
    if let Some(subcategory_id) = subcategory_id {
        items
            .into_iter()
            .filter(|item| item.subcategory_id == subcategory_id)
            .collect()
    } else if let Some(category_id) = category_id {
        items
            .into_iter()
            .filter(|item| item.category_id == category_id)
            .collect()
    } else {
        items
    }
}

/// Case-insensitive substring search over name and supplier; the barcode is
/// matched verbatim.
pub fn search_items(items: Vec<Item>, query: &str) -> Vec<Item> {
    let query_lower = query.to_lowercase();
    items
        .into_iter()
        .filter(|item| {
            item.name.to_lowercase().contains(&query_lower)
                || item.barcode.contains(query)
                || item.supplier.to_lowercase().contains(&query_lower)
        })
        .collect()
}

pub fn sort_items(items: &mut [Item], field: SortField, direction: SortDirection) {
    items.sort_by(|a, b| {
        let ordering = match field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Quantity => a.quantity.cmp(&b.quantity),
            SortField::PurchasePrice => a.purchase_price.cmp(&b.purchase_price),
            SortField::Supplier => a.supplier.to_lowercase().cmp(&b.supplier.to_lowercase()),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Header-click rule: reselecting the active column flips the direction,
/// picking a new column starts ascending again.
pub fn toggle_sort(
    current_field: SortField,
    current_direction: SortDirection,
    selected: SortField,
) -> (SortField, SortDirection) {
    if current_field == selected {
        let flipped = match current_direction {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        };
        (current_field, flipped)
    } else {
        (selected, SortDirection::Asc)
    }
}
