use async_trait::async_trait;
use rust_decimal_macros::dec;
use tracing::info;

use crate::errors::ServiceError;
use crate::models::{DecrementOutcome, Item, NewItem};

mod database;
mod memory;

pub use database::DbItemStore;
pub use memory::MemoryItemStore;

/// Message returned when an insert or update would give two items the same
/// barcode. Barcodes identify items on the scanner path, so they stay unique.
pub const DUPLICATE_BARCODE_MESSAGE: &str = "Artikal s ovim barkodom već postoji";

/// Capability surface every item store provides. Handlers and the add-item
/// workflow only talk to this trait, so the backing store can be swapped
/// between the in-memory adapter and the database adapter per deployment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items, newest first.
    async fn list(&self) -> Result<Vec<Item>, ServiceError>;

    async fn find_by_barcode(&self, barcode: &str) -> Result<Option<Item>, ServiceError>;

    /// Persists a new item under a freshly assigned id. Fails with a
    /// conflict when another item already carries the barcode.
    async fn insert(&self, new_item: NewItem) -> Result<Item, ServiceError>;

    /// Full-record overwrite keyed by the item id.
    async fn update(&self, item: Item) -> Result<Item, ServiceError>;

    /// Removes a single unit for the scanned barcode. Missing items and
    /// items already at zero are reported as outcomes, never as errors, and
    /// the quantity is never driven below zero.
    async fn decrement(&self, barcode: &str) -> Result<DecrementOutcome, ServiceError>;

    async fn count(&self) -> Result<u64, ServiceError>;
}

/// The stock the shop carried when the tracker went live. Fresh deployments
/// start from this list so the table is never empty on first open.
pub fn starter_items() -> Vec<NewItem> {
    vec![
        NewItem {
            barcode: "1234567890123".to_string(),
            name: "INTEL Core i7-13700KF 3.40GHz LGA-1700 BOXX".to_string(),
            supplier: "IPON".to_string(),
            image_url:
                "https://media.icdn.hu/product/2022-09/833189/2004182_intel-core-i7-13700kf-250ghz-lga-1700-box.webp"
                    .to_string(),
            purchase_price: dec!(350.00),
            quantity: 12,
            category_id: "cat-1".to_string(),
            subcategory_id: "sub-1".to_string(),
        },
        NewItem {
            barcode: "2345678901234".to_string(),
            name: "ASUS ROG STRIX B650E-F GAMING WIFI".to_string(),
            supplier: "IPON".to_string(),
            image_url:
                "https://media.icdn.hu/product/2022-11/861290/2056721_asus-rog-strix-b650e-f-gaming-wifi.webp"
                    .to_string(),
            purchase_price: dec!(180.00),
            quantity: 8,
            category_id: "cat-1".to_string(),
            subcategory_id: "sub-2".to_string(),
        },
        NewItem {
            barcode: "3456789012345".to_string(),
            name: "KINGSTON FURY 32GB Beast RGB DDR5 5600MHz CL36 KIT".to_string(),
            supplier: "CPU".to_string(),
            image_url:
                "https://media.icdn.hu/product/2022-09/831757/1999502_kingston-fury-32gb-beast-rgb-ddr5-5600mhz-cl36-kit-kf556c36bbeak2-32.webp"
                    .to_string(),
            purchase_price: dec!(145.00),
            quantity: 15,
            category_id: "cat-1".to_string(),
            subcategory_id: "sub-3".to_string(),
        },
        NewItem {
            barcode: "4567890123456".to_string(),
            name: "LOGITECH G502 Lightspeed black".to_string(),
            supplier: "Alza".to_string(),
            image_url:
                "https://media.icdn.hu/product/2019-07/559569/1261083_logitech_g502_lightspeed.webp"
                    .to_string(),
            purchase_price: dec!(45.00),
            quantity: 25,
            category_id: "cat-2".to_string(),
            subcategory_id: "sub-8".to_string(),
        },
        NewItem {
            barcode: "5678901234567".to_string(),
            name: "SAMSUNG Odyssey G3 G30D 24 LS24DG300EUXEN".to_string(),
            supplier: "CPU".to_string(),
            image_url:
                "https://media.icdn.hu/product/2024-07/622432/1669413_samsung-odyssey-g3-g30d-27-ls27dg302euxen.webp"
                    .to_string(),
            purchase_price: dec!(420.00),
            quantity: 5,
            category_id: "cat-2".to_string(),
            subcategory_id: "sub-9".to_string(),
        },
    ]
}

/// Inserts the starter inventory into an empty store. Returns the number of
/// items inserted, zero when the store already holds data.
pub async fn seed_if_empty(store: &dyn ItemStore) -> Result<usize, ServiceError> {
    if store.count().await? > 0 {
        return Ok(0);
    }

    let items = starter_items();
    let total = items.len();
    for item in items {
        store.insert(item).await?;
    }

    info!(count = total, "seeded starter inventory");
    Ok(total)
}
