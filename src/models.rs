use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Quantities below this count as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// One inventory record: a physical product identified by its barcode, with a
/// purchase price and an on-hand quantity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub barcode: String,
    pub name: String,
    pub supplier: String,
    pub image_url: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub purchase_price: Decimal,
    pub quantity: i32,
    pub category_id: String,
    pub subcategory_id: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating an item; the store assigns the id and timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct NewItem {
    pub barcode: String,
    pub name: String,
    pub supplier: String,
    pub image_url: String,
    pub purchase_price: Decimal,
    pub quantity: i32,
    pub category_id: String,
    pub subcategory_id: String,
}

impl NewItem {
    pub fn into_item(self, id: String, created_at: DateTime<Utc>) -> Item {
        Item {
            id,
            barcode: self.barcode,
            name: self.name,
            supplier: self.supplier,
            image_url: self.image_url,
            purchase_price: self.purchase_price,
            quantity: self.quantity,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            created_at,
        }
    }
}

/// Coarse presentation bucket for an on-hand quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

impl Item {
    pub fn stock_level(&self) -> StockLevel {
        if self.quantity == 0 {
            StockLevel::OutOfStock
        } else if self.quantity < LOW_STOCK_THRESHOLD {
            StockLevel::Low
        } else {
            StockLevel::InStock
        }
    }

    /// Suppliers whose name contains "cpu" price without VAT, so the listing
    /// appends a "+ PDV" note.
    pub fn shows_vat_note(&self) -> bool {
        self.supplier.to_lowercase().contains("cpu")
    }
}

/// Normalized product data fetched from the UPC database; consumed only to
/// pre-fill the add-item form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub name: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

/// Result of a decrement-by-scan. Both failure verdicts are ordinary
/// outcomes, not transport errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DecrementOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
}

/// Message shown whenever a barcode or item id resolves to nothing.
pub const ITEM_NOT_FOUND_MESSAGE: &str = "Artikal nije pronađen";

impl DecrementOutcome {
    /// No item carries the scanned barcode.
    pub fn not_found() -> Self {
        Self {
            success: false,
            message: ITEM_NOT_FOUND_MESSAGE.to_string(),
            item: None,
        }
    }

    /// The item exists but its quantity is already zero.
    pub fn out_of_stock(item: Item) -> Self {
        Self {
            success: false,
            message: "Nema na lageru".to_string(),
            item: Some(item),
        }
    }

    /// One unit was removed; `item` carries the updated record.
    pub fn decremented(item: Item) -> Self {
        Self {
            success: true,
            message: format!(
                "Količina smanjena: {} ({} preostalo)",
                item.name, item.quantity
            ),
            item: Some(item),
        }
    }
}
