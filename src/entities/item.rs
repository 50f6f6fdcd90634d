use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::models::{Item, NewItem};

/// Hosted-table row. Column names are the lower-cased legacy spellings; the
/// overrides map them onto the camel-cased domain shape so no field is
/// silently dropped at the translation boundary.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub barcode: String,
    pub name: String,
    pub supplier: String,
    #[sea_orm(column_name = "imageurl")]
    pub image_url: String,
    #[sea_orm(column_name = "purchaseprice")]
    pub purchase_price: Decimal,
    pub quantity: i32,
    #[sea_orm(column_name = "categoryid")]
    pub category_id: String,
    #[sea_orm(column_name = "subcategoryid")]
    pub subcategory_id: String,
    #[sea_orm(column_name = "createdat")]
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Item {
    fn from(model: Model) -> Self {
        Item {
            id: model.id,
            barcode: model.barcode,
            name: model.name,
            supplier: model.supplier,
            image_url: model.image_url,
            purchase_price: model.purchase_price,
            quantity: model.quantity,
            category_id: model.category_id,
            subcategory_id: model.subcategory_id,
            created_at: model.created_at,
        }
    }
}

impl From<Item> for ActiveModel {
    fn from(item: Item) -> Self {
        ActiveModel {
            id: Set(item.id),
            barcode: Set(item.barcode),
            name: Set(item.name),
            supplier: Set(item.supplier),
            image_url: Set(item.image_url),
            purchase_price: Set(item.purchase_price),
            quantity: Set(item.quantity),
            category_id: Set(item.category_id),
            subcategory_id: Set(item.subcategory_id),
            created_at: Set(item.created_at),
        }
    }
}

/// Builds the row for a fresh insert, with the store-assigned id and
/// timestamp.
pub fn active_model_for_insert(
    new_item: NewItem,
    id: String,
    created_at: DateTime<Utc>,
) -> ActiveModel {
    ActiveModel {
        id: Set(id),
        barcode: Set(new_item.barcode),
        name: Set(new_item.name),
        supplier: Set(new_item.supplier),
        image_url: Set(new_item.image_url),
        purchase_price: Set(new_item.purchase_price),
        quantity: Set(new_item.quantity),
        category_id: Set(new_item.category_id),
        subcategory_id: Set(new_item.subcategory_id),
        created_at: Set(created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn model_round_trips_every_field() {
        let model = Model {
            id: "item-1".into(),
            barcode: "1234567890123".into(),
            name: "INTEL Core i7-13700KF 3.40GHz LGA-1700 BOXX".into(),
            supplier: "IPON".into(),
            image_url: "https://example.com/cpu.webp".into(),
            purchase_price: dec!(350.0),
            quantity: 12,
            category_id: "cat-1".into(),
            subcategory_id: "sub-1".into(),
            created_at: Utc::now(),
        };

        let item: Item = model.clone().into();
        assert_eq!(item.image_url, model.image_url);
        assert_eq!(item.purchase_price, model.purchase_price);
        assert_eq!(item.category_id, model.category_id);
        assert_eq!(item.subcategory_id, model.subcategory_id);
        assert_eq!(item.created_at, model.created_at);

        let active: ActiveModel = item.into();
        assert_eq!(active.barcode.unwrap(), model.barcode);
        assert_eq!(active.quantity.unwrap(), model.quantity);
    }

    #[test]
    fn column_names_keep_the_legacy_spellings() {
        use sea_orm::IdenStatic;

        assert_eq!(Column::ImageUrl.as_str(), "imageurl");
        assert_eq!(Column::PurchasePrice.as_str(), "purchaseprice");
        assert_eq!(Column::CategoryId.as_str(), "categoryid");
        assert_eq!(Column::SubcategoryId.as_str(), "subcategoryid");
        assert_eq!(Column::CreatedAt.as_str(), "createdat");
    }
}
