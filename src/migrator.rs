use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240401_000001_create_items_table::Migration)]
    }
}

// Migration implementations

mod m20240401_000001_create_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000001_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create items table aligned with entities::item Model; column
            // names keep the legacy lower-cased spellings
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::Id)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Items::Barcode).string().not_null())
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::Supplier).string().not_null())
                        .col(ColumnDef::new(Items::ImageUrl).string().not_null())
                        .col(ColumnDef::new(Items::PurchasePrice).decimal().not_null())
                        .col(
                            ColumnDef::new(Items::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Items::CategoryId).string().not_null())
                        .col(ColumnDef::new(Items::SubcategoryId).string().not_null())
                        .col(
                            ColumnDef::new(Items::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Barcode lookups are the hot path and duplicates are rejected
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_barcode")
                        .table(Items::Table)
                        .col(Items::Barcode)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // Listing orders by creation time descending
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_createdat")
                        .table(Items::Table)
                        .col(Items::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
        Barcode,
        Name,
        Supplier,
        #[sea_orm(iden = "imageurl")]
        ImageUrl,
        #[sea_orm(iden = "purchaseprice")]
        PurchasePrice,
        Quantity,
        #[sea_orm(iden = "categoryid")]
        CategoryId,
        #[sea_orm(iden = "subcategoryid")]
        SubcategoryId,
        #[sea_orm(iden = "createdat")]
        CreatedAt,
    }
}
