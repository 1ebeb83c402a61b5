use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_inventory_items_table::Migration),
            Box::new(m20250101_000002_create_inventory_transactions_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250101_000001_create_inventory_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create inventory_items table aligned with entities::inventory_item Model
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::PartsName).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::PartsNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::Component).string().not_null())
                        .col(ColumnDef::new(InventoryItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(InventoryItems::ItemPrice).decimal().not_null())
                        .col(ColumnDef::new(InventoryItems::ImageData).text().null())
                        .col(ColumnDef::new(InventoryItems::Rack).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::Tax)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::TotalAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::Pic).string().not_null())
                        .col(ColumnDef::new(InventoryItems::PoNumber).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::CtplNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::AcquiredDate)
                                .date()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::CreatedBy).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Part numbers are the human-facing unique key
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_items_parts_number")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::PartsNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_items_component")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::Component)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_items_created_at")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InventoryItems {
        Table,
        Id,
        PartsName,
        PartsNumber,
        Component,
        Quantity,
        ItemPrice,
        ImageData,
        Rack,
        Tax,
        TotalAmount,
        Pic,
        PoNumber,
        CtplNumber,
        AcquiredDate,
        CreatedBy,
        Version,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000002_create_inventory_transactions_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_inventory_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // No foreign key on ItemId: transaction history outlives item deletion
            manager
                .create_table(
                    Table::create()
                        .table(InventoryTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::PartsName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::PartsNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::TransactionType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::PreviousQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::NewQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Notes)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::PerformedBy)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::PerformedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_transactions_performed_at")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::PerformedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_transactions_item_performed_at")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::ItemId)
                        .col(InventoryTransactions::PerformedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(InventoryTransactions::Table)
                        .to_owned(),
                )
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InventoryTransactions {
        Table,
        Id,
        ItemId,
        PartsName,
        PartsNumber,
        TransactionType,
        Quantity,
        PreviousQuantity,
        NewQuantity,
        Notes,
        PerformedBy,
        PerformedAt,
    }
}
