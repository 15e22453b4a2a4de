use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_customers_table::Migration),
            Box::new(m20240301_000002_create_jobs_table::Migration),
            Box::new(m20240301_000003_create_billing_tables::Migration),
            Box::new(m20240301_000004_create_procurement_tables::Migration),
            Box::new(m20240301_000005_create_rag_tables::Migration),
        ]
    }
}

mod m20240301_000001_create_customers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Customers::TenantId).uuid().not_null())
                        .col(ColumnDef::new(Customers::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(ColumnDef::new(Customers::City).string().null())
                        .col(ColumnDef::new(Customers::State).string().null())
                        .col(ColumnDef::new(Customers::Zip).string().null())
                        .col(ColumnDef::new(Customers::Notes).text().null())
                        .col(ColumnDef::new(Customers::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_tenant_id")
                        .table(Customers::Table)
                        .col(Customers::TenantId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        TenantId,
        Name,
        Email,
        Phone,
        Address,
        City,
        State,
        Zip,
        Notes,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_jobs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_jobs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Jobs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Jobs::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Jobs::TenantId).uuid().not_null())
                        .col(ColumnDef::new(Jobs::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Jobs::JobNumber).string_len(32).not_null())
                        .col(ColumnDef::new(Jobs::Title).string().not_null())
                        .col(ColumnDef::new(Jobs::Description).text().null())
                        .col(ColumnDef::new(Jobs::Address).string().null())
                        .col(ColumnDef::new(Jobs::RoofType).string().null())
                        .col(ColumnDef::new(Jobs::RoofSquares).decimal_len(12, 2).null())
                        .col(ColumnDef::new(Jobs::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Jobs::ScheduledStart)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Jobs::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Jobs::EstimatedRevenue)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Jobs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Jobs::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_jobs_customer")
                                .from(Jobs::Table, Jobs::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_jobs_tenant_status")
                        .table(Jobs::Table)
                        .col(Jobs::TenantId)
                        .col(Jobs::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_jobs_customer_id")
                        .table(Jobs::Table)
                        .col(Jobs::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Jobs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Jobs {
        Table,
        Id,
        TenantId,
        CustomerId,
        JobNumber,
        Title,
        Description,
        Address,
        RoofType,
        RoofSquares,
        Status,
        ScheduledStart,
        CompletedAt,
        EstimatedRevenue,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
    }
}

mod m20240301_000003_create_billing_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_billing_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Estimates::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Estimates::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Estimates::TenantId).uuid().not_null())
                        .col(ColumnDef::new(Estimates::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Estimates::JobId).uuid().null())
                        .col(
                            ColumnDef::new(Estimates::EstimateNumber)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Estimates::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Estimates::LineItems).json().not_null())
                        .col(ColumnDef::new(Estimates::Subtotal).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(Estimates::TaxRate).decimal_len(8, 6).not_null())
                        .col(ColumnDef::new(Estimates::TaxAmount).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(Estimates::Total).decimal_len(14, 2).not_null())
                        .col(
                            ColumnDef::new(Estimates::ValidUntil)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Estimates::Notes).text().null())
                        .col(ColumnDef::new(Estimates::InvoiceId).uuid().null())
                        .col(
                            ColumnDef::new(Estimates::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Estimates::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_estimates_tenant_status")
                        .table(Estimates::Table)
                        .col(Estimates::TenantId)
                        .col(Estimates::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Invoices::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Invoices::TenantId).uuid().not_null())
                        .col(ColumnDef::new(Invoices::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Invoices::JobId).uuid().null())
                        .col(ColumnDef::new(Invoices::EstimateId).uuid().null())
                        .col(
                            ColumnDef::new(Invoices::InvoiceNumber)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Invoices::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Invoices::LineItems).json().not_null())
                        .col(ColumnDef::new(Invoices::Subtotal).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(Invoices::TaxRate).decimal_len(8, 6).not_null())
                        .col(ColumnDef::new(Invoices::TaxAmount).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(Invoices::Total).decimal_len(14, 2).not_null())
                        .col(
                            ColumnDef::new(Invoices::AmountPaid)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::IssueDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::DueDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::PaidAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Invoices::Notes).text().null())
                        .col(
                            ColumnDef::new(Invoices::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoices_tenant_status")
                        .table(Invoices::Table)
                        .col(Invoices::TenantId)
                        .col(Invoices::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoices_customer_id")
                        .table(Invoices::Table)
                        .col(Invoices::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payments::TenantId).uuid().not_null())
                        .col(ColumnDef::new(Payments::InvoiceId).uuid().not_null())
                        .col(ColumnDef::new(Payments::Amount).decimal_len(14, 2).not_null())
                        .col(ColumnDef::new(Payments::Method).string().null())
                        .col(ColumnDef::new(Payments::Reference).string().null())
                        .col(
                            ColumnDef::new(Payments::ReceivedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Payments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payments_invoice")
                                .from(Payments::Table, Payments::InvoiceId)
                                .to(Invoices::Table, Invoices::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payments_invoice_id")
                        .table(Payments::Table)
                        .col(Payments::InvoiceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Estimates::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Estimates {
        Table,
        Id,
        TenantId,
        CustomerId,
        JobId,
        EstimateNumber,
        Status,
        LineItems,
        Subtotal,
        TaxRate,
        TaxAmount,
        Total,
        ValidUntil,
        Notes,
        InvoiceId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Invoices {
        Table,
        Id,
        TenantId,
        CustomerId,
        JobId,
        EstimateId,
        InvoiceNumber,
        Status,
        LineItems,
        Subtotal,
        TaxRate,
        TaxAmount,
        Total,
        AmountPaid,
        IssueDate,
        DueDate,
        PaidAt,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Payments {
        Table,
        Id,
        TenantId,
        InvoiceId,
        Amount,
        Method,
        Reference,
        ReceivedAt,
        CreatedAt,
    }
}

mod m20240301_000004_create_procurement_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_procurement_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vendors::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Vendors::TenantId).uuid().not_null())
                        .col(ColumnDef::new(Vendors::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Vendors::ContactName).string().null())
                        .col(ColumnDef::new(Vendors::Email).string().null())
                        .col(ColumnDef::new(Vendors::Phone).string().null())
                        .col(ColumnDef::new(Vendors::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Vendors::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Vendors::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vendors_tenant_id")
                        .table(Vendors::Table)
                        .col(Vendors::TenantId)
                        .to_owned(),
                )
                .await?;

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
                        .col(ColumnDef::new(InventoryItems::TenantId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::Sku).string_len(64).not_null())
                        .col(ColumnDef::new(InventoryItems::Name).string_len(200).not_null())
                        .col(ColumnDef::new(InventoryItems::Category).string().null())
                        .col(ColumnDef::new(InventoryItems::Unit).string_len(32).not_null())
                        .col(
                            ColumnDef::new(InventoryItems::QuantityOnHand)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::ReorderPoint)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UnitCost)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(InventoryItems::VendorId).uuid().null())
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_items_tenant_sku")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::TenantId)
                        .col(InventoryItems::Sku)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::TenantId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrders::VendorId).uuid().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::PoNumber)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Status)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::LineItems).json().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalAmount)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::ExpectedDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::Notes).text().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::SubmittedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::ReceivedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_orders_vendor")
                                .from(PurchaseOrders::Table, PurchaseOrders::VendorId)
                                .to(Vendors::Table, Vendors::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_tenant_status")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::TenantId)
                        .col(PurchaseOrders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Vendors {
        Table,
        Id,
        TenantId,
        Name,
        ContactName,
        Email,
        Phone,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InventoryItems {
        Table,
        Id,
        TenantId,
        Sku,
        Name,
        Category,
        Unit,
        QuantityOnHand,
        ReorderPoint,
        UnitCost,
        VendorId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchaseOrders {
        Table,
        Id,
        TenantId,
        VendorId,
        PoNumber,
        Status,
        LineItems,
        TotalAmount,
        ExpectedDate,
        Notes,
        SubmittedAt,
        ReceivedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000005_create_rag_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_rag_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RagDocuments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RagDocuments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RagDocuments::TenantId).uuid().not_null())
                        .col(ColumnDef::new(RagDocuments::Path).text().not_null())
                        .col(
                            ColumnDef::new(RagDocuments::ContentHash)
                                .string_len(64)
                                .not_null(),
                        )
                        .col(ColumnDef::new(RagDocuments::ByteLen).big_integer().not_null())
                        .col(ColumnDef::new(RagDocuments::ChunkCount).integer().not_null())
                        .col(
                            ColumnDef::new(RagDocuments::Embedded)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(RagDocuments::IngestedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RagDocuments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RagDocuments::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_rag_documents_tenant_path")
                        .table(RagDocuments::Table)
                        .col(RagDocuments::TenantId)
                        .col(RagDocuments::Path)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RagChunks::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(RagChunks::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(RagChunks::TenantId).uuid().not_null())
                        .col(ColumnDef::new(RagChunks::DocumentId).uuid().not_null())
                        .col(ColumnDef::new(RagChunks::ChunkIndex).integer().not_null())
                        .col(ColumnDef::new(RagChunks::StartChar).big_integer().not_null())
                        .col(ColumnDef::new(RagChunks::EndChar).big_integer().not_null())
                        .col(ColumnDef::new(RagChunks::Content).text().not_null())
                        .col(
                            ColumnDef::new(RagChunks::ContentHash)
                                .string_len(64)
                                .not_null(),
                        )
                        .col(ColumnDef::new(RagChunks::Embedding).json().null())
                        .col(
                            ColumnDef::new(RagChunks::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_rag_chunks_document")
                                .from(RagChunks::Table, RagChunks::DocumentId)
                                .to(RagDocuments::Table, RagDocuments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_rag_chunks_tenant_document")
                        .table(RagChunks::Table)
                        .col(RagChunks::TenantId)
                        .col(RagChunks::DocumentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RagChunks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RagDocuments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum RagDocuments {
        Table,
        Id,
        TenantId,
        Path,
        ContentHash,
        ByteLen,
        ChunkCount,
        Embedded,
        IngestedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum RagChunks {
        Table,
        Id,
        TenantId,
        DocumentId,
        ChunkIndex,
        StartChar,
        EndChar,
        Content,
        ContentHash,
        Embedding,
        CreatedAt,
    }
}
