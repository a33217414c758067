use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum TopupRequests {
    Table,
    Id,
    UserId,
    UserEmail,
    Amount,
    Currency,
    PaymentMethod,
    PaymentReference,
    Status,
    AdminNotes,
    ProcessedById,
    ProcessedByEmail,
    ProcessedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TopupRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TopupRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TopupRequests::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TopupRequests::UserEmail)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TopupRequests::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TopupRequests::Currency)
                            .string_len(10)
                            .not_null()
                            .default("DZD"),
                    )
                    .col(
                        ColumnDef::new(TopupRequests::PaymentMethod)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TopupRequests::PaymentReference)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TopupRequests::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TopupRequests::AdminNotes).text().null())
                    .col(
                        ColumnDef::new(TopupRequests::ProcessedById)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TopupRequests::ProcessedByEmail)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TopupRequests::ProcessedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TopupRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TopupRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_topup_requests_user", TopupRequests::UserId),
            ("idx_topup_requests_status", TopupRequests::Status),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(TopupRequests::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(TopupRequests::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
