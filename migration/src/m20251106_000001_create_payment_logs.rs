use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum PaymentLogs {
    Table,
    Id,
    LogType,
    Provider,
    Reference,
    Amount,
    Currency,
    OrderId,
    TopupRequestId,
    Payload,
    Response,
    Status,
    ErrorMessage,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum TopupRequests {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentLogs::LogType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentLogs::Provider)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentLogs::Reference)
                            .string_len(255)
                            .null(),
                    )
                    .col(ColumnDef::new(PaymentLogs::Amount).big_integer().null())
                    .col(ColumnDef::new(PaymentLogs::Currency).string_len(10).null())
                    .col(ColumnDef::new(PaymentLogs::OrderId).big_integer().null())
                    .col(
                        ColumnDef::new(PaymentLogs::TopupRequestId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(PaymentLogs::Payload).json().null())
                    .col(ColumnDef::new(PaymentLogs::Response).json().null())
                    .col(
                        ColumnDef::new(PaymentLogs::Status)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentLogs::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(PaymentLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_logs_order")
                            .from(PaymentLogs::Table, PaymentLogs::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_logs_topup")
                            .from(PaymentLogs::Table, PaymentLogs::TopupRequestId)
                            .to(TopupRequests::Table, TopupRequests::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_payment_logs_provider", PaymentLogs::Provider),
            ("idx_payment_logs_order", PaymentLogs::OrderId),
            ("idx_payment_logs_topup", PaymentLogs::TopupRequestId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(PaymentLogs::Table)
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
                    .table(PaymentLogs::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
