pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_wallet_tables;
mod m20250901_000002_create_topup_requests;
mod m20250903_000001_create_subscription_tables;
mod m20250908_000001_create_orders;
mod m20251106_000001_create_payment_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_wallet_tables::Migration),
            Box::new(m20250901_000002_create_topup_requests::Migration),
            Box::new(m20250903_000001_create_subscription_tables::Migration),
            Box::new(m20250908_000001_create_orders::Migration),
            Box::new(m20251106_000001_create_payment_logs::Migration),
        ]
    }
}
