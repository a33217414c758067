use crate::config::DatabaseConfig;
use crate::error::AppResult;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.as_str());
    options.max_connections(config.max_connections);

    let pool = Database::connect(options).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}

/// In-memory database with the full schema. A single connection so every
/// test query sees the same memory file.
#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let pool = Database::connect(options)
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&pool, None).await.expect("apply migrations");
    pool
}
