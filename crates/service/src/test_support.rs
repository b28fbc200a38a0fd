#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with, DATABASE_URL};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn test_db_config(max: u32) -> configs::DatabaseConfig {
    configs::DatabaseConfig {
        url: DATABASE_URL.clone(),
        max_connections: max,
        min_connections: 1,
        connect_timeout_secs: 10,
        idle_timeout_secs: 60,
        acquire_timeout_secs: 10,
        sqlx_logging: false,
    }
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    MIGRATED
        .get_or_init(|| async {
            let db = connect_with(&test_db_config(2)).await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
            models::currency::seed_defaults(&db).await.expect("seed currencies");
            drop(db);
        })
        .await;

    // Return a fresh connection for the current test's runtime
    let db = connect_with(&test_db_config(10)).await?;
    Ok(db)
}
