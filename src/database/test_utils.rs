use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use super::migrations::Migrator;

/// Fresh in-memory database with the recipe schema applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}
