use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::error::AppResult;

pub type DbPool = sqlx::PgPool;
pub type OrmConn = DatabaseConnection;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open the shared Postgres pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> AppResult<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Apply every pending migration under `migrations/`.
pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    MIGRATOR.run(pool).await.map_err(sqlx::Error::from)?;
    Ok(())
}

/// Wrap an existing pool in a SeaORM connection so both layers share connections.
pub fn create_orm_conn(pool: DbPool) -> OrmConn {
    SqlxPostgresConnector::from_sqlx_postgres_pool(pool)
}

/// Connect, migrate, and hand back the ORM connection.
pub async fn connect_and_migrate(database_url: &str, max_connections: u32) -> AppResult<OrmConn> {
    let pool = create_pool(database_url, max_connections).await?;
    run_migrations(&pool).await?;
    Ok(create_orm_conn(pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn bad_database_url_is_a_database_error() {
        let err = create_pool("not a database url", 1).await.unwrap_err();
        assert!(matches!(err, AppError::DbError(_)));
        assert!(err.is_infrastructure());
    }
}
