use crate::config::DatabaseSettings;
use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{info, instrument};

/// Database connection pool wrapper
///
/// Owns the pool for the lifetime of the process; components receive the
/// pool (or a store built from it) explicitly.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(100) NOT NULL,
        owner VARCHAR(100) NOT NULL,
        web_ui VARCHAR(200),
        db_port INTEGER,
        status VARCHAR(50) NOT NULL DEFAULT 'active',
        shutdown_verified BOOLEAN NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS servers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        hostname VARCHAR(100) NOT NULL,
        ip_address VARCHAR(15) NOT NULL,
        ping_status BOOLEAN NOT NULL DEFAULT 1,
        app_id INTEGER NOT NULL REFERENCES applications(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_servers_app_id ON servers(app_id)",
];

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect using the configured URL and make sure the tables exist
    #[instrument(skip(settings), fields(url = %settings.url))]
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.url)?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options)
            .await?;

        let database = Self::new(pool);
        database.bootstrap().await?;
        info!("Database connection established");
        Ok(database)
    }

    /// Private in-memory database on a single pinned connection
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let database = Self::new(pool);
        database.bootstrap().await?;
        Ok(database)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the tables if they are missing
    pub async fn bootstrap(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<()> {
        let row = sqlx::query("SELECT 1 as health_check")
            .fetch_one(&self.pool)
            .await?;

        let health_check: i32 = row.try_get("health_check")?;

        if health_check == 1 {
            Ok(())
        } else {
            Err(Error::Store(sqlx::Error::Protocol(
                "Database health check failed".to_string(),
            )))
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
