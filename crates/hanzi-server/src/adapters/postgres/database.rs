//! PostgreSQL connection lifecycle
//!
//! One pool per process, opened at startup and closed on shutdown.
//! Repositories receive clones of the pool.

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// Handle to the connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open the pool, retrying the first connection a few times
    pub async fn open(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let attempts = config.connect_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(config.connect_options())
                .await;

            match result {
                Ok(pool) => {
                    tracing::info!(
                        "Connected to PostgreSQL at {}:{}/{} (schema {})",
                        config.host,
                        config.port,
                        config.name,
                        config.schema
                    );
                    return Ok(Self { pool });
                }
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        "Database connection attempt {}/{} failed: {}",
                        attempt,
                        attempts,
                        e
                    );
                    tracing::info!("Retrying in {:?}", config.connect_retry_delay);
                    tokio::time::sleep(config.connect_retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all connections, waiting for checked-out ones to return
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
