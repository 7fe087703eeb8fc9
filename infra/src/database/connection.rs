//! Database connection pool management

use std::time::Duration;

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::info;

use vl_shared::config::DatabaseConfig;

/// Wrapper around the SQLx MySQL connection pool
#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
    max_connections: u32,
}

impl DatabasePool {
    /// Create a new connection pool from configuration
    ///
    /// # Arguments
    /// * `config` - Database configuration (URL and pool tuning)
    ///
    /// # Returns
    /// * `Ok(DatabasePool)` - Pool connected and ready
    /// * `Err(sqlx::Error)` - Invalid URL or the database is unreachable
    pub async fn new(config: DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .connect(&config.url)
            .await?;

        info!(
            "Database pool created with up to {} connections",
            config.max_connections
        );

        Ok(Self {
            pool,
            max_connections: config.max_connections,
        })
    }

    /// Access the underlying SQLx pool
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Check that the database answers a trivial query
    pub async fn health_check(&self) -> Result<bool, sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(true)
    }

    /// Snapshot of the pool's connection usage
    pub fn statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle() as u32,
            max_connections: self.max_connections,
        }
    }
}

/// Point-in-time pool usage numbers
#[derive(Debug, Clone, Copy)]
pub struct PoolStatistics {
    /// Connections currently open
    pub connections: u32,
    /// Open connections currently idle
    pub idle_connections: u32,
    /// Configured pool ceiling
    pub max_connections: u32,
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}
