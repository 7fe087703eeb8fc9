//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the VoltLog
//! session subsystem. It provides the concrete MySQL implementation of
//! the core's `TokenRepository` trait together with connection-pool
//! management.
//!
//! The domain logic lives entirely in `vl_core`; everything here is
//! replaceable plumbing behind the repository seam.

// Re-export core error types for convenience
pub use vl_core::errors::*;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Configuration module for infrastructure services
pub mod config {
    //! Configuration management for infrastructure services

    use serde::{Deserialize, Serialize};
    use vl_shared::config::{DatabaseConfig, SessionConfig};

    /// Infrastructure configuration settings
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct InfrastructureConfig {
        /// Database configuration
        pub database: DatabaseConfig,
        /// Session configuration
        pub session: SessionConfig,
    }

    impl Default for InfrastructureConfig {
        fn default() -> Self {
            Self {
                database: DatabaseConfig::default(),
                session: SessionConfig::default(),
            }
        }
    }

    impl InfrastructureConfig {
        /// Load configuration from environment variables
        ///
        /// Reads a `.env` file when present, then `DATABASE_URL` and
        /// friends.
        pub fn from_env() -> Self {
            dotenvy::dotenv().ok();
            Self {
                database: DatabaseConfig::from_env(),
                session: SessionConfig::default(),
            }
        }
    }
}
