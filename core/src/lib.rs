//! # VoltLog Core
//!
//! Core business logic and domain layer for the VoltLog backend.
//! This crate contains the session subsystem: refresh-token entities,
//! the rotation engine, repository interfaces, and error types.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
