//! Session service module for rotating refresh tokens
//!
//! This module handles all session-related operations including:
//! - Issuing sessions at login ("remember me" aware)
//! - Rotating refresh tokens on every use, with replay detection
//! - Ending sessions (logout) and mass revocation
//! - The user-facing session inventory (list, delete one, delete others)
//! - Background cleanup of expired token rows

mod cleanup;
mod config;
mod service;


pub use cleanup::{CleanupResult, SessionCleanupConfig, SessionCleanupService};
pub use config::SessionServiceConfig;
pub use service::{RotationOutcome, SessionService};
