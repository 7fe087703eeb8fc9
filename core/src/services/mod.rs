//! Business services containing domain logic and use cases.

pub mod session;

// Re-export commonly used types
pub use session::{
    CleanupResult, RotationOutcome, SessionCleanupConfig, SessionCleanupService, SessionService,
    SessionServiceConfig,
};
