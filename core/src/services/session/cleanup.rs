//! Session cleanup service for periodic maintenance of token rows
//!
//! Expiry is enforced lazily when a token is presented, so nothing here
//! is needed for correctness. The purge keeps the table small and
//! drops revoked rows once their audit grace period has passed.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::TokenRepository;

/// Configuration for the session cleanup service
#[derive(Debug, Clone)]
pub struct SessionCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// How long revoked rows are kept for audit (in days)
    pub grace_period_days: i64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for SessionCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            grace_period_days: 7,   // Keep revoked rows for 7 days
            enabled: true,
        }
    }
}

/// Service for purging expired and stale revoked token rows
pub struct SessionCleanupService<R: TokenRepository + 'static> {
    repository: Arc<R>,
    config: SessionCleanupConfig,
}

impl<R: TokenRepository + 'static> SessionCleanupService<R> {
    /// Create a new session cleanup service
    pub fn new(repository: Arc<R>, config: SessionCleanupConfig) -> Self {
        Self { repository, config }
    }

    /// Run a single cleanup cycle
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of the cycle
    /// * `Err(DomainError)` - If the purge fails outright
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        info!("Starting session cleanup cycle");

        let mut result = CleanupResult::default();

        match self
            .repository
            .delete_expired(self.config.grace_period_days)
            .await
        {
            Ok(count) => {
                result.tokens_deleted = count;
                info!("Deleted {} stale token row(s)", count);
            }
            Err(e) => {
                error!("Failed to delete stale token rows: {}", e);
                result.errors.push(format!("Token purge error: {}", e));
            }
        }

        Ok(result)
    }

    /// Start the cleanup service as a background task
    ///
    /// Spawns a tokio task that runs cleanup at regular intervals.
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Session cleanup service is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "Session cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.is_success() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Session cleanup cycle failed: {}", e);
                    }
                }
            }
        });
    }
}

/// Result of a cleanup cycle
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of token rows deleted
    pub tokens_deleted: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
