//! Configuration for the session service

use crate::domain::entities::{REMEMBERED_SESSION_DAYS, STANDARD_SESSION_DAYS};

/// Configuration for the session service
#[derive(Debug, Clone)]
pub struct SessionServiceConfig {
    /// Session lifetime in days for a standard login
    pub standard_session_days: i64,
    /// Session lifetime in days for a "remember me" login
    pub remembered_session_days: i64,
    /// Length of generated refresh-token values in characters
    pub token_length: usize,
}

impl Default for SessionServiceConfig {
    fn default() -> Self {
        Self {
            standard_session_days: STANDARD_SESSION_DAYS,
            remembered_session_days: REMEMBERED_SESSION_DAYS,
            token_length: 48,
        }
    }
}

impl SessionServiceConfig {
    /// Session lifetime in days for the given login kind
    pub fn duration_days(&self, remember: bool) -> i64 {
        if remember {
            self.remembered_session_days
        } else {
            self.standard_session_days
        }
    }
}

impl From<&vl_shared::config::SessionConfig> for SessionServiceConfig {
    fn from(config: &vl_shared::config::SessionConfig) -> Self {
        Self {
            standard_session_days: config.standard_session_days,
            remembered_session_days: config.remembered_session_days,
            token_length: config.token_length,
        }
    }
}
