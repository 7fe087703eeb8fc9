//! Session and refresh-token configuration

use serde::{Deserialize, Serialize};

/// Session configuration for refresh-token lifetimes and maintenance
///
/// A standard login produces a one-day session; a "remember me" login
/// produces a thirty-day session. The duration is fixed when the session
/// is created and carried unchanged through every token rotation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Session lifetime in days for a standard login
    pub standard_session_days: i64,

    /// Session lifetime in days for a "remember me" login
    pub remembered_session_days: i64,

    /// Length of generated refresh-token values in characters
    pub token_length: usize,

    /// Session cookie name
    pub cookie_name: String,

    /// Session cookie secure flag (HTTPS only)
    pub secure: bool,

    /// Session cookie HttpOnly flag
    #[serde(default = "default_http_only")]
    pub http_only: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            standard_session_days: 1,
            remembered_session_days: 30,
            token_length: 48,
            cookie_name: String::from("voltlog_refresh"),
            secure: false, // Set to true in production
            http_only: default_http_only(),
        }
    }
}

impl SessionConfig {
    /// Session lifetime in days for the given login kind
    pub fn duration_days(&self, remember: bool) -> i64 {
        if remember {
            self.remembered_session_days
        } else {
            self.standard_session_days
        }
    }
}

fn default_http_only() -> bool {
    true
}
