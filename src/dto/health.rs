use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::format_system_time;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether every court record passed the integrity check.
    pub integrity: bool,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(integrity: bool) -> Self {
        Self {
            status: "ok".to_string(),
            integrity,
        }
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            integrity: false,
        }
    }
}

/// Response of the `/keep-alive` route.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KeepAliveResponse {
    pub status: String,
    /// RFC 3339 server time.
    pub timestamp: String,
}

impl KeepAliveResponse {
    pub fn now() -> Self {
        Self {
            status: "alive".to_string(),
            timestamp: format_system_time(std::time::SystemTime::now()),
        }
    }
}
