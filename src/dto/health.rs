use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Number of open message-channel connections.
    pub connected_clients: usize,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(connected_clients: usize) -> Self {
        Self {
            status: "ok".to_string(),
            connected_clients,
        }
    }

    /// Create a health response indicating the snapshot store is unavailable.
    pub fn degraded(connected_clients: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            connected_clients,
        }
    }
}
