use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness, logging snapshot store issues without failing the check.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.snapshot_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "snapshot store health check failed");
            }
        }
        None => warn!("snapshot store unavailable (degraded mode)"),
    }

    let connected = state.connected_clients();
    if state.is_degraded().await {
        HealthResponse::degraded(connected)
    } else {
        HealthResponse::ok(connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[tokio::test]
    async fn reports_degraded_without_store() {
        let state = AppState::new(AppConfig::default());
        let health = health_status(&state).await;
        assert_eq!(health, HealthResponse::degraded(0));
    }

    #[tokio::test]
    async fn counts_registered_connections() {
        let state = AppState::new(AppConfig::default());
        let first = state.register_client();
        let second = state.register_client();
        assert_ne!(first, second);
        assert_eq!(health_status(&state).await, HealthResponse::degraded(2));

        state.unregister_client(&first);
        assert_eq!(health_status(&state).await, HealthResponse::degraded(1));
    }
}
