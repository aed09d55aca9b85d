use std::sync::Arc;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::{
    dao::standings::StandingsSource,
    error::ServiceError,
    services::{persistence_service, standings_service},
    state::SharedState,
};

/// Periodically poll standings for finished rounds, then snapshot the contest.
///
/// Failures are logged and the loop keeps going; it only ends with the task.
pub async fn run(state: SharedState, standings: Option<Arc<dyn StandingsSource>>) {
    let period = state.config().save_interval();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; nothing is worth saving at startup.
    ticker.tick().await;
    info!(period_secs = period.as_secs(), "background timer started");

    loop {
        ticker.tick().await;
        tick(&state, standings.as_deref()).await;
    }
}

/// One timer pass.
pub async fn tick(state: &SharedState, standings: Option<&dyn StandingsSource>) {
    if let Some(source) = standings {
        let announced = standings_service::poll_announcements(state, source).await;
        if announced > 0 {
            info!(announced, "recorded new round announcements");
        }
    }

    match persistence_service::save_now(state).await {
        Ok(saved) => debug!(name = %saved.name, "periodic snapshot written"),
        Err(ServiceError::Degraded) => warn!("skipping periodic snapshot (degraded mode)"),
        Err(err) => warn!(error = %err, "periodic snapshot failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, dao::snapshot_store::file::FileSnapshotStore, state::AppState};

    #[tokio::test]
    async fn tick_without_store_keeps_going() {
        let state = AppState::new(AppConfig::default());
        tick(&state, None).await;
        assert!(state.is_degraded().await);
    }

    #[tokio::test]
    async fn tick_writes_a_snapshot() {
        let dir = std::env::temp_dir().join(format!("trivia-tick-{}", uuid::Uuid::new_v4()));
        let state = AppState::new(AppConfig::default());
        let store = FileSnapshotStore::open(&dir).await.unwrap();
        state.set_snapshot_store(Arc::new(store.clone())).await;

        tick(&state, None).await;

        let saves = crate::dao::snapshot_store::SnapshotStore::list(&store).await.unwrap();
        assert_eq!(saves.len(), 1);
        assert!(saves[0].name.starts_with("Rd01_"));
        let _ = std::fs::remove_dir_all(dir);
    }
}
