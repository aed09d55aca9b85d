use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{snapshot_store::SnapshotStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECOVERY_ATTEMPTS: u32 = 3;

/// Keep a snapshot store installed, flipping the shared state into degraded mode while it is unreachable.
///
/// The contest itself lives in memory, so degraded mode only disables saving and loading.
pub async fn run<F, Fut>(state: SharedState, mut open: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn SnapshotStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match open().await {
            Ok(store) => {
                state.set_snapshot_store(store.clone()).await;
                info!("snapshot store ready; leaving degraded mode");
                delay = INITIAL_DELAY;
                watch_store(&state, store.as_ref()).await;
                warn!("snapshot store still unreachable; reopening from scratch");
            }
            Err(err) => warn!(error = %err, "failed to open snapshot store"),
        }
        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// Poll the store until it fails and cannot be recovered.
async fn watch_store(state: &SharedState, store: &dyn SnapshotStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded().await {
                    info!("snapshot store healthy again; leaving degraded mode");
                    state.update_degraded(false).await;
                }
            }
            Err(err) => {
                warn!(error = %err, "snapshot store health check failed");
                if !recover(state, store).await {
                    return;
                }
                state.update_degraded(false).await;
            }
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

async fn recover(state: &SharedState, store: &dyn SnapshotStore) -> bool {
    let mut delay = INITIAL_DELAY;
    for attempt in 0..MAX_RECOVERY_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "snapshot store recovered");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(attempt, error = %err, "snapshot store unreachable; entering degraded mode");
                    state.update_degraded(true).await;
                } else {
                    warn!(attempt, error = %err, "snapshot store recovery attempt failed");
                }
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::snapshot_store::file::FileSnapshotStore,
        state::AppState,
    };

    #[tokio::test]
    async fn installs_store_and_leaves_degraded_mode() {
        let dir = std::env::temp_dir().join(format!("trivia-supervisor-{}", uuid::Uuid::new_v4()));
        let state = AppState::new(AppConfig::default());
        let mut watcher = state.degraded_watcher();

        let task = tokio::spawn(run(state.clone(), move || {
            let dir = dir.clone();
            async move {
                let store = FileSnapshotStore::open(dir).await?;
                Ok::<Arc<dyn SnapshotStore>, StorageError>(Arc::new(store))
            }
        }));

        tokio::time::timeout(Duration::from_secs(5), watcher.wait_for(|degraded| !degraded))
            .await
            .unwrap()
            .unwrap();
        assert!(state.snapshot_store().await.is_some());
        task.abort();
    }
}
