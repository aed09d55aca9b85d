pub mod answer_queue;
pub mod contest;
mod hub;
pub mod presence;
pub mod round;
mod snapshot;
pub mod sync;

use std::sync::Arc;

use dashmap::DashSet;
use tokio::sync::{RwLock, broadcast, watch};
use uuid::Uuid;

use crate::{config::AppConfig, dao::snapshot_store::SnapshotStore};

pub use self::hub::{ChangeHub, ContestChanged};
use self::{
    contest::{Contest, ContestError},
    presence::PresenceTracker,
};

pub type SharedState = Arc<AppState>;

/// Capacity of the change notification channel; slow subscribers skip ahead.
const CHANGE_CAPACITY: usize = 64;

/// Central application state: the contest behind its lock, connections and the snapshot store.
pub struct AppState {
    config: AppConfig,
    contest: RwLock<Contest>,
    changes: ChangeHub,
    presence: PresenceTracker,
    clients: DashSet<Uuid>,
    snapshot_store: RwLock<Option<Arc<dyn SnapshotStore>>>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a snapshot store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            contest: RwLock::new(Contest::new(config.contest().clone())),
            config,
            changes: ChangeHub::new(CHANGE_CAPACITY),
            presence: PresenceTracker::new(),
            clients: DashSet::new(),
            snapshot_store: RwLock::new(None),
            degraded: degraded_tx,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run a read-only view of the contest under the shared lock.
    pub async fn read<T>(&self, view: impl FnOnce(&Contest) -> T) -> T {
        let contest = self.contest.read().await;
        view(&contest)
    }

    /// Run a mutation under the exclusive lock and notify subscribers when it succeeds.
    pub async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut Contest) -> Result<T, ContestError>,
    ) -> Result<T, ContestError> {
        let mut contest = self.contest.write().await;
        let outcome = apply(&mut contest)?;
        self.changes.broadcast(ContestChanged {
            header_version: contest.header().version,
            versions: contest.versions(),
        });
        Ok(outcome)
    }

    /// Subscribe to post-mutation notifications.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ContestChanged> {
        self.changes.subscribe()
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    /// Record a new message-channel connection and return its id.
    pub fn register_client(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.clients.insert(id);
        id
    }

    pub fn unregister_client(&self, id: &Uuid) {
        self.clients.remove(id);
    }

    /// Number of open message-channel connections.
    pub fn connected_clients(&self) -> usize {
        self.clients.len()
    }

    /// Obtain a handle to the current snapshot store, if one is installed.
    pub async fn snapshot_store(&self) -> Option<Arc<dyn SnapshotStore>> {
        let guard = self.snapshot_store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a new snapshot store implementation and leave degraded mode.
    pub async fn set_snapshot_store(&self, store: Arc<dyn SnapshotStore>) {
        {
            let mut guard = self.snapshot_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_mutation_notifies_subscribers() {
        let state = AppState::new(AppConfig::default());
        let mut changes = state.subscribe_changes();

        state
            .mutate(|contest| contest.open(1, 1, 10, "Q?".into()))
            .await
            .unwrap();

        let change = changes.recv().await.unwrap();
        assert_eq!(change.versions[0], 1);
    }

    #[tokio::test]
    async fn rejected_mutation_is_silent() {
        let state = AppState::new(AppConfig::default());
        let mut changes = state.subscribe_changes();

        let err = state.mutate(|contest| contest.close(1, 1)).await.unwrap_err();
        assert!(matches!(err, ContestError::InvalidQuestion { .. }));
        assert!(changes.try_recv().is_err());
        assert_eq!(state.read(|contest| contest.versions()[0]).await, 0);
    }

    #[tokio::test]
    async fn starts_degraded_until_store_installed() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded().await);
        let mut watcher = state.degraded_watcher();
        state.update_degraded(false).await;
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());
    }
}
