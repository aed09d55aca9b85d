pub mod file;

use crate::dao::models::{ContestEntity, SaveListItemEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for contest snapshots.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, name: String, snapshot: ContestEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn load(&self, name: String) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>>;
    /// Stored snapshots, newest first.
    fn list(&self) -> BoxFuture<'static, StorageResult<Vec<SaveListItemEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
