use std::{future::Future, sync::Arc, time::Duration};

use time::{OffsetDateTime, macros::format_description};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::{
    dao::{models::ContestEntity, snapshot_store::SnapshotStore, storage::StorageResult},
    dto::{
        rpc::MutationAck,
        saves::{LoadSaveRequest, SaveListResponse, SaveResponse, SaveSummary},
    },
    error::ServiceError,
    services::contest_service::validate,
    state::SharedState,
};

/// Upper bound for a single snapshot store call.
const STORAGE_TIMEOUT: Duration = Duration::from_secs(10);

async fn require_store(state: &SharedState) -> Result<Arc<dyn SnapshotStore>, ServiceError> {
    if state.is_degraded().await {
        return Err(ServiceError::Degraded);
    }
    state.snapshot_store().await.ok_or(ServiceError::Degraded)
}

async fn with_timeout<T>(
    future: impl Future<Output = StorageResult<T>>,
) -> Result<T, ServiceError> {
    timeout(STORAGE_TIMEOUT, future)
        .await
        .map_err(|_| ServiceError::Timeout)?
        .map_err(Into::into)
}

/// File name for a snapshot taken now while the contest is on `round`.
pub fn snapshot_name(round: usize, at: OffsetDateTime) -> String {
    let stamp = at
        .format(format_description!(
            "[year]_[month repr:short]_[day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    format!("Rd{round:02}_{stamp}")
}

/// Snapshot the contest under the read lock and write it with the lock released.
pub async fn save_now(state: &SharedState) -> Result<SaveResponse, ServiceError> {
    let store = require_store(state).await?;
    let (round, snapshot) = state
        .read(|contest| (contest.current_round(), ContestEntity::from(contest)))
        .await;
    let name = snapshot_name(round, OffsetDateTime::now_utc());

    with_timeout(store.save(name.clone(), snapshot)).await?;
    info!(name = %name, "contest snapshot saved");
    Ok(SaveResponse { name })
}

pub async fn list_saves(state: &SharedState) -> Result<SaveListResponse, ServiceError> {
    let store = require_store(state).await?;
    let saves = with_timeout(store.list()).await?;
    Ok(SaveListResponse {
        saves: saves.into_iter().map(SaveSummary::from).collect(),
    })
}

/// Replace the live contest with a stored snapshot.
///
/// The snapshot is replayed on a copy, so a rejected snapshot leaves the live contest untouched.
pub async fn load_save(
    state: &SharedState,
    request: LoadSaveRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    state.presence().touch(&request.user);
    let store = require_store(state).await?;
    let snapshot = with_timeout(store.load(request.name.clone()))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("snapshot `{}`", request.name)))?;

    let outcome = state
        .mutate(|contest| {
            let mut restored = contest.clone();
            restored.restore(snapshot)?;
            *contest = restored;
            Ok(MutationAck {
                header_version: contest.header().version,
                versions: contest.versions(),
                queue_index: None,
                current_round: contest.current_round(),
            })
        })
        .await;

    match outcome {
        Ok(ack) => {
            info!(user = %request.user, name = %request.name, current_round = ack.current_round, "contest restored from snapshot");
            Ok(ack)
        }
        Err(err) => {
            warn!(user = %request.user, name = %request.name, error = %err, "snapshot rejected");
            Err(err.into())
        }
    }
}
