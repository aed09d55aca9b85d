use crate::{
    dto::{contest::SyncResponse, rpc::SyncRequest},
    error::ServiceError,
    services::contest_service::validate,
    state::SharedState,
};

/// Rounds changed since `request.known_versions`, read under one consistent lock.
pub async fn sync(state: &SharedState, request: SyncRequest) -> Result<SyncResponse, ServiceError> {
    validate(&request)?;
    Ok(diff_since(state, &request.known_versions).await)
}

pub(crate) async fn diff_since(state: &SharedState, known: &[u64]) -> SyncResponse {
    state
        .read(|contest| SyncResponse::from_diff(contest, contest.diff(known)))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState, state::contest::ContestSettings};

    fn state() -> SharedState {
        AppState::new(AppConfig::default().with_contest(ContestSettings {
            n_rounds: 3,
            ..ContestSettings::default()
        }))
    }

    #[tokio::test]
    async fn sync_returns_only_changed_rounds_with_header() {
        let state = state();
        state
            .mutate(|contest| contest.set_show_host(2, "Pat".into()))
            .await
            .unwrap();

        let response = sync(&state, SyncRequest::default()).await.unwrap();
        assert_eq!(response.versions, vec![0, 1, 0]);
        assert_eq!(response.rounds.len(), 1);
        assert_eq!(response.rounds[0].number, 2);
        assert_eq!(response.rounds[0].show_host, "Pat");
        assert_eq!(response.header.current_round, 1);

        let again = sync(
            &state,
            SyncRequest {
                known_versions: response.versions.clone(),
            },
        )
        .await
        .unwrap();
        assert!(again.rounds.is_empty());
    }
}
