use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{
        rpc::MutationAck,
        saves::{LoadSaveRequest, SaveListResponse, SaveResponse},
    },
    error::AppError,
    services::persistence_service,
    state::SharedState,
};

/// Snapshot routes backed by the snapshot store.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rpc/saves", get(list_saves).post(save_now))
        .route("/rpc/saves/load", post(load_save))
}

/// Stored snapshots, newest first.
#[utoipa::path(
    get,
    path = "/rpc/saves",
    tag = "saves",
    responses(
        (status = 200, description = "Stored snapshots", body = SaveListResponse),
        (status = 503, description = "Snapshot store unavailable")
    )
)]
pub async fn list_saves(State(state): State<SharedState>) -> Result<Json<SaveListResponse>, AppError> {
    let saves = persistence_service::list_saves(&state).await?;
    Ok(Json(saves))
}

/// Snapshot the contest immediately.
#[utoipa::path(
    post,
    path = "/rpc/saves",
    tag = "saves",
    responses(
        (status = 200, description = "Snapshot written", body = SaveResponse),
        (status = 503, description = "Snapshot store unavailable")
    )
)]
pub async fn save_now(State(state): State<SharedState>) -> Result<Json<SaveResponse>, AppError> {
    let saved = persistence_service::save_now(&state).await?;
    Ok(Json(saved))
}

/// Replace the live contest with a stored snapshot.
#[utoipa::path(
    post,
    path = "/rpc/saves/load",
    tag = "saves",
    request_body = LoadSaveRequest,
    responses(
        (status = 200, description = "Contest restored", body = MutationAck),
        (status = 404, description = "No such snapshot"),
        (status = 409, description = "Snapshot rejected by the contest rules"),
        (status = 503, description = "Snapshot store unavailable")
    )
)]
pub async fn load_save(
    State(state): State<SharedState>,
    Json(payload): Json<LoadSaveRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = persistence_service::load_save(&state, payload).await?;
    Ok(Json(ack))
}
