use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::{
        presence::{UsersQuery, UsersResponse},
        rpc::{RenameUserRequest, SetRoleRequest},
    },
    error::AppError,
    services::presence_service,
    state::SharedState,
};

/// Presence routes: who is connected and in which role.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rpc/users", get(list_users))
        .route("/rpc/users/role", post(set_role))
        .route("/rpc/users/rename", post(rename_user))
}

/// Users active within the window, and those idle beyond it.
#[utoipa::path(
    get,
    path = "/rpc/users",
    tag = "presence",
    params(UsersQuery),
    responses((status = 200, description = "Active and idle users", body = UsersResponse))
)]
pub async fn list_users(
    State(state): State<SharedState>,
    Query(query): Query<UsersQuery>,
) -> Json<UsersResponse> {
    Json(presence_service::list_users(&state, query))
}

#[utoipa::path(
    post,
    path = "/rpc/users/role",
    tag = "presence",
    request_body = SetRoleRequest,
    responses(
        (status = 204, description = "Role updated"),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn set_role(
    State(state): State<SharedState>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<StatusCode, AppError> {
    presence_service::set_role(&state, payload)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/rpc/users/rename",
    tag = "presence",
    request_body = RenameUserRequest,
    responses(
        (status = 204, description = "User renamed"),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn rename_user(
    State(state): State<SharedState>,
    Json(payload): Json<RenameUserRequest>,
) -> Result<StatusCode, AppError> {
    presence_service::rename_user(&state, payload)?;
    Ok(StatusCode::NO_CONTENT)
}
