use std::time::Duration;

use tracing::info;

use crate::{
    dto::{
        presence::{UserSummary, UsersQuery, UsersResponse},
        rpc::{RenameUserRequest, SetRoleRequest},
    },
    error::ServiceError,
    services::contest_service::validate,
    state::SharedState,
};

/// Active and idle users around the requested window.
pub fn list_users(state: &SharedState, query: UsersQuery) -> UsersResponse {
    let window = query
        .window_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| state.config().idle_window());
    let presence = state.presence();
    UsersResponse {
        window_secs: window.as_secs(),
        active: presence.recent(window).into_iter().map(UserSummary::from).collect(),
        idle: presence.idle(window).into_iter().map(UserSummary::from).collect(),
    }
}

pub fn set_role(state: &SharedState, request: SetRoleRequest) -> Result<(), ServiceError> {
    validate(&request)?;
    state.presence().set_role(&request.user, request.role);
    info!(user = %request.user, role = ?request.role, "user role changed");
    Ok(())
}

pub fn rename_user(state: &SharedState, request: RenameUserRequest) -> Result<(), ServiceError> {
    validate(&request)?;
    state.presence().rename(&request.old_name, &request.new_name);
    info!(old = %request.old_name, new = %request.new_name, "user renamed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        state::{AppState, presence::Role},
    };

    #[test]
    fn roles_show_up_in_user_list() {
        let state = AppState::new(AppConfig::default());
        set_role(
            &state,
            SetRoleRequest {
                user: "carol".into(),
                role: Role::Caller,
            },
        )
        .unwrap();

        let users = list_users(&state, UsersQuery::default());
        assert_eq!(users.window_secs, 300);
        assert_eq!(users.active.len(), 1);
        assert_eq!(users.active[0].role, Role::Caller);
        assert!(users.idle.is_empty());
    }
}
