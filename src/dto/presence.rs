use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::state::presence::{Role, UserPresence};

/// Query parameters for the user list.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
pub struct UsersQuery {
    /// Activity window in seconds; defaults to the configured idle window.
    pub window_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct UserSummary {
    pub name: String,
    pub role: Role,
    /// Whole seconds since the user's last request.
    pub idle_secs: u64,
    /// Whole seconds since the user's last role change.
    pub in_role_secs: u64,
}

impl From<UserPresence> for UserSummary {
    fn from(user: UserPresence) -> Self {
        Self {
            name: user.name,
            role: user.role,
            idle_secs: user.idle_for.as_secs(),
            in_role_secs: user.in_role_for.as_secs(),
        }
    }
}

/// Users split around the activity window.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct UsersResponse {
    pub window_secs: u64,
    pub active: Vec<UserSummary>,
    pub idle: Vec<UserSummary>,
}
