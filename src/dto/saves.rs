use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::SaveListItemEntity,
    dto::{format_system_time, validation::validate_user_name},
};

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct SaveSummary {
    pub name: String,
    /// RFC 3339 time of the save.
    pub saved_at: String,
}

impl From<SaveListItemEntity> for SaveSummary {
    fn from(entity: SaveListItemEntity) -> Self {
        Self {
            name: entity.name,
            saved_at: format_system_time(entity.saved_at),
        }
    }
}

/// Stored snapshots, newest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaveListResponse {
    pub saves: Vec<SaveSummary>,
}

/// Name under which a snapshot was written.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveResponse {
    pub name: String,
}

/// Replace the live contest with a stored snapshot.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct LoadSaveRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}
