//! Public types for the roles API
use serde::{Deserialize, Serialize};

use crate::roles::RoleName;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindUserRequest {
    pub search_text: String,
}

/// A user found by the promote panel, with their strongest role
#[derive(Serialize, Deserialize)]
pub struct FoundUser {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleName>,
}

#[derive(Serialize, Deserialize)]
pub struct FindUserResponse {
    pub user: FoundUser,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteRequest {
    pub user_id: String,
    pub role_name: RoleName,
}
