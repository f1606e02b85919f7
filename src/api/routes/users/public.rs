//! Public types for the users API
use serde::{Deserialize, Serialize};

use crate::roles::RoleName;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: i64,
}

/// Request to register a new account
#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: Option<String>,
}

/// Response to a registration. The key is the only credential the
/// account has, so it is returned exactly once.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: User,
    pub api_key: String,
}

/// The caller's own profile
#[derive(Serialize, Deserialize)]
pub struct MeResponse {
    pub user: User,
    pub roles: Vec<RoleName>,
}
