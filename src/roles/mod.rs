//! Role definitions and permission checks

pub mod db;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

/// Site roles in precedence order. A user holding several roles is
/// treated as the strongest one they hold.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Emperor,
    Duke,
    Knight,
    Civilian,
}

impl RoleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Emperor => "emperor",
            RoleName::Duke => "duke",
            RoleName::Knight => "knight",
            RoleName::Civilian => "civilian",
        }
    }
}

impl std::str::FromStr for RoleName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emperor" => Ok(RoleName::Emperor),
            "duke" => Ok(RoleName::Duke),
            "knight" => Ok(RoleName::Knight),
            "civilian" => Ok(RoleName::Civilian),
            other => Err(anyhow::anyhow!("Unknown role: {}", other)),
        }
    }
}

impl ToSql for RoleName {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for RoleName {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        // Serde deserialization can only parse an enum from a string
        // if it's double quoted.
        serde_json::from_str(&format!("\"{}\"", value.as_str()?))
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// The strongest role out of a set, by precedence.
pub fn strongest(roles: &[RoleName]) -> Option<RoleName> {
    roles.iter().copied().min()
}

/// Actions restricted to a subset of roles. Anything not listed here
/// (mailboxes, messages, sending, API keys) only requires a valid
/// login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ManageWebhook,
    ManageConfig,
    PromoteUser,
}

impl Permission {
    pub fn allows(&self, role: RoleName) -> bool {
        match self {
            Permission::ManageWebhook => matches!(
                role,
                RoleName::Emperor | RoleName::Duke | RoleName::Knight
            ),
            Permission::ManageConfig | Permission::PromoteUser => role == RoleName::Emperor,
        }
    }
}

/// True if any of the user's roles grants the permission.
pub fn can(roles: &[RoleName], permission: Permission) -> bool {
    roles.iter().any(|r| permission.allows(*r))
}
