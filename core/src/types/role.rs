//! Roles.

use serde::{Deserialize, Serialize};

use super::common::{AuditFields, EnableStatus};

pub type RoleId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub role_name: String,
    pub role_code: String,
    pub role_desc: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

/// Unpaginated role summary; only enabled roles are listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllRole {
    pub id: RoleId,
    pub role_name: String,
    pub role_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EnableStatus>,
}
