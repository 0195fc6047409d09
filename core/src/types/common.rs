//! Shapes shared by every resource: the pagination envelope, audit fields
//! and plain acknowledgements.

use serde::{Deserialize, Serialize};

/// Paginated list envelope returned by every list endpoint.
///
/// `current` and `size` are 1-based page cursors echoed back by the server;
/// `total` is the server-side match count, not `records.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub current: u32,
    pub size: u32,
    pub total: u64,
    pub records: Vec<T>,
}

impl<T> Page<T> {
    /// Number of pages needed to hold `total` records at the current size.
    pub fn page_count(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.current) < self.page_count()
    }
}

/// Enable flag used by roles and menus: `"1"` enabled, `"2"` disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnableStatus {
    #[serde(rename = "1")]
    Enabled,
    #[serde(rename = "2")]
    Disabled,
}

/// Audit columns carried by role and menu records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EnableStatus>,
}

/// `{"message": "..."}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}
