//! Navigable menu records and the menu tree.
//!
//! Menus form a tree through `parent_id`; top-level entries use
//! [`ROOT_MENU_ID`] as their parent.

use serde::{Deserialize, Serialize};

use super::common::AuditFields;

pub type MenuId = i64;

/// Parent id marking a top-level menu.
pub const ROOT_MENU_ID: MenuId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuType {
    #[serde(rename = "1")]
    Directory,
    #[serde(rename = "2")]
    Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconType {
    #[serde(rename = "1")]
    Iconify,
    #[serde(rename = "2")]
    Local,
}

/// A button permission attached to a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuButton {
    pub code: String,
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuQuery {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: MenuId,
    pub parent_id: MenuId,
    pub menu_type: MenuType,
    pub menu_name: String,
    pub route_name: String,
    pub route_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub icon: String,
    pub icon_type: IconType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<MenuButton>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Menu>>,
    #[serde(flatten)]
    pub route: MenuRouteProps,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Menu {
    pub fn is_top_level(&self) -> bool {
        self.parent_id == ROOT_MENU_ID
    }
}

/// Route-meta properties a menu can carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRouteProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i18n_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_in_menu: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_menu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_tab: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_index_in_tab: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Vec<MenuQuery>>,
}

/// Hierarchical id/label view of the menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuTree {
    pub id: MenuId,
    pub label: String,
    #[serde(rename = "pId")]
    pub p_id: MenuId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MenuTree>>,
}

impl MenuTree {
    /// Depth-first list of this node's id followed by every descendant id.
    pub fn ids(&self) -> Vec<MenuId> {
        let mut out = vec![self.id];
        for child in self.children.iter().flatten() {
            out.extend(child.ids());
        }
        out
    }
}
