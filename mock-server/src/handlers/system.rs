use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{default_current, default_size, matches};
use crate::{
    paginate,
    store::{Menu, MenuTree, Role},
    AppResult, AuthUser, Db, Page,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    #[serde(default = "default_current")]
    pub current: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    pub role_name: Option<String>,
    pub role_code: Option<String>,
    pub status: Option<String>,
}

pub async fn role_list(
    _auth: AuthUser,
    State(db): State<Db>,
    Query(query): Query<RoleQuery>,
) -> AppResult<Json<Page<Role>>> {
    let library = db.read().await;
    let roles: Vec<Role> = library
        .roles
        .iter()
        .rev()
        .filter(|r| matches(&r.role_name, query.role_name.as_deref()))
        .filter(|r| matches(&r.role_code, query.role_code.as_deref()))
        .filter(|r| query.status.as_ref().is_none_or(|s| &r.status == s))
        .cloned()
        .collect();
    Ok(Json(paginate(roles, query.current, query.size)?))
}

/// Enabled roles only, in id order.
pub async fn all_roles(_auth: AuthUser, State(db): State<Db>) -> Json<Vec<Value>> {
    let library = db.read().await;
    let roles = library
        .roles
        .iter()
        .filter(|r| r.status == "1")
        .map(|r| json!({ "id": r.id, "roleName": r.role_name, "roleCode": r.role_code }))
        .collect();
    Json(roles)
}

pub async fn menu_list(_auth: AuthUser, State(db): State<Db>) -> Json<Page<Menu>> {
    let records = db.read().await.menu_forest();
    Json(Page {
        total: records.len() as u64,
        current: 1,
        size: 10,
        records,
    })
}

/// Route names of every page-type menu.
pub async fn all_pages(_auth: AuthUser, State(db): State<Db>) -> Json<Vec<String>> {
    let library = db.read().await;
    let pages = library
        .menus
        .iter()
        .filter(|m| m.menu_type == "2")
        .map(|m| m.route_name.clone())
        .collect();
    Json(pages)
}

pub async fn menu_tree(_auth: AuthUser, State(db): State<Db>) -> Json<Vec<MenuTree>> {
    Json(db.read().await.menu_tree())
}
