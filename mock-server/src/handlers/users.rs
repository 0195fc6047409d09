use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{default_current, default_size, matches};
use crate::{
    paginate,
    store::{now, NewUser, User, UserChanges},
    AdminUser, AppError, AppResult, AuthUser, Db, Page,
};

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(default = "default_current")]
    pub current: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordReset {
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchDelete {
    pub user_ids: Vec<i64>,
}

pub async fn list(
    _auth: AuthUser,
    State(db): State<Db>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Page<User>>> {
    let library = db.read().await;
    let users: Vec<User> = library
        .accounts
        .values()
        .rev()
        .map(|a| &a.user)
        .filter(|u| matches(&u.username, query.username.as_deref()))
        .filter(|u| matches(u.full_name.as_deref().unwrap_or(""), query.full_name.as_deref()))
        .filter(|u| matches(u.phone.as_deref().unwrap_or(""), query.phone.as_deref()))
        .filter(|u| matches(&u.email, query.email.as_deref()))
        .filter(|u| query.is_active.is_none_or(|v| u.is_active == v))
        .filter(|u| query.is_admin.is_none_or(|v| u.is_admin == v))
        .cloned()
        .collect();
    Ok(Json(paginate(users, query.current, query.size)?))
}

pub async fn get_one(
    _auth: AuthUser,
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    Ok(Json(db.read().await.user(id)?.clone()))
}

pub async fn create(
    _admin: AdminUser,
    State(db): State<Db>,
    Json(input): Json<NewUser>,
) -> AppResult<Json<User>> {
    let user = db.write().await.create_user(input)?;
    tracing::info!(user_id = user.id, "user created");
    Ok(Json(user))
}

/// Self-service profile update. Role and activation flags stay untouched.
pub async fn update_me(
    AuthUser { user, .. }: AuthUser,
    State(db): State<Db>,
    Json(changes): Json<UserChanges>,
) -> AppResult<Json<User>> {
    let changes = UserChanges {
        is_active: None,
        is_admin: None,
        ..changes
    };
    Ok(Json(db.write().await.update_user(user.id, changes)?))
}

pub async fn update(
    _admin: AdminUser,
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(changes): Json<UserChanges>,
) -> AppResult<Json<User>> {
    Ok(Json(db.write().await.update_user(id, changes)?))
}

pub async fn delete(
    _admin: AdminUser,
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let mut library = db.write().await;
    library.user(id)?;
    library.delete_users(&[id])?;
    tracing::info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn batch_delete(
    _admin: AdminUser,
    State(db): State<Db>,
    Json(input): Json<BatchDelete>,
) -> AppResult<StatusCode> {
    db.write().await.delete_users(&input.user_ids)?;
    tracing::info!(count = input.user_ids.len(), "users deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    AuthUser { user, .. }: AuthUser,
    State(db): State<Db>,
    Json(input): Json<PasswordChange>,
) -> AppResult<Json<Value>> {
    let mut library = db.write().await;
    if !library.check_password(user.id, &input.old_password) {
        return Err(AppError::BadRequest("old password is incorrect".to_string()));
    }
    library.set_password(user.id, input.new_password)?;
    Ok(Json(json!({ "message": "password changed" })))
}

pub async fn reset_password(
    _admin: AdminUser,
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<PasswordReset>,
) -> AppResult<Json<Value>> {
    db.write().await.set_password(id, input.new_password)?;
    tracing::info!(user_id = id, "password reset");
    Ok(Json(json!({ "message": "password reset" })))
}

pub async fn toggle_status(
    _admin: AdminUser,
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let mut library = db.write().await;
    let is_active = !library.user(id)?.is_active;
    let changes = UserChanges {
        is_active: Some(is_active),
        ..Default::default()
    };
    library.update_user(id, changes)?;
    let message = if is_active { "user enabled" } else { "user disabled" };
    Ok(Json(json!({ "message": message, "is_active": is_active })))
}

/// Loan counters for the calling user.
pub async fn summary(AuthUser { user, .. }: AuthUser, State(db): State<Db>) -> Json<Value> {
    let library = db.read().await;
    let at = now();
    let mine = library.borrows.values().filter(|b| b.user_id == user.id);
    Json(json!({
        "total_borrows": mine.clone().count(),
        "active_borrows": mine.clone().filter(|b| b.status.is_open()).count(),
        "overdue_borrows": mine.filter(|b| b.is_overdue(at)).count(),
    }))
}
