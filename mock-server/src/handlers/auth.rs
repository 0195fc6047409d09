use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    store::{NewUser, User, TOKEN_TTL_SECS},
    AppResult, AuthUser, Db,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: &'static str,
}

impl TokenResponse {
    fn new((access_token, refresh_token): (String, String)) -> Self {
        TokenResponse {
            access_token,
            refresh_token,
            expires_in: TOKEN_TTL_SECS,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorQuery {
    pub code: String,
    pub msg: String,
}

pub async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginBody>,
) -> AppResult<Json<TokenResponse>> {
    let tokens = db.write().await.login(&input.user_name, &input.password)?;
    tracing::info!(user = %input.user_name, "login");
    Ok(Json(TokenResponse::new(tokens)))
}

pub async fn user_info(AuthUser { user, .. }: AuthUser) -> Json<Value> {
    let role = if user.is_admin { "admin" } else { "user" };
    Json(json!({
        "userId": user.id,
        "userName": user.username,
        "roles": [role],
        "email": user.email,
        "full_name": user.full_name,
        "phone": user.phone,
        "is_active": user.is_active,
    }))
}

pub async fn refresh_token(
    State(db): State<Db>,
    Json(input): Json<RefreshBody>,
) -> AppResult<Json<TokenResponse>> {
    let tokens = db.write().await.refresh(&input.refresh_token)?;
    Ok(Json(TokenResponse::new(tokens)))
}

/// Always succeeds; a presented token is revoked.
pub async fn logout(State(db): State<Db>, headers: HeaderMap) -> Json<Value> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if let Some(token) = token {
        db.write().await.logout(token);
    }
    Json(json!({ "message": "logged out" }))
}

pub async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterBody>,
) -> AppResult<Json<User>> {
    let user = db.write().await.create_user(NewUser {
        username: input.username,
        email: input.email,
        password: input.password,
        full_name: Some(input.full_name),
        phone: input.phone,
        is_admin: false,
    })?;
    tracing::info!(user_id = user.id, "registered");
    Ok(Json(user))
}

/// Echoes a caller-chosen error, for exercising client error paths.
pub async fn custom_error(Query(query): Query<ErrorQuery>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "code": query.code, "message": query.msg })),
    )
}

pub async fn statistics(_auth: AuthUser, State(db): State<Db>) -> Json<Value> {
    let library = db.read().await;
    let at = crate::store::now();
    let open = library.borrows.values().filter(|b| b.status.is_open());
    Json(json!({
        "total_users": library.accounts.len(),
        "total_books": library.books.len(),
        "total_borrows": library.borrows.len(),
        "active_borrows": open.clone().count(),
        "overdue_borrows": open.filter(|b| b.is_overdue(at)).count(),
    }))
}
