//! In-memory stand-in for the library-management backend.
//!
//! Serves the same routes, payload shapes and validation rules as the real
//! service, keeping all state in a single `RwLock`ed [`Library`]. Used by the
//! integration tests of `library-core` and `library-service`, and runnable
//! on its own through `main.rs`.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub mod error;
mod handlers;
pub mod store;

pub use error::{AppError, AppResult};
pub use store::Library;

pub type Db = Arc<RwLock<Library>>;

/// Largest page size any list endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// One page of a list endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: u64,
    pub current: u32,
    pub size: u32,
}

/// Slice `items` into page `current` of `size` records.
pub fn paginate<T>(items: Vec<T>, current: u32, size: u32) -> AppResult<Page<T>> {
    if current < 1 {
        return Err(AppError::Unprocessable("page must be at least 1".to_string()));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(AppError::Unprocessable(format!(
            "page size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    let total = items.len() as u64;
    let skip = (current as usize - 1).saturating_mul(size as usize);
    let records = items.into_iter().skip(skip).take(size as usize).collect();
    Ok(Page {
        records,
        total,
        current,
        size,
    })
}

/// The caller behind a valid bearer token.
pub struct AuthUser {
    pub user: store::User,
    pub token: String,
}

impl FromRequestParts<Db> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?
            .to_string();
        let user = db.read().await.authenticate(&token)?;
        Ok(AuthUser { user, token })
    }
}

/// Like [`AuthUser`], but only for administrators.
pub struct AdminUser(pub store::User);

impl FromRequestParts<Db> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let AuthUser { user, .. } = AuthUser::from_request_parts(parts, db).await?;
        if !user.is_admin {
            return Err(AppError::Forbidden("administrator privileges required".to_string()));
        }
        Ok(AdminUser(user))
    }
}

/// Router over a freshly seeded library.
pub fn app() -> Router {
    router(Arc::new(RwLock::new(Library::seeded())))
}

pub fn router(db: Db) -> Router {
    use handlers::{auth, books, borrows, system, users};

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/getUserInfo", get(auth::user_info))
        .route("/auth/refreshToken", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/register", post(auth::register))
        .route("/auth/error", get(auth::custom_error))
        .route("/statistics", get(auth::statistics))
        .route(
            "/users",
            get(users::list).post(users::create).put(users::update_me),
        )
        .route("/users/stats/summary", get(users::summary))
        .route("/users/change-password", patch(users::change_password))
        .route("/users/batch-delete", post(users::batch_delete))
        .route(
            "/users/{id}",
            get(users::get_one).put(users::update).delete(users::delete),
        )
        .route("/users/{id}/reset-password", patch(users::reset_password))
        .route("/users/{id}/toggle-status", post(users::toggle_status))
        .route("/systemManage/getRoleList", get(system::role_list))
        .route("/systemManage/getAllRoles", get(system::all_roles))
        .route("/systemManage/getMenuList/v2", get(system::menu_list))
        .route("/systemManage/getAllPages", get(system::all_pages))
        .route("/systemManage/getMenuTree", get(system::menu_tree))
        .route("/books", get(books::list).post(books::create))
        .route("/books/batch-delete", post(books::batch_delete))
        .route("/books/categories/list", get(books::categories))
        .route("/books/authors/list", get(books::authors))
        .route(
            "/books/{id}",
            get(books::get_one).put(books::update).delete(books::delete),
        )
        .route("/borrows", get(borrows::list))
        .route("/borrows/borrow", post(borrows::borrow))
        .route("/borrows/stats/summary", get(borrows::stats))
        .route("/borrows/overdue/list", get(borrows::overdue))
        .route("/borrows/user/{user_id}", get(borrows::for_user))
        .route("/borrows/{id}", get(borrows::get_one))
        .route("/borrows/{id}/return", post(borrows::return_book))
        .route("/borrows/{id}/renew", post(borrows::renew))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock library backend listening");
    }
    axum::serve(listener, app()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_slices_requested_page() {
        let page = paginate((1..=25).collect::<Vec<_>>(), 3, 10).unwrap();
        assert_eq!(page.records, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);
    }

    #[test]
    fn paginate_past_end_is_empty() {
        let page = paginate(vec![1, 2], 5, 10).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total, 2);
    }

    #[test]
    fn paginate_rejects_bad_sizes() {
        assert!(matches!(
            paginate(vec![1], 1, 0),
            Err(AppError::Unprocessable(_))
        ));
        assert!(paginate(vec![1], 1, 101).is_err());
        assert!(paginate(vec![1], 0, 10).is_err());
        assert!(paginate(vec![1], 1, 100).is_ok());
    }
}
