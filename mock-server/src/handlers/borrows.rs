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
    store::{now, BorrowDetails, BorrowStatus, OverdueBorrow, User, DEFAULT_LOAN_DAYS},
    AppError, AppResult, AuthUser, Db, Page,
};

#[derive(Debug, Deserialize)]
pub struct BorrowQuery {
    #[serde(default = "default_current")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub page_size: u32,
    pub user_id: Option<i64>,
    pub book_id: Option<i64>,
    pub status: Option<BorrowStatus>,
    /// Matches username, book title or author.
    pub search: Option<String>,
    pub username: Option<String>,
    pub book_title: Option<String>,
    #[serde(default)]
    pub overdue_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<BorrowStatus>,
}

#[derive(Debug, Deserialize)]
pub struct BorrowBody {
    pub user_id: Option<i64>,
    pub book_id: i64,
    pub borrow_days: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnBody {
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenewBody {
    pub renewal_days: Option<i64>,
    pub notes: Option<String>,
}

/// Non-admins may only act on their own loans.
fn ensure_owner(caller: &User, owner: i64) -> AppResult<()> {
    if caller.is_admin || caller.id == owner {
        Ok(())
    } else {
        Err(AppError::Forbidden("not your borrow record".to_string()))
    }
}

pub async fn list(
    AuthUser { user, .. }: AuthUser,
    State(db): State<Db>,
    Query(query): Query<BorrowQuery>,
) -> AppResult<Json<Page<BorrowDetails>>> {
    let library = db.read().await;
    let at = now();
    let owner = if user.is_admin { query.user_id } else { Some(user.id) };
    let search = query.search.as_deref().filter(|s| !s.is_empty());
    let records: Vec<BorrowDetails> = library
        .borrows
        .values()
        .rev()
        .filter(|b| owner.is_none_or(|id| b.user_id == id))
        .filter(|b| query.book_id.is_none_or(|id| b.book_id == id))
        .filter(|b| query.status.is_none_or(|s| b.status == s))
        .filter(|b| !query.overdue_only || b.is_overdue(at))
        .filter_map(|b| library.details(b, at))
        .filter(|d| matches(&d.user_name, query.username.as_deref()))
        .filter(|d| matches(&d.book_title, query.book_title.as_deref()))
        .filter(|d| {
            search.is_none()
                || matches(&d.user_name, search)
                || matches(&d.book_title, search)
                || matches(&d.book_author, search)
        })
        .collect();
    Ok(Json(paginate(records, query.page, query.page_size)?))
}

pub async fn get_one(
    AuthUser { user, .. }: AuthUser,
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> AppResult<Json<BorrowDetails>> {
    let library = db.read().await;
    let borrow = library.borrow(id)?;
    ensure_owner(&user, borrow.user_id)?;
    library
        .details(borrow, now())
        .map(Json)
        .ok_or_else(|| AppError::NotFound("borrow record not found".to_string()))
}

pub async fn borrow(
    AuthUser { user, .. }: AuthUser,
    State(db): State<Db>,
    Json(input): Json<BorrowBody>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let user_id = input.user_id.unwrap_or(user.id);
    ensure_owner(&user, user_id)?;
    let days = input.borrow_days.unwrap_or(DEFAULT_LOAN_DAYS);
    let borrow = db
        .write()
        .await
        .lend(user_id, input.book_id, days, input.notes)?;
    tracing::info!(
        borrow_id = borrow.id,
        user_id,
        book_id = borrow.book_id,
        "book borrowed"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "book borrowed",
            "borrow_id": borrow.id,
            "due_date": borrow.due_date,
        })),
    ))
}

pub async fn return_book(
    AuthUser { user, .. }: AuthUser,
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<ReturnBody>,
) -> AppResult<Json<Value>> {
    let mut library = db.write().await;
    ensure_owner(&user, library.borrow(id)?.user_id)?;
    let borrow = library.take_back(id, input.notes.as_deref())?;
    tracing::info!(borrow_id = id, fine = borrow.fine_amount, "book returned");
    Ok(Json(json!({
        "message": "book returned",
        "return_date": borrow.return_date,
        "fine_amount": borrow.fine_amount,
    })))
}

pub async fn renew(
    AuthUser { user, .. }: AuthUser,
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<RenewBody>,
) -> AppResult<Json<Value>> {
    let mut library = db.write().await;
    ensure_owner(&user, library.borrow(id)?.user_id)?;
    let days = input.renewal_days.unwrap_or(DEFAULT_LOAN_DAYS);
    let borrow = library.renew(id, days, input.notes.as_deref())?;
    tracing::info!(borrow_id = id, renewals = borrow.renewal_count, "loan renewed");
    Ok(Json(json!({
        "message": "loan renewed",
        "new_due_date": borrow.due_date,
        "renewal_count": borrow.renewal_count,
    })))
}

pub async fn for_user(
    AuthUser { user, .. }: AuthUser,
    State(db): State<Db>,
    Path(user_id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Value>> {
    ensure_owner(&user, user_id)?;
    let library = db.read().await;
    library.user(user_id)?;
    let at = now();
    let borrows: Vec<BorrowDetails> = library
        .borrows
        .values()
        .rev()
        .filter(|b| b.user_id == user_id)
        .filter(|b| query.status.is_none_or(|s| b.status == s))
        .filter_map(|b| library.details(b, at))
        .collect();
    Ok(Json(json!({ "borrows": borrows })))
}

pub async fn stats(_auth: AuthUser, State(db): State<Db>) -> Json<Value> {
    let library = db.read().await;
    let at = now();
    let today = at.date();
    let all = library.borrows.values();
    Json(json!({
        "current_borrows": all.clone().filter(|b| b.status.is_open()).count(),
        "overdue_borrows": all.clone().filter(|b| b.is_overdue(at)).count(),
        "today_borrows": all.clone().filter(|b| b.borrow_date.date() == today).count(),
        "today_returns": all
            .clone()
            .filter(|b| b.return_date.is_some_and(|d| d.date() == today))
            .count(),
        "total_fines": all.map(|b| b.fine_amount).sum::<f64>(),
    }))
}

/// Open loans past due, earliest due date first.
pub async fn overdue(_auth: AuthUser, State(db): State<Db>) -> Json<Value> {
    let library = db.read().await;
    let at = now();
    let mut overdue: Vec<OverdueBorrow> = library
        .borrows
        .values()
        .filter_map(|b| {
            let days_overdue = b.days_overdue(at)?;
            let user = &library.accounts.get(&b.user_id)?.user;
            let book = library.books.get(&b.book_id)?;
            Some(OverdueBorrow {
                id: b.id,
                user_id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
                phone: user.phone.clone(),
                book_id: book.id,
                book_title: book.title.clone(),
                book_author: book.author.clone(),
                borrow_date: b.borrow_date,
                due_date: b.due_date,
                renewal_count: b.renewal_count,
                days_overdue,
            })
        })
        .collect();
    overdue.sort_by_key(|o| o.due_date);
    Json(json!({ "overdue_borrows": overdue }))
}
