use std::collections::BTreeSet;

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
    store::{Book, BookChanges, NewBook},
    AdminUser, AppResult, AuthUser, Db, Page,
};

#[derive(Debug, Deserialize)]
pub struct BookQuery {
    #[serde(default = "default_current")]
    pub current: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    /// Matches title, author or ISBN.
    pub search: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    /// Exact match, unlike the other filters.
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDelete {
    pub book_ids: Vec<i64>,
}

pub async fn list(
    _auth: AuthUser,
    State(db): State<Db>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Page<Book>>> {
    let library = db.read().await;
    let search = query.search.as_deref().filter(|s| !s.is_empty());
    let books: Vec<Book> = library
        .books
        .values()
        .rev()
        .filter(|b| {
            search.is_none()
                || matches(&b.title, search)
                || matches(&b.author, search)
                || matches(&b.isbn, search)
        })
        .filter(|b| matches(&b.title, query.title.as_deref()))
        .filter(|b| matches(&b.author, query.author.as_deref()))
        .filter(|b| matches(&b.publisher, query.publisher.as_deref()))
        .filter(|b| matches(&b.isbn, query.isbn.as_deref()))
        .filter(|b| {
            query
                .category
                .as_deref()
                .filter(|c| !c.is_empty())
                .is_none_or(|c| b.category == c)
        })
        .cloned()
        .collect();
    Ok(Json(paginate(books, query.current, query.size)?))
}

pub async fn get_one(
    _auth: AuthUser,
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> AppResult<Json<Book>> {
    Ok(Json(db.read().await.book(id)?.clone()))
}

pub async fn create(
    _admin: AdminUser,
    State(db): State<Db>,
    Json(input): Json<NewBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = db.write().await.create_book(input)?;
    tracing::info!(book_id = book.id, isbn = %book.isbn, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn update(
    _admin: AdminUser,
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(changes): Json<BookChanges>,
) -> AppResult<Json<Book>> {
    Ok(Json(db.write().await.update_book(id, changes)?))
}

pub async fn delete(
    _admin: AdminUser,
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let mut library = db.write().await;
    library.book(id)?;
    library.delete_books(&[id])?;
    tracing::info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn batch_delete(
    _admin: AdminUser,
    State(db): State<Db>,
    Json(input): Json<BatchDelete>,
) -> AppResult<StatusCode> {
    db.write().await.delete_books(&input.book_ids)?;
    tracing::info!(count = input.book_ids.len(), "books deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn categories(_auth: AuthUser, State(db): State<Db>) -> Json<Value> {
    let library = db.read().await;
    let categories: BTreeSet<&str> = library.books.values().map(|b| b.category.as_str()).collect();
    Json(json!({ "categories": categories }))
}

pub async fn authors(_auth: AuthUser, State(db): State<Db>) -> Json<Value> {
    let library = db.read().await;
    let authors: BTreeSet<&str> = library.books.values().map(|b| b.author.as_str()).collect();
    Json(json!({ "authors": authors }))
}
