//! Catalogue records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type BookId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: String,
    pub publish_date: String,
    pub category: String,
    pub price: f64,
    /// Copies on the shelf. Never negative; the server enforces it.
    pub stock_quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Create and full-replace payload: a book without its server-owned fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: String,
    pub publish_date: String,
    pub category: String,
    pub price: f64,
    pub stock_quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<Book> for BookInput {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            publisher: book.publisher,
            publish_date: book.publish_date,
            category: book.category,
            price: book.price,
            stock_quantity: book.stock_quantity,
            description: book.description,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookSearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Free-text match on title, author or ISBN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteBooks {
    pub book_ids: Vec<BookId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorList {
    pub authors: Vec<String>,
}
