//! Loans and the borrow/return/renew payloads.
//!
//! Status transitions happen on the server in response to the borrow,
//! return and renew calls; nothing here mutates a loan.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::book::BookId;
use super::user::UserId;

pub type BorrowId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
    Overdue,
    Renewed,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Borrowed => "borrowed",
            BorrowStatus::Returned => "returned",
            BorrowStatus::Overdue => "overdue",
            BorrowStatus::Renewed => "renewed",
        }
    }

    /// True while the book is still out.
    pub fn is_open(&self) -> bool {
        !matches!(self, BorrowStatus::Returned)
    }
}

/// A loan row as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrow {
    pub id: BorrowId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub borrow_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDateTime>,
    pub status: BorrowStatus,
    #[serde(default)]
    pub renewal_count: u32,
    #[serde(default)]
    pub fine_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

/// A loan joined with display fields of its user and book. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowWithDetails {
    pub id: BorrowId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub book_id: BookId,
    pub book_title: String,
    pub book_author: String,
    pub book_isbn: String,
    pub borrow_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDateTime>,
    pub status: BorrowStatus,
    #[serde(default)]
    pub renewal_count: u32,
    #[serde(default)]
    pub fine_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Whole days past due; only set for open loans that are late.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<i64>,
}

impl From<BorrowWithDetails> for Borrow {
    fn from(details: BorrowWithDetails) -> Self {
        Self {
            id: details.id,
            user_id: details.user_id,
            book_id: details.book_id,
            borrow_date: details.borrow_date,
            due_date: details.due_date,
            return_date: details.return_date,
            status: details.status,
            renewal_count: details.renewal_count,
            fine_amount: details.fine_amount,
            notes: details.notes,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Filters for the borrow list.
///
/// `current`/`size` follow the paging vocabulary of the other lists; the
/// client forwards them as `page`/`page_size`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BorrowSearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BorrowStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overdue_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<BookId>,
    /// Free-text match on username, book title or author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Borrow request. `user_id` falls back to the caller, `borrow_days` to the
/// server default (30).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BorrowCreateParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub book_id: BookId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrow_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BorrowReturnParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BorrowRenewalParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowReceipt {
    pub message: String,
    pub borrow_id: BorrowId,
    pub due_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnReceipt {
    pub message: String,
    pub return_date: NaiveDateTime,
    pub fine_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalReceipt {
    pub message: String,
    pub new_due_date: NaiveDateTime,
    pub renewal_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBorrows {
    pub borrows: Vec<BorrowWithDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowStats {
    pub current_borrows: u64,
    pub overdue_borrows: u64,
    pub today_borrows: u64,
    pub today_returns: u64,
    pub total_fines: f64,
}

/// An open loan past its due date, with contact details for follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueBorrow {
    pub id: BorrowId,
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub book_id: BookId,
    pub book_title: String,
    pub book_author: String,
    pub borrow_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub renewal_count: u32,
    pub days_overdue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueBorrows {
    pub overdue_borrows: Vec<OverdueBorrow>,
}
