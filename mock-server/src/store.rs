//! In-memory records and the seeded library.
//!
//! These shapes are the server's own. They are deliberately not shared with
//! `library-core`, so a schema drift between the two shows up in tests.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Maximum open loans per user.
pub const MAX_OPEN_BORROWS: usize = 5;
/// Maximum renewals per loan.
pub const MAX_RENEWALS: u32 = 2;
pub const DEFAULT_LOAN_DAYS: i64 = 30;
pub const FINE_PER_DAY: f64 = 1.0;
/// Access token lifetime reported to clients, in seconds.
pub const TOKEN_TTL_SECS: u64 = 3600;

pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct Account {
    pub user: User,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: String,
    pub publish_date: String,
    pub category: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
    Overdue,
    Renewed,
}

impl BorrowStatus {
    pub fn is_open(self) -> bool {
        self != BorrowStatus::Returned
    }
}

#[derive(Clone, Debug)]
pub struct Borrow {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub borrow_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub return_date: Option<NaiveDateTime>,
    pub status: BorrowStatus,
    pub renewal_count: u32,
    pub fine_amount: f64,
    pub notes: Option<String>,
}

impl Borrow {
    pub fn is_overdue(&self, at: NaiveDateTime) -> bool {
        self.status.is_open() && self.due_date < at
    }

    /// Calendar days past due, for open loans only.
    pub fn days_overdue(&self, at: NaiveDateTime) -> Option<i64> {
        self.is_overdue(at)
            .then(|| (at.date() - self.due_date.date()).num_days())
    }

    fn append_note(&mut self, label: &str, note: Option<&str>) {
        if let Some(note) = note {
            let mut notes = self.notes.take().unwrap_or_default();
            notes.push_str(&format!(" [{label}: {note}]"));
            self.notes = Some(notes);
        }
    }
}

/// A loan joined with its user and book.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BorrowDetails {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub book_id: i64,
    pub book_title: String,
    pub book_author: String,
    pub book_isbn: String,
    pub borrow_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub return_date: Option<NaiveDateTime>,
    pub status: BorrowStatus,
    pub renewal_count: u32,
    pub fine_amount: f64,
    pub notes: Option<String>,
    pub days_overdue: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverdueBorrow {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub book_id: i64,
    pub book_title: String,
    pub book_author: String,
    pub borrow_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub renewal_count: u32,
    pub days_overdue: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub role_name: String,
    pub role_code: String,
    pub role_desc: String,
    pub status: String,
    pub create_by: String,
    pub create_time: String,
    pub update_by: String,
    pub update_time: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: i64,
    pub parent_id: i64,
    pub menu_type: String,
    pub menu_name: String,
    pub route_name: String,
    pub route_path: String,
    pub component: Option<String>,
    pub icon: String,
    pub icon_type: String,
    pub i18n_key: String,
    pub order: i32,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Menu>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MenuTree {
    pub id: i64,
    pub label: String,
    #[serde(rename = "pId")]
    pub p_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MenuTree>>,
}

/// Partial user update. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: String,
    pub publish_date: String,
    pub category: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub description: Option<String>,
}

/// Partial book update. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publish_date: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock_quantity: Option<i64>,
    pub description: Option<String>,
}

/// Whole server state behind one lock.
#[derive(Debug, Default)]
pub struct Library {
    pub accounts: BTreeMap<i64, Account>,
    pub books: BTreeMap<i64, Book>,
    pub borrows: BTreeMap<i64, Borrow>,
    pub roles: Vec<Role>,
    pub menus: Vec<Menu>,
    access_tokens: HashMap<String, i64>,
    refresh_tokens: HashMap<String, i64>,
    next_user_id: i64,
    next_book_id: i64,
    next_borrow_id: i64,
}

impl Library {
    /// One admin account (`admin` / `admin123`), roles and the admin menu.
    pub fn seeded() -> Self {
        let mut library = Library {
            next_user_id: 1,
            next_book_id: 1,
            next_borrow_id: 1,
            ..Default::default()
        };
        let admin = NewUser {
            username: "admin".to_string(),
            email: "admin@library.local".to_string(),
            password: "admin123".to_string(),
            full_name: Some("Administrator".to_string()),
            phone: None,
            is_admin: true,
        };
        // The seed account satisfies every validation rule.
        if let Err(e) = library.create_user(admin) {
            tracing::error!(error = %e, "failed to seed admin account");
        }
        library.roles = seed_roles();
        library.menus = seed_menus();
        library
    }

    // --- sessions ---

    pub fn login(&mut self, username: &str, password: &str) -> Result<(String, String), AppError> {
        let account = self
            .accounts
            .values()
            .find(|a| a.user.username == username)
            .filter(|a| a.password == password)
            .ok_or_else(|| AppError::Unauthorized("incorrect username or password".to_string()))?;
        if !account.user.is_active {
            return Err(AppError::Unauthorized("account is disabled".to_string()));
        }
        let user_id = account.user.id;
        Ok(self.issue_tokens(user_id))
    }

    pub fn refresh(&mut self, refresh_token: &str) -> Result<(String, String), AppError> {
        let user_id = self
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| AppError::Unauthorized("invalid refresh token".to_string()))?;
        let active = self
            .accounts
            .get(&user_id)
            .is_some_and(|a| a.user.is_active);
        if !active {
            return Err(AppError::Unauthorized(
                "user does not exist or is disabled".to_string(),
            ));
        }
        Ok(self.issue_tokens(user_id))
    }

    pub fn logout(&mut self, access_token: &str) {
        self.access_tokens.remove(access_token);
    }

    fn issue_tokens(&mut self, user_id: i64) -> (String, String) {
        let access = uuid::Uuid::new_v4().to_string();
        let refresh = uuid::Uuid::new_v4().to_string();
        self.access_tokens.insert(access.clone(), user_id);
        self.refresh_tokens.insert(refresh.clone(), user_id);
        (access, refresh)
    }

    /// Resolve a bearer token to an active user.
    pub fn authenticate(&self, access_token: &str) -> Result<User, AppError> {
        let user_id = self
            .access_tokens
            .get(access_token)
            .ok_or_else(|| AppError::Unauthorized("invalid access token".to_string()))?;
        match self.accounts.get(user_id) {
            Some(account) if account.user.is_active => Ok(account.user.clone()),
            _ => Err(AppError::Unauthorized(
                "user does not exist or is disabled".to_string(),
            )),
        }
    }

    // --- users ---

    pub fn user(&self, id: i64) -> Result<&User, AppError> {
        self.accounts
            .get(&id)
            .map(|a| &a.user)
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))
    }

    pub fn create_user(&mut self, input: NewUser) -> Result<User, AppError> {
        validate_password(&input.password)?;
        validate_phone(input.phone.as_deref())?;
        validate_email(&input.email)?;
        if self.accounts.values().any(|a| a.user.username == input.username) {
            return Err(AppError::BadRequest("username already exists".to_string()));
        }
        if self.accounts.values().any(|a| a.user.email == input.email) {
            return Err(AppError::BadRequest("email already exists".to_string()));
        }
        let at = now();
        let user = User {
            id: self.next_user_id,
            username: input.username,
            email: input.email,
            full_name: input.full_name,
            phone: input.phone,
            is_active: true,
            is_admin: input.is_admin,
            created_at: at,
            updated_at: at,
        };
        self.next_user_id += 1;
        self.accounts.insert(
            user.id,
            Account {
                user: user.clone(),
                password: input.password,
            },
        );
        Ok(user)
    }

    pub fn update_user(&mut self, id: i64, changes: UserChanges) -> Result<User, AppError> {
        self.user(id)?;
        validate_phone(changes.phone.as_deref())?;
        if let Some(email) = &changes.email {
            validate_email(email)?;
        }
        let others = || self.accounts.values().map(|a| &a.user).filter(|u| u.id != id);
        if let Some(username) = &changes.username {
            if others().any(|u| &u.username == username) {
                return Err(AppError::BadRequest("username already exists".to_string()));
            }
        }
        if let Some(email) = &changes.email {
            if others().any(|u| &u.email == email) {
                return Err(AppError::BadRequest("email already exists".to_string()));
            }
        }
        let UserChanges {
            username,
            email,
            full_name,
            phone,
            is_active,
            is_admin,
        } = changes;
        let nothing = username.is_none()
            && email.is_none()
            && full_name.is_none()
            && phone.is_none()
            && is_active.is_none()
            && is_admin.is_none();
        if nothing {
            return Err(AppError::BadRequest("no fields to update".to_string()));
        }

        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
        let user = &mut account.user;
        if let Some(v) = username {
            user.username = v;
        }
        if let Some(v) = email {
            user.email = v;
        }
        if let Some(v) = full_name {
            user.full_name = Some(v);
        }
        if let Some(v) = phone {
            user.phone = Some(v);
        }
        if let Some(v) = is_active {
            user.is_active = v;
        }
        if let Some(v) = is_admin {
            user.is_admin = v;
        }
        user.updated_at = now();
        Ok(user.clone())
    }

    pub fn set_password(&mut self, id: i64, password: String) -> Result<(), AppError> {
        validate_password(&password)?;
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
        account.password = password;
        account.user.updated_at = now();
        Ok(())
    }

    pub fn check_password(&self, id: i64, password: &str) -> bool {
        self.accounts
            .get(&id)
            .is_some_and(|a| a.password == password)
    }

    pub fn delete_users(&mut self, ids: &[i64]) -> Result<(), AppError> {
        if ids.is_empty() {
            return Err(AppError::BadRequest("no user ids given".to_string()));
        }
        if ids.iter().any(|id| !self.accounts.contains_key(id)) {
            return Err(AppError::NotFound("some users do not exist".to_string()));
        }
        for id in ids {
            self.accounts.remove(id);
            self.access_tokens.retain(|_, user| *user != *id);
            self.refresh_tokens.retain(|_, user| *user != *id);
        }
        Ok(())
    }

    // --- books ---

    pub fn book(&self, id: i64) -> Result<&Book, AppError> {
        self.books
            .get(&id)
            .ok_or_else(|| AppError::NotFound("book not found".to_string()))
    }

    pub fn create_book(&mut self, input: NewBook) -> Result<Book, AppError> {
        if self.books.values().any(|b| b.isbn == input.isbn) {
            return Err(AppError::BadRequest("isbn already exists".to_string()));
        }
        let at = now();
        let book = Book {
            id: self.next_book_id,
            title: input.title,
            author: input.author,
            isbn: input.isbn,
            publisher: input.publisher,
            publish_date: input.publish_date,
            category: input.category,
            price: input.price,
            stock_quantity: input.stock_quantity,
            description: input.description,
            created_at: at,
            updated_at: at,
        };
        self.next_book_id += 1;
        self.books.insert(book.id, book.clone());
        Ok(book)
    }

    pub fn update_book(&mut self, id: i64, changes: BookChanges) -> Result<Book, AppError> {
        self.book(id)?;
        if let Some(isbn) = &changes.isbn {
            if self.books.values().any(|b| b.id != id && &b.isbn == isbn) {
                return Err(AppError::BadRequest("isbn already exists".to_string()));
            }
        }
        let book = self
            .books
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("book not found".to_string()))?;
        let mut touched = false;
        macro_rules! apply {
            ($($field:ident),*) => {
                $(if let Some(v) = changes.$field {
                    book.$field = v;
                    touched = true;
                })*
            };
        }
        apply!(title, author, isbn, publisher, publish_date, category, price, stock_quantity);
        if let Some(v) = changes.description {
            book.description = Some(v);
            touched = true;
        }
        if !touched {
            return Err(AppError::BadRequest("no fields to update".to_string()));
        }
        book.updated_at = now();
        Ok(book.clone())
    }

    pub fn delete_books(&mut self, ids: &[i64]) -> Result<(), AppError> {
        if ids.is_empty() {
            return Err(AppError::BadRequest("no book ids given".to_string()));
        }
        if ids.iter().any(|id| !self.books.contains_key(id)) {
            return Err(AppError::NotFound("some books do not exist".to_string()));
        }
        for id in ids {
            self.books.remove(id);
        }
        Ok(())
    }

    // --- borrows ---

    pub fn borrow(&self, id: i64) -> Result<&Borrow, AppError> {
        self.borrows
            .get(&id)
            .ok_or_else(|| AppError::NotFound("borrow record not found".to_string()))
    }

    pub fn details(&self, borrow: &Borrow, at: NaiveDateTime) -> Option<BorrowDetails> {
        let user = &self.accounts.get(&borrow.user_id)?.user;
        let book = self.books.get(&borrow.book_id)?;
        Some(BorrowDetails {
            id: borrow.id,
            user_id: user.id,
            user_name: user.username.clone(),
            user_email: user.email.clone(),
            book_id: book.id,
            book_title: book.title.clone(),
            book_author: book.author.clone(),
            book_isbn: book.isbn.clone(),
            borrow_date: borrow.borrow_date,
            due_date: borrow.due_date,
            return_date: borrow.return_date,
            status: borrow.status,
            renewal_count: borrow.renewal_count,
            fine_amount: borrow.fine_amount,
            notes: borrow.notes.clone(),
            days_overdue: borrow.days_overdue(at),
        })
    }

    pub fn open_borrows(&self, user_id: i64) -> impl Iterator<Item = &Borrow> {
        self.borrows
            .values()
            .filter(move |b| b.user_id == user_id && b.status.is_open())
    }

    pub fn lend(
        &mut self,
        user_id: i64,
        book_id: i64,
        days: i64,
        notes: Option<String>,
    ) -> Result<Borrow, AppError> {
        if !self.user(user_id)?.is_active {
            return Err(AppError::BadRequest("user account is disabled".to_string()));
        }
        if self.book(book_id)?.stock_quantity <= 0 {
            return Err(AppError::BadRequest("book out of stock".to_string()));
        }
        if self.open_borrows(user_id).any(|b| b.book_id == book_id) {
            return Err(AppError::BadRequest(
                "user already has this book, return it first".to_string(),
            ));
        }
        if self.open_borrows(user_id).count() >= MAX_OPEN_BORROWS {
            return Err(AppError::BadRequest(format!(
                "borrow limit reached ({MAX_OPEN_BORROWS} books)"
            )));
        }

        let borrow_date = now();
        let due_date = shift_days(borrow_date, days)?;
        let borrow = Borrow {
            id: self.next_borrow_id,
            user_id,
            book_id,
            borrow_date,
            due_date,
            return_date: None,
            status: BorrowStatus::Borrowed,
            renewal_count: 0,
            fine_amount: 0.0,
            notes,
        };
        self.next_borrow_id += 1;
        self.borrows.insert(borrow.id, borrow.clone());
        if let Some(book) = self.books.get_mut(&book_id) {
            book.stock_quantity -= 1;
        }
        Ok(borrow)
    }

    pub fn take_back(&mut self, id: i64, notes: Option<&str>) -> Result<Borrow, AppError> {
        let borrow = self
            .borrows
            .get_mut(&id)
            .filter(|b| b.status.is_open())
            .ok_or_else(|| {
                AppError::NotFound("borrow record not found or already returned".to_string())
            })?;
        let return_date = now();
        let late_days = (return_date - borrow.due_date).num_days().max(0);
        borrow.fine_amount = if return_date > borrow.due_date {
            late_days as f64 * FINE_PER_DAY
        } else {
            0.0
        };
        borrow.return_date = Some(return_date);
        borrow.status = BorrowStatus::Returned;
        borrow.append_note("return note", notes);
        let borrow = borrow.clone();
        if let Some(book) = self.books.get_mut(&borrow.book_id) {
            book.stock_quantity += 1;
        }
        Ok(borrow)
    }

    pub fn renew(&mut self, id: i64, days: i64, notes: Option<&str>) -> Result<Borrow, AppError> {
        let at = now();
        let borrow = self
            .borrows
            .get_mut(&id)
            .filter(|b| b.status.is_open())
            .ok_or_else(|| {
                AppError::NotFound("borrow record not found or already returned".to_string())
            })?;
        if borrow.renewal_count >= MAX_RENEWALS {
            return Err(AppError::BadRequest(format!(
                "renewal limit reached ({MAX_RENEWALS})"
            )));
        }
        if borrow.is_overdue(at) {
            return Err(AppError::BadRequest(
                "book is overdue and cannot be renewed, return it first".to_string(),
            ));
        }
        borrow.due_date = shift_days(borrow.due_date, days)?;
        borrow.renewal_count += 1;
        borrow.status = BorrowStatus::Renewed;
        borrow.append_note("renewal note", notes);
        Ok(borrow.clone())
    }

    // --- menus ---

    /// Top-level menus with their descendants nested under `children`.
    pub fn menu_forest(&self) -> Vec<Menu> {
        self.menu_children(0)
    }

    fn menu_children(&self, parent: i64) -> Vec<Menu> {
        let mut children: Vec<Menu> = self
            .menus
            .iter()
            .filter(|m| m.parent_id == parent && m.id != parent)
            .map(|m| {
                let nested = self.menu_children(m.id);
                Menu {
                    children: (!nested.is_empty()).then_some(nested),
                    ..m.clone()
                }
            })
            .collect();
        children.sort_by_key(|m| m.order);
        children
    }

    pub fn menu_tree(&self) -> Vec<MenuTree> {
        fn convert(menu: &Menu) -> MenuTree {
            MenuTree {
                id: menu.id,
                label: menu.menu_name.clone(),
                p_id: menu.parent_id,
                children: menu
                    .children
                    .as_ref()
                    .map(|c| c.iter().map(convert).collect()),
            }
        }
        self.menu_forest().iter().map(convert).collect()
    }
}

fn validate_password(password: &str) -> Result<(), AppError> {
    let strong = password.chars().count() >= 6
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit());
    if strong {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "password must be at least 6 characters and contain letters and digits".to_string(),
        ))
    }
}

/// Mainland mobile numbers: `1`, then `3`-`9`, then nine digits.
fn validate_phone(phone: Option<&str>) -> Result<(), AppError> {
    let Some(phone) = phone.filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    let bytes = phone.as_bytes();
    let valid = bytes.len() == 11
        && bytes.iter().all(u8::is_ascii_digit)
        && bytes[0] == b'1'
        && (b'3'..=b'9').contains(&bytes[1]);
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest("invalid phone number".to_string()))
    }
}

/// `date` moved by `days`, or 422 when the result leaves chrono's range.
fn shift_days(date: NaiveDateTime, days: i64) -> Result<NaiveDateTime, AppError> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| AppError::Unprocessable(format!("{days} days is out of range")))
}

fn validate_email(email: &str) -> Result<(), AppError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::Unprocessable("invalid email address".to_string())),
    }
}

fn seed_roles() -> Vec<Role> {
    let role = |id: i64, name: &str, code: &str, desc: &str, status: &str| Role {
        id,
        role_name: name.to_string(),
        role_code: code.to_string(),
        role_desc: desc.to_string(),
        status: status.to_string(),
        create_by: "system".to_string(),
        create_time: "2024-01-01 00:00:00".to_string(),
        update_by: "system".to_string(),
        update_time: "2024-01-01 00:00:00".to_string(),
    };
    vec![
        role(1, "Administrator", "R_ADMIN", "manages users, books and loans", "1"),
        role(2, "Reader", "R_USER", "borrows and returns books", "1"),
        role(3, "Guest", "R_GUEST", "read-only catalogue access", "2"),
    ]
}

fn seed_menus() -> Vec<Menu> {
    let menu = |id: i64, parent_id: i64, menu_type: &str, name: &str, path: &str, order: i32| {
        let leaf = menu_type == "2";
        Menu {
            id,
            parent_id,
            menu_type: menu_type.to_string(),
            menu_name: name.to_string(),
            route_name: name.to_string(),
            route_path: path.to_string(),
            component: leaf.then(|| format!("view.{name}")),
            icon: "mdi:menu".to_string(),
            icon_type: "1".to_string(),
            i18n_key: format!("route.{name}"),
            order,
            status: "1".to_string(),
            children: None,
        }
    };
    vec![
        menu(1, 0, "2", "home", "/home", 1),
        menu(2, 0, "1", "manage", "/manage", 2),
        menu(3, 2, "2", "manage_user", "/manage/user", 1),
        menu(4, 2, "2", "manage_book", "/manage/book", 2),
        menu(5, 2, "2", "manage_borrow", "/manage/borrow", 3),
    ]
}
