use axum::{
    http::{self, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Shares one seeded library across requests by cloning the router.
struct Harness {
    app: Router,
}

impl Harness {
    fn new() -> Self {
        Harness { app: app() }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(http::header::CONTENT_TYPE, "application/json");
                body.to_string()
            }
            None => String::new(),
        };
        let resp = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes: bytes::Bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, value)
    }

    async fn login(&self, user: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "userName": user, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn admin(&self) -> String {
        self.login("admin", "admin123").await
    }

    async fn register_reader(&self, name: &str) -> (i64, String) {
        let (status, body) = self
            .send(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "username": name,
                    "email": format!("{name}@example.com"),
                    "full_name": "Test Reader",
                    "password": "reader123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        let id = body["id"].as_i64().unwrap();
        (id, self.login(name, "reader123").await)
    }

    async fn create_book(&self, token: &str, isbn: &str, stock: i64) -> i64 {
        let (status, body) = self
            .send(
                "POST",
                "/books",
                Some(token),
                Some(json!({
                    "title": format!("Book {isbn}"),
                    "author": "Ursula K. Le Guin",
                    "isbn": isbn,
                    "publisher": "Ace",
                    "publish_date": "1969-03-01",
                    "category": "Fiction",
                    "price": 12.5,
                    "stock_quantity": stock,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create book failed: {body}");
        body["id"].as_i64().unwrap()
    }

    async fn borrow(&self, token: &str, book_id: i64, days: i64) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/borrows/borrow",
            Some(token),
            Some(json!({ "book_id": book_id, "borrow_days": days })),
        )
        .await
    }
}

// --- auth ---

#[tokio::test]
async fn login_with_wrong_password_returns_401_detail() {
    let h = Harness::new();
    let (status, body) = h
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "userName": "admin", "password": "wrong1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn user_info_requires_token() {
    let h = Harness::new();
    let (status, _) = h.send("GET", "/auth/getUserInfo", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_user_info_has_admin_role() {
    let h = Harness::new();
    let token = h.admin().await;
    let (status, body) = h.send("GET", "/auth/getUserInfo", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], 1);
    assert_eq!(body["userName"], "admin");
    assert_eq!(body["roles"], json!(["admin"]));
}

#[tokio::test]
async fn refresh_issues_new_working_token() {
    let h = Harness::new();
    let (_, tokens) = h
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "userName": "admin", "password": "admin123" })),
        )
        .await;
    let (status, fresh) = h
        .send(
            "POST",
            "/auth/refreshToken",
            None,
            Some(json!({ "refreshToken": tokens["refresh_token"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let access = fresh["access_token"].as_str().unwrap();
    let (status, _) = h.send("GET", "/auth/getUserInfo", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_token() {
    let h = Harness::new();
    let token = h.admin().await;
    let (status, body) = h.send("POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
    let (status, _) = h.send("GET", "/auth/getUserInfo", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn custom_error_echoes_code_and_message() {
    let h = Harness::new();
    let (status, body) = h.send("GET", "/auth/error?code=9999&msg=boom", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "code": "9999", "message": "boom" }));
}

// --- users ---

#[tokio::test]
async fn register_rejects_weak_password_and_duplicates() {
    let h = Harness::new();
    let weak = json!({
        "username": "weak",
        "email": "weak@example.com",
        "full_name": "Weak",
        "password": "abcdef",
    });
    let (status, _) = h.send("POST", "/auth/register", None, Some(weak)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    h.register_reader("dup").await;
    let again = json!({
        "username": "dup",
        "email": "other@example.com",
        "full_name": "Dup",
        "password": "abc123",
    });
    let (status, body) = h.send("POST", "/auth/register", None, Some(again)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "username already exists");
}

#[tokio::test]
async fn register_never_grants_admin() {
    let h = Harness::new();
    let (_, token) = h.register_reader("plain").await;
    let (_, body) = h.send("GET", "/auth/getUserInfo", Some(&token), None).await;
    assert_eq!(body["roles"], json!(["user"]));
}

#[tokio::test]
async fn reset_password_requires_admin() {
    let h = Harness::new();
    let (reader_id, reader) = h.register_reader("reader").await;
    let uri = format!("/users/{reader_id}/reset-password");
    let (status, _) = h
        .send("PATCH", &uri, Some(&reader), Some(json!({ "new_password": "newpass1" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = h.admin().await;
    let (status, _) = h
        .send("PATCH", &uri, Some(&admin), Some(json!({ "new_password": "newpass1" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    h.login("reader", "newpass1").await;
}

#[tokio::test]
async fn change_password_checks_old_password() {
    let h = Harness::new();
    let (_, token) = h.register_reader("changer").await;
    let (status, _) = h
        .send(
            "PATCH",
            "/users/change-password",
            Some(&token),
            Some(json!({ "old_password": "nope123", "new_password": "fresh123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = h
        .send(
            "PATCH",
            "/users/change-password",
            Some(&token),
            Some(json!({ "old_password": "reader123", "new_password": "fresh123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn disabled_user_cannot_log_in() {
    let h = Harness::new();
    let admin = h.admin().await;
    let (id, _) = h.register_reader("sleepy").await;
    let (status, body) = h
        .send("POST", &format!("/users/{id}/toggle-status"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, _) = h
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "userName": "sleepy", "password": "reader123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_phone_rejected_on_update() {
    let h = Harness::new();
    let admin = h.admin().await;
    let (id, _) = h.register_reader("phoney").await;
    let (status, _) = h
        .send("PUT", &format!("/users/{id}"), Some(&admin), Some(json!({ "phone": "12345" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = h
        .send(
            "PUT",
            &format!("/users/{id}"),
            Some(&admin),
            Some(json!({ "phone": "13800138000" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "13800138000");
    assert_eq!(body["username"], "phoney");
}

#[tokio::test]
async fn batch_delete_users_returns_204() {
    let h = Harness::new();
    let admin = h.admin().await;
    let (a, _) = h.register_reader("gone1").await;
    let (b, _) = h.register_reader("gone2").await;
    let (status, _) = h
        .send(
            "POST",
            "/users/batch-delete",
            Some(&admin),
            Some(json!({ "user_ids": [a, b] })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = h.send("GET", &format!("/users/{a}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- books ---

#[tokio::test]
async fn non_numeric_id_returns_400() {
    let h = Harness::new();
    let admin = h.admin().await;
    let (status, _) = h.send("GET", "/books/abc", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn book_crud_lifecycle() {
    let h = Harness::new();
    let admin = h.admin().await;
    let id = h.create_book(&admin, "978-1", 3).await;

    let (status, body) = h
        .send("PUT", &format!("/books/{id}"), Some(&admin), Some(json!({ "price": 20.0 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 20.0);
    assert_eq!(body["isbn"], "978-1");

    let (status, _) = h
        .send("PUT", &format!("/books/{id}"), Some(&admin), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h.send("DELETE", &format!("/books/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = h.send("GET", &format!("/books/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_isbn_rejected() {
    let h = Harness::new();
    let admin = h.admin().await;
    h.create_book(&admin, "978-dup", 1).await;
    let (status, body) = h
        .send(
            "POST",
            "/books",
            Some(&admin),
            Some(json!({
                "title": "Copy", "author": "A", "isbn": "978-dup", "publisher": "P",
                "publish_date": "2000-01-01", "category": "Fiction", "price": 1.0,
                "stock_quantity": 1,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "isbn already exists");
}

#[tokio::test]
async fn book_list_pages_newest_first_and_bounds_size() {
    let h = Harness::new();
    let admin = h.admin().await;
    for n in 0..3 {
        h.create_book(&admin, &format!("978-{n}"), 1).await;
    }
    let (status, body) = h
        .send("GET", "/books?current=1&size=2", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["records"].as_array().unwrap().len(), 2);
    assert_eq!(body["records"][0]["isbn"], "978-2");

    let (status, _) = h.send("GET", "/books?size=101", Some(&admin), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = h.send("GET", "/books/categories/list", Some(&admin), None).await;
    assert_eq!(body["categories"], json!(["Fiction"]));
}

#[tokio::test]
async fn book_search_spans_title_author_and_isbn() {
    let h = Harness::new();
    let admin = h.admin().await;
    h.create_book(&admin, "978-left-hand", 1).await;
    h.create_book(&admin, "978-dispossessed", 1).await;

    let (status, body) = h
        .send("GET", "/books?search=DISPOSSESSED", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["records"][0]["isbn"], "978-dispossessed");

    let (_, body) = h
        .send("GET", "/books?search=le%20guin", Some(&admin), None)
        .await;
    assert_eq!(body["total"], 2);

    let (_, body) = h
        .send("GET", "/books?search=le%20guin&title=left", Some(&admin), None)
        .await;
    assert_eq!(body["total"], 1);

    let (_, body) = h.send("GET", "/books?search=tolkien", Some(&admin), None).await;
    assert_eq!(body["total"], 0);
}

// --- borrows ---

#[tokio::test]
async fn borrow_and_return_on_time() {
    let h = Harness::new();
    let admin = h.admin().await;
    let (_, reader) = h.register_reader("borrower").await;
    let book = h.create_book(&admin, "978-b", 2).await;

    let (status, receipt) = h.borrow(&reader, book, 14).await;
    assert_eq!(status, StatusCode::CREATED);
    let borrow_id = receipt["borrow_id"].as_i64().unwrap();
    assert!(receipt["due_date"].is_string());

    let (status, _) = h.borrow(&reader, book, 14).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, book_body) = h.send("GET", &format!("/books/{book}"), Some(&admin), None).await;
    assert_eq!(book_body["stock_quantity"], 1);

    let (status, returned) = h
        .send(
            "POST",
            &format!("/borrows/{borrow_id}/return"),
            Some(&reader),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["fine_amount"], 0.0);

    let (status, _) = h
        .send(
            "POST",
            &format!("/borrows/{borrow_id}/return"),
            Some(&reader),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn borrow_unknown_book_returns_404() {
    let h = Harness::new();
    let admin = h.admin().await;
    let (status, _) = h.borrow(&admin, 999, 30).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn out_of_stock_rejected() {
    let h = Harness::new();
    let admin = h.admin().await;
    let book = h.create_book(&admin, "978-empty", 0).await;
    let (status, body) = h.borrow(&admin, book, 30).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "book out of stock");
}

#[tokio::test]
async fn open_borrow_limit_is_five() {
    let h = Harness::new();
    let admin = h.admin().await;
    let (_, reader) = h.register_reader("greedy").await;
    for n in 0..5 {
        let book = h.create_book(&admin, &format!("978-g{n}"), 1).await;
        let (status, _) = h.borrow(&reader, book, 30).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let sixth = h.create_book(&admin, "978-g5", 1).await;
    let (status, _) = h.borrow(&reader, sixth, 30).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn overdue_loan_is_listed_fined_and_not_renewable() {
    let h = Harness::new();
    let admin = h.admin().await;
    let book = h.create_book(&admin, "978-late", 1).await;
    let (_, receipt) = h.borrow(&admin, book, -3).await;
    let borrow_id = receipt["borrow_id"].as_i64().unwrap();

    let (_, overdue) = h.send("GET", "/borrows/overdue/list", Some(&admin), None).await;
    let entry = &overdue["overdue_borrows"][0];
    assert_eq!(entry["id"], borrow_id);
    assert_eq!(entry["days_overdue"], 3);

    let (_, page) = h
        .send("GET", "/borrows?overdue_only=true", Some(&admin), None)
        .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["records"][0]["days_overdue"], 3);

    let (status, _) = h
        .send("POST", &format!("/borrows/{borrow_id}/renew"), Some(&admin), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, returned) = h
        .send(
            "POST",
            &format!("/borrows/{borrow_id}/return"),
            Some(&admin),
            Some(json!({ "notes": "late" })),
        )
        .await;
    assert_eq!(returned["fine_amount"], 3.0);

    let (_, stats) = h.send("GET", "/borrows/stats/summary", Some(&admin), None).await;
    assert_eq!(stats["total_fines"], 3.0);
    assert_eq!(stats["today_returns"], 1);
}

#[tokio::test]
async fn renewal_limit_is_two() {
    let h = Harness::new();
    let admin = h.admin().await;
    let book = h.create_book(&admin, "978-renew", 1).await;
    let (_, receipt) = h.borrow(&admin, book, 10).await;
    let uri = format!("/borrows/{}/renew", receipt["borrow_id"]);

    for expected in 1..=2 {
        let (status, body) = h
            .send("POST", &uri, Some(&admin), Some(json!({ "renewal_days": 7 })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["renewal_count"], expected);
    }
    let (status, _) = h.send("POST", &uri, Some(&admin), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_day_counts_return_422() {
    let h = Harness::new();
    let admin = h.admin().await;
    let book = h.create_book(&admin, "978-huge", 1).await;

    let (status, body) = h.borrow(&admin, book, 200_000_000).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("out of range"));

    let (status, receipt) = h.borrow(&admin, book, 10).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/borrows/{}/renew", receipt["borrow_id"]);
    let (status, body) = h
        .send("POST", &uri, Some(&admin), Some(json!({ "renewal_days": i64::MAX })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn readers_only_see_their_own_loans() {
    let h = Harness::new();
    let admin = h.admin().await;
    let (reader_id, reader) = h.register_reader("private").await;
    let a = h.create_book(&admin, "978-pa", 1).await;
    let b = h.create_book(&admin, "978-pb", 1).await;
    h.borrow(&admin, a, 30).await;
    h.borrow(&reader, b, 30).await;

    let (_, page) = h.send("GET", "/borrows", Some(&reader), None).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["records"][0]["user_id"], reader_id);

    let (_, page) = h
        .send("GET", "/borrows?page=1&page_size=1", Some(&admin), None)
        .await;
    assert_eq!(page["total"], 2);
    assert_eq!(page["size"], 1);

    let (status, _) = h.send("GET", "/borrows?page_size=0", Some(&admin), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = h.send("GET", "/borrows/user/1", Some(&reader), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// --- system ---

#[tokio::test]
async fn menus_and_roles_are_seeded() {
    let h = Harness::new();
    let admin = h.admin().await;

    let (_, tree) = h.send("GET", "/systemManage/getMenuTree", Some(&admin), None).await;
    assert_eq!(tree.as_array().unwrap().len(), 2);
    assert_eq!(tree[1]["children"].as_array().unwrap().len(), 3);
    assert_eq!(tree[1]["children"][0]["pId"], 2);

    let (_, pages) = h.send("GET", "/systemManage/getAllPages", Some(&admin), None).await;
    assert!(pages.as_array().unwrap().contains(&json!("manage_book")));

    let (_, roles) = h.send("GET", "/systemManage/getAllRoles", Some(&admin), None).await;
    assert_eq!(roles.as_array().unwrap().len(), 2);

    let (_, page) = h
        .send("GET", "/systemManage/getRoleList?status=2", Some(&admin), None)
        .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["records"][0]["roleCode"], "R_GUEST");
}
