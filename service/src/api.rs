use std::sync::Arc;

use library_core::{
    AllRole, ApiError, AuthorList, Book, BookId, BookInput, BookSearchParams, BorrowCreateParams,
    BorrowId, BorrowReceipt, BorrowRenewalParams, BorrowReturnParams, BorrowSearchParams,
    BorrowStats, BorrowStatus, BorrowWithDetails, CategoryList, CreateUserParams, HttpRequest,
    HttpResponse, LibraryClient, LoginToken, Menu, MenuTree, Message, OverdueBorrows, Page,
    RegisterParams, RenewalReceipt, ReturnReceipt, Role, RoleSearchParams, Statistics,
    ToggleStatus, UpdatePasswordParams, User, UserBorrows, UserId, UserInfo, UserSearchParams,
    UserSummary,
};

use crate::config::ClientConfig;
use crate::transport::{ReqwestTransport, Transport};

/// Async library API: each call builds a request, runs it through the
/// transport and parses the response.
///
/// Cloning is cheap and clones share the transport. Calls are independent;
/// concurrent calls carry no ordering guarantee.
pub struct LibraryApi<T> {
    client: LibraryClient,
    transport: Arc<T>,
}

impl<T> Clone for LibraryApi<T> {
    fn clone(&self) -> Self {
        LibraryApi {
            client: self.client.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl LibraryApi<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut client = LibraryClient::new(&config.base_url);
        if let Some(token) = &config.access_token {
            client = client.with_access_token(token);
        }
        Ok(LibraryApi::new(client, ReqwestTransport::new(config)?))
    }
}

impl<T: Transport> LibraryApi<T> {
    pub fn new(client: LibraryClient, transport: T) -> Self {
        LibraryApi {
            client,
            transport: Arc::new(transport),
        }
    }

    /// A facade sharing this transport that authenticates as `token`.
    pub fn with_access_token(&self, token: &str) -> Self {
        LibraryApi {
            client: self.client.with_access_token(token),
            transport: Arc::clone(&self.transport),
        }
    }

    pub fn client(&self) -> &LibraryClient {
        &self.client
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.execute(request).await?;
        tracing::debug!(%method, %path, status = response.status, "library API call");
        Ok(response)
    }

    // --- auth ---

    pub async fn login(&self, user_name: &str, password: &str) -> Result<LoginToken, ApiError> {
        let req = self.client.build_login(user_name, password)?;
        self.client.parse_login(self.send(req).await?)
    }

    /// Log in and return a facade carrying the new access token.
    pub async fn login_session(&self, user_name: &str, password: &str) -> Result<Self, ApiError> {
        let token = self.login(user_name, password).await?;
        tracing::info!(user = user_name, "logged in");
        Ok(self.with_access_token(&token.access_token))
    }

    pub async fn get_user_info(&self) -> Result<UserInfo, ApiError> {
        let req = self.client.build_get_user_info();
        self.client.parse_get_user_info(self.send(req).await?)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<LoginToken, ApiError> {
        let req = self.client.build_refresh_token(refresh_token)?;
        self.client.parse_refresh_token(self.send(req).await?)
    }

    pub async fn logout(&self) -> Result<Message, ApiError> {
        let req = self.client.build_logout();
        self.client.parse_logout(self.send(req).await?)
    }

    pub async fn register(&self, params: &RegisterParams) -> Result<User, ApiError> {
        let req = self.client.build_register(params)?;
        self.client.parse_register(self.send(req).await?)
    }

    pub async fn update_user_info(&self, user: &User) -> Result<User, ApiError> {
        let req = self.client.build_update_user_info(user)?;
        self.client.parse_update_user_info(self.send(req).await?)
    }

    pub async fn update_password(&self, params: &UpdatePasswordParams) -> Result<Message, ApiError> {
        let req = self.client.build_update_password(params)?;
        self.client.parse_update_password(self.send(req).await?)
    }

    pub async fn user_summary(&self) -> Result<UserSummary, ApiError> {
        let req = self.client.build_user_summary();
        self.client.parse_user_summary(self.send(req).await?)
    }

    pub async fn statistics(&self) -> Result<Statistics, ApiError> {
        let req = self.client.build_statistics();
        self.client.parse_statistics(self.send(req).await?)
    }

    pub async fn custom_backend_error(
        &self,
        code: &str,
        msg: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let req = self.client.build_custom_backend_error(code, msg);
        self.client.parse_custom_backend_error(self.send(req).await?)
    }

    // --- users ---

    pub async fn list_users(&self, params: &UserSearchParams) -> Result<Page<User>, ApiError> {
        let req = self.client.build_list_users(params)?;
        self.client.parse_list_users(self.send(req).await?)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, ApiError> {
        let req = self.client.build_get_user(id);
        self.client.parse_get_user(self.send(req).await?)
    }

    pub async fn create_user(&self, params: &CreateUserParams) -> Result<User, ApiError> {
        let req = self.client.build_create_user(params)?;
        self.client.parse_create_user(self.send(req).await?)
    }

    pub async fn update_user(&self, id: UserId, user: &User) -> Result<User, ApiError> {
        let req = self.client.build_update_user(id, user)?;
        self.client.parse_update_user(self.send(req).await?)
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        let req = self.client.build_delete_user(id);
        self.client.parse_delete_user(self.send(req).await?)
    }

    pub async fn batch_delete_users(&self, ids: &[UserId]) -> Result<(), ApiError> {
        let req = self.client.build_batch_delete_users(ids)?;
        self.client.parse_batch_delete_users(self.send(req).await?)
    }

    pub async fn reset_user_password(
        &self,
        id: UserId,
        new_password: &str,
    ) -> Result<Message, ApiError> {
        let req = self.client.build_reset_user_password(id, new_password)?;
        self.client.parse_reset_user_password(self.send(req).await?)
    }

    pub async fn toggle_user_status(&self, id: UserId) -> Result<ToggleStatus, ApiError> {
        let req = self.client.build_toggle_user_status(id);
        self.client.parse_toggle_user_status(self.send(req).await?)
    }

    // --- roles and menus ---

    pub async fn list_roles(&self, params: &RoleSearchParams) -> Result<Page<Role>, ApiError> {
        let req = self.client.build_list_roles(params)?;
        self.client.parse_list_roles(self.send(req).await?)
    }

    pub async fn list_all_roles(&self) -> Result<Vec<AllRole>, ApiError> {
        let req = self.client.build_list_all_roles();
        self.client.parse_list_all_roles(self.send(req).await?)
    }

    pub async fn list_menus(&self) -> Result<Page<Menu>, ApiError> {
        let req = self.client.build_list_menus();
        self.client.parse_list_menus(self.send(req).await?)
    }

    pub async fn list_all_pages(&self) -> Result<Vec<String>, ApiError> {
        let req = self.client.build_list_all_pages();
        self.client.parse_list_all_pages(self.send(req).await?)
    }

    pub async fn get_menu_tree(&self) -> Result<Vec<MenuTree>, ApiError> {
        let req = self.client.build_get_menu_tree();
        self.client.parse_get_menu_tree(self.send(req).await?)
    }

    // --- books ---

    pub async fn list_books(&self, params: &BookSearchParams) -> Result<Page<Book>, ApiError> {
        let req = self.client.build_list_books(params)?;
        self.client.parse_list_books(self.send(req).await?)
    }

    pub async fn get_book(&self, id: BookId) -> Result<Book, ApiError> {
        let req = self.client.build_get_book(id);
        self.client.parse_get_book(self.send(req).await?)
    }

    pub async fn create_book(&self, input: &BookInput) -> Result<Book, ApiError> {
        let req = self.client.build_create_book(input)?;
        self.client.parse_create_book(self.send(req).await?)
    }

    pub async fn update_book(&self, id: BookId, input: &BookInput) -> Result<Book, ApiError> {
        let req = self.client.build_update_book(id, input)?;
        self.client.parse_update_book(self.send(req).await?)
    }

    pub async fn delete_book(&self, id: BookId) -> Result<(), ApiError> {
        let req = self.client.build_delete_book(id);
        self.client.parse_delete_book(self.send(req).await?)
    }

    pub async fn batch_delete_books(&self, ids: &[BookId]) -> Result<(), ApiError> {
        let req = self.client.build_batch_delete_books(ids)?;
        self.client.parse_batch_delete_books(self.send(req).await?)
    }

    pub async fn list_categories(&self) -> Result<CategoryList, ApiError> {
        let req = self.client.build_list_categories();
        self.client.parse_list_categories(self.send(req).await?)
    }

    pub async fn list_authors(&self) -> Result<AuthorList, ApiError> {
        let req = self.client.build_list_authors();
        self.client.parse_list_authors(self.send(req).await?)
    }

    // --- borrows ---

    pub async fn list_borrows(
        &self,
        params: &BorrowSearchParams,
    ) -> Result<Page<BorrowWithDetails>, ApiError> {
        let req = self.client.build_list_borrows(params)?;
        self.client.parse_list_borrows(self.send(req).await?)
    }

    pub async fn get_borrow(&self, id: BorrowId) -> Result<BorrowWithDetails, ApiError> {
        let req = self.client.build_get_borrow(id);
        self.client.parse_get_borrow(self.send(req).await?)
    }

    pub async fn borrow_book(&self, params: &BorrowCreateParams) -> Result<BorrowReceipt, ApiError> {
        let req = self.client.build_borrow_book(params)?;
        let receipt = self.client.parse_borrow_book(self.send(req).await?)?;
        tracing::info!(borrow_id = receipt.borrow_id, book_id = params.book_id, "book borrowed");
        Ok(receipt)
    }

    pub async fn return_book(
        &self,
        id: BorrowId,
        params: Option<&BorrowReturnParams>,
    ) -> Result<ReturnReceipt, ApiError> {
        let req = self.client.build_return_book(id, params)?;
        let receipt = self.client.parse_return_book(self.send(req).await?)?;
        tracing::info!(borrow_id = id, fine = receipt.fine_amount, "book returned");
        Ok(receipt)
    }

    pub async fn renew_book(
        &self,
        id: BorrowId,
        params: Option<&BorrowRenewalParams>,
    ) -> Result<RenewalReceipt, ApiError> {
        let req = self.client.build_renew_book(id, params)?;
        self.client.parse_renew_book(self.send(req).await?)
    }

    pub async fn list_user_borrows(
        &self,
        user_id: UserId,
        status: Option<BorrowStatus>,
    ) -> Result<UserBorrows, ApiError> {
        let req = self.client.build_list_user_borrows(user_id, status);
        self.client.parse_list_user_borrows(self.send(req).await?)
    }

    pub async fn borrow_stats(&self) -> Result<BorrowStats, ApiError> {
        let req = self.client.build_borrow_stats();
        self.client.parse_borrow_stats(self.send(req).await?)
    }

    pub async fn list_overdue_borrows(&self) -> Result<OverdueBorrows, ApiError> {
        let req = self.client.build_list_overdue_borrows();
        self.client.parse_list_overdue_borrows(self.send(req).await?)
    }
}
