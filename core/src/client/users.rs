//! Admin-side user management.

use super::{parse_empty, parse_json, LibraryClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    BatchDeleteUsers, CreateUserParams, Message, Page, ResetPasswordParams, ToggleStatus, User,
    UserId, UserSearchParams,
};

impl LibraryClient {
    pub fn build_list_users(&self, params: &UserSearchParams) -> Result<HttpRequest, ApiError> {
        self.query_request("/users", params)
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Page<User>, ApiError> {
        parse_json(response)
    }

    pub fn build_get_user(&self, id: UserId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/users/{id}"))
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    pub fn build_create_user(&self, params: &CreateUserParams) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/users", params)
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    /// Send the full `User` value. The server applies every field present.
    pub fn build_update_user(&self, id: UserId, user: &User) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/users/{id}"), user)
    }

    pub fn parse_update_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    pub fn build_delete_user(&self, id: UserId) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/users/{id}"))
    }

    pub fn parse_delete_user(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_empty(response)
    }

    pub fn build_batch_delete_users(&self, ids: &[UserId]) -> Result<HttpRequest, ApiError> {
        let body = BatchDeleteUsers {
            user_ids: ids.to_vec(),
        };
        self.json_request(HttpMethod::Post, "/users/batch-delete", &body)
    }

    pub fn parse_batch_delete_users(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_empty(response)
    }

    pub fn build_reset_user_password(
        &self,
        id: UserId,
        new_password: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = ResetPasswordParams {
            new_password: new_password.to_string(),
        };
        self.json_request(
            HttpMethod::Patch,
            &format!("/users/{id}/reset-password"),
            &body,
        )
    }

    pub fn parse_reset_user_password(&self, response: HttpResponse) -> Result<Message, ApiError> {
        parse_json(response)
    }

    pub fn build_toggle_user_status(&self, id: UserId) -> HttpRequest {
        self.request(HttpMethod::Post, &format!("/users/{id}/toggle-status"))
    }

    pub fn parse_toggle_user_status(
        &self,
        response: HttpResponse,
    ) -> Result<ToggleStatus, ApiError> {
        parse_json(response)
    }
}
