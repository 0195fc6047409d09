//! Session, self-service account and dashboard counter endpoints.

use super::{parse_json, LibraryClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    LoginRequest, LoginToken, Message, RefreshTokenRequest, RegisterParams, Statistics,
    UpdatePasswordParams, User, UserInfo, UserSummary,
};

impl LibraryClient {
    pub fn build_login(&self, user_name: &str, password: &str) -> Result<HttpRequest, ApiError> {
        let body = LoginRequest {
            user_name: user_name.to_string(),
            password: password.to_string(),
        };
        self.json_request(HttpMethod::Post, "/auth/login", &body)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginToken, ApiError> {
        parse_json(response)
    }

    pub fn build_get_user_info(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/auth/getUserInfo")
    }

    pub fn parse_get_user_info(&self, response: HttpResponse) -> Result<UserInfo, ApiError> {
        parse_json(response)
    }

    pub fn build_refresh_token(&self, refresh_token: &str) -> Result<HttpRequest, ApiError> {
        let body = RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.json_request(HttpMethod::Post, "/auth/refreshToken", &body)
    }

    pub fn parse_refresh_token(&self, response: HttpResponse) -> Result<LoginToken, ApiError> {
        parse_json(response)
    }

    pub fn build_logout(&self) -> HttpRequest {
        self.request(HttpMethod::Post, "/auth/logout")
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<Message, ApiError> {
        parse_json(response)
    }

    pub fn build_register(&self, params: &RegisterParams) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/register", params)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    /// Update the signed-in user's own profile with a full `User` value.
    pub fn build_update_user_info(&self, user: &User) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, "/users", user)
    }

    pub fn parse_update_user_info(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    pub fn build_update_password(
        &self,
        params: &UpdatePasswordParams,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Patch, "/users/change-password", params)
    }

    pub fn parse_update_password(&self, response: HttpResponse) -> Result<Message, ApiError> {
        parse_json(response)
    }

    pub fn build_user_summary(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/users/stats/summary")
    }

    pub fn parse_user_summary(&self, response: HttpResponse) -> Result<UserSummary, ApiError> {
        parse_json(response)
    }

    pub fn build_statistics(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/statistics")
    }

    pub fn parse_statistics(&self, response: HttpResponse) -> Result<Statistics, ApiError> {
        parse_json(response)
    }

    /// Ask the backend to answer with a caller-chosen error code and message.
    pub fn build_custom_backend_error(&self, code: &str, msg: &str) -> HttpRequest {
        let mut req = self.request(HttpMethod::Get, "/auth/error");
        req.query = vec![
            ("code".to_string(), code.to_string()),
            ("msg".to_string(), msg.to_string()),
        ];
        req
    }

    pub fn parse_custom_backend_error(
        &self,
        response: HttpResponse,
    ) -> Result<serde_json::Value, ApiError> {
        parse_json(response)
    }
}
