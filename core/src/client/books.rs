//! Catalogue management.

use super::{parse_empty, parse_json, LibraryClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AuthorList, BatchDeleteBooks, Book, BookId, BookInput, BookSearchParams, CategoryList, Page,
};

impl LibraryClient {
    pub fn build_list_books(&self, params: &BookSearchParams) -> Result<HttpRequest, ApiError> {
        self.query_request("/books", params)
    }

    pub fn parse_list_books(&self, response: HttpResponse) -> Result<Page<Book>, ApiError> {
        parse_json(response)
    }

    pub fn build_get_book(&self, id: BookId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/books/{id}"))
    }

    pub fn parse_get_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        parse_json(response)
    }

    pub fn build_create_book(&self, input: &BookInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/books", input)
    }

    pub fn parse_create_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        parse_json(response)
    }

    /// Replace every editable field of the book.
    pub fn build_update_book(&self, id: BookId, input: &BookInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/books/{id}"), input)
    }

    pub fn parse_update_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        parse_json(response)
    }

    pub fn build_delete_book(&self, id: BookId) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/books/{id}"))
    }

    pub fn parse_delete_book(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_empty(response)
    }

    pub fn build_batch_delete_books(&self, ids: &[BookId]) -> Result<HttpRequest, ApiError> {
        let body = BatchDeleteBooks {
            book_ids: ids.to_vec(),
        };
        self.json_request(HttpMethod::Post, "/books/batch-delete", &body)
    }

    pub fn parse_batch_delete_books(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_empty(response)
    }

    pub fn build_list_categories(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/books/categories/list")
    }

    pub fn parse_list_categories(&self, response: HttpResponse) -> Result<CategoryList, ApiError> {
        parse_json(response)
    }

    pub fn build_list_authors(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/books/authors/list")
    }

    pub fn parse_list_authors(&self, response: HttpResponse) -> Result<AuthorList, ApiError> {
        parse_json(response)
    }
}
