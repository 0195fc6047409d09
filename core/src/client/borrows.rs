//! Borrow, return and renew workflows plus loan reporting.

use super::{parse_json, query_pairs, LibraryClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    BorrowCreateParams, BorrowId, BorrowReceipt, BorrowRenewalParams, BorrowReturnParams,
    BorrowSearchParams, BorrowStats, BorrowStatus, BorrowWithDetails, OverdueBorrows, Page,
    RenewalReceipt, ReturnReceipt, UserBorrows, UserId,
};

impl LibraryClient {
    /// The borrow list pages with `page`/`page_size` instead of the
    /// `current`/`size` every other list uses, so the keys are renamed here.
    pub fn build_list_borrows(&self, params: &BorrowSearchParams) -> Result<HttpRequest, ApiError> {
        let mut req = self.request(HttpMethod::Get, "/borrows");
        req.query = query_pairs(params)?
            .into_iter()
            .map(|(key, value)| match key.as_str() {
                "current" => ("page".to_string(), value),
                "size" => ("page_size".to_string(), value),
                _ => (key, value),
            })
            .collect();
        Ok(req)
    }

    pub fn parse_list_borrows(
        &self,
        response: HttpResponse,
    ) -> Result<Page<BorrowWithDetails>, ApiError> {
        parse_json(response)
    }

    pub fn build_get_borrow(&self, id: BorrowId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/borrows/{id}"))
    }

    pub fn parse_get_borrow(&self, response: HttpResponse) -> Result<BorrowWithDetails, ApiError> {
        parse_json(response)
    }

    pub fn build_borrow_book(&self, params: &BorrowCreateParams) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/borrows/borrow", params)
    }

    pub fn parse_borrow_book(&self, response: HttpResponse) -> Result<BorrowReceipt, ApiError> {
        parse_json(response)
    }

    /// `None` sends an empty JSON object.
    pub fn build_return_book(
        &self,
        id: BorrowId,
        params: Option<&BorrowReturnParams>,
    ) -> Result<HttpRequest, ApiError> {
        let default = BorrowReturnParams::default();
        self.json_request(
            HttpMethod::Post,
            &format!("/borrows/{id}/return"),
            params.unwrap_or(&default),
        )
    }

    pub fn parse_return_book(&self, response: HttpResponse) -> Result<ReturnReceipt, ApiError> {
        parse_json(response)
    }

    /// `None` sends an empty JSON object.
    pub fn build_renew_book(
        &self,
        id: BorrowId,
        params: Option<&BorrowRenewalParams>,
    ) -> Result<HttpRequest, ApiError> {
        let default = BorrowRenewalParams::default();
        self.json_request(
            HttpMethod::Post,
            &format!("/borrows/{id}/renew"),
            params.unwrap_or(&default),
        )
    }

    pub fn parse_renew_book(&self, response: HttpResponse) -> Result<RenewalReceipt, ApiError> {
        parse_json(response)
    }

    pub fn build_list_user_borrows(
        &self,
        user_id: UserId,
        status: Option<BorrowStatus>,
    ) -> HttpRequest {
        let mut req = self.request(HttpMethod::Get, &format!("/borrows/user/{user_id}"));
        if let Some(status) = status {
            req.query
                .push(("status".to_string(), status.as_str().to_string()));
        }
        req
    }

    pub fn parse_list_user_borrows(&self, response: HttpResponse) -> Result<UserBorrows, ApiError> {
        parse_json(response)
    }

    pub fn build_borrow_stats(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/borrows/stats/summary")
    }

    pub fn parse_borrow_stats(&self, response: HttpResponse) -> Result<BorrowStats, ApiError> {
        parse_json(response)
    }

    pub fn build_list_overdue_borrows(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/borrows/overdue/list")
    }

    pub fn parse_list_overdue_borrows(
        &self,
        response: HttpResponse,
    ) -> Result<OverdueBorrows, ApiError> {
        parse_json(response)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{body_json, client, response};
    use super::*;

    #[test]
    fn build_list_borrows_renames_paging_keys() {
        let params = BorrowSearchParams {
            current: Some(2),
            size: Some(10),
            ..Default::default()
        };
        let req = client().build_list_borrows(&params).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/borrows");
        assert_eq!(
            req.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("page_size".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn build_list_borrows_keeps_filters() {
        let params = BorrowSearchParams {
            status: Some(BorrowStatus::Borrowed),
            overdue_only: Some(true),
            username: Some("reader".to_string()),
            ..Default::default()
        };
        let req = client().build_list_borrows(&params).unwrap();
        assert_eq!(req.query_value("status"), Some("borrowed"));
        assert_eq!(req.query_value("overdue_only"), Some("true"));
        assert_eq!(req.query_value("username"), Some("reader"));
        assert!(req.query_value("page").is_none());
        assert!(req.query_value("current").is_none());
    }

    #[test]
    fn build_get_borrow_interpolates_id() {
        let req = client().build_get_borrow(11);
        assert_eq!(req.path, "http://localhost:8000/borrows/11");
    }

    #[test]
    fn build_borrow_book_omits_defaults() {
        let params = BorrowCreateParams {
            book_id: 3,
            notes: Some("for class".to_string()),
            ..Default::default()
        };
        let req = client().build_borrow_book(&params).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/borrows/borrow");
        assert_eq!(
            body_json(&req),
            serde_json::json!({"book_id": 3, "notes": "for class"})
        );
    }

    #[test]
    fn parse_borrow_book_receipt() {
        let receipt = client()
            .parse_borrow_book(response(
                201,
                r#"{"message":"borrowed","borrow_id":12,"due_date":"2024-04-01T09:00:00.123456"}"#,
            ))
            .unwrap();
        assert_eq!(receipt.borrow_id, 12);
    }

    #[test]
    fn parse_borrow_book_out_of_stock() {
        let err = client()
            .parse_borrow_book(response(400, r#"{"detail":"book out of stock"}"#))
            .unwrap_err();
        assert_eq!(err.detail().as_deref(), Some("book out of stock"));
    }

    #[test]
    fn build_return_book_without_params_sends_empty_object() {
        let req = client().build_return_book(5, None).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/borrows/5/return");
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn build_return_book_with_notes() {
        let params = BorrowReturnParams {
            notes: Some("x".to_string()),
        };
        let req = client().build_return_book(5, Some(&params)).unwrap();
        assert_eq!(body_json(&req), serde_json::json!({"notes": "x"}));
    }

    #[test]
    fn parse_return_book_reads_fine() {
        let receipt = client()
            .parse_return_book(response(
                200,
                r#"{"message":"returned","return_date":"2024-04-03T09:00:00","fine_amount":2.0}"#,
            ))
            .unwrap();
        assert_eq!(receipt.fine_amount, 2.0);
    }

    #[test]
    fn build_renew_book_defaults_and_overrides() {
        let req = client().build_renew_book(6, None).unwrap();
        assert_eq!(req.path, "http://localhost:8000/borrows/6/renew");
        assert_eq!(req.body.as_deref(), Some("{}"));

        let params = BorrowRenewalParams {
            renewal_days: Some(14),
            notes: None,
        };
        let req = client().build_renew_book(6, Some(&params)).unwrap();
        assert_eq!(body_json(&req), serde_json::json!({"renewal_days": 14}));
    }

    #[test]
    fn parse_renew_book_limit_reached() {
        let err = client()
            .parse_renew_book(response(400, r#"{"detail":"renewal limit reached"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 400, .. }));
    }

    #[test]
    fn build_list_user_borrows_status_is_optional() {
        let req = client().build_list_user_borrows(4, None);
        assert_eq!(req.path, "http://localhost:8000/borrows/user/4");
        assert!(req.query.is_empty());

        let req = client().build_list_user_borrows(4, Some(BorrowStatus::Returned));
        assert_eq!(req.query_value("status"), Some("returned"));
    }

    #[test]
    fn parse_borrow_stats_success() {
        let stats = client()
            .parse_borrow_stats(response(
                200,
                r#"{"current_borrows":3,"overdue_borrows":1,"today_borrows":2,"today_returns":0,"total_fines":4.0}"#,
            ))
            .unwrap();
        assert_eq!(stats.current_borrows, 3);
        assert_eq!(stats.total_fines, 4.0);
        assert_eq!(
            client().build_borrow_stats().path,
            "http://localhost:8000/borrows/stats/summary"
        );
    }

    #[test]
    fn parse_overdue_list_success() {
        let overdue = client()
            .parse_list_overdue_borrows(response(
                200,
                r#"{"overdue_borrows":[{"id":1,"user_id":2,"username":"reader","email":"r@example.com",
                    "phone":null,"book_id":3,"book_title":"Dune","book_author":"Frank Herbert",
                    "borrow_date":"2024-03-01T09:00:00","due_date":"2024-03-31T09:00:00",
                    "renewal_count":0,"days_overdue":5}]}"#,
            ))
            .unwrap();
        assert_eq!(overdue.overdue_borrows[0].days_overdue, 5);
        assert_eq!(
            client().build_list_overdue_borrows().path,
            "http://localhost:8000/borrows/overdue/list"
        );
    }
}
