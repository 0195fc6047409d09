//! Role and menu listings under `/systemManage`.

use super::{parse_json, LibraryClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AllRole, Menu, MenuTree, Page, Role, RoleSearchParams};

impl LibraryClient {
    pub fn build_list_roles(&self, params: &RoleSearchParams) -> Result<HttpRequest, ApiError> {
        self.query_request("/systemManage/getRoleList", params)
    }

    pub fn parse_list_roles(&self, response: HttpResponse) -> Result<Page<Role>, ApiError> {
        parse_json(response)
    }

    /// Every enabled role, unpaginated.
    pub fn build_list_all_roles(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/systemManage/getAllRoles")
    }

    pub fn parse_list_all_roles(&self, response: HttpResponse) -> Result<Vec<AllRole>, ApiError> {
        parse_json(response)
    }

    pub fn build_list_menus(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/systemManage/getMenuList/v2")
    }

    pub fn parse_list_menus(&self, response: HttpResponse) -> Result<Page<Menu>, ApiError> {
        parse_json(response)
    }

    pub fn build_list_all_pages(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/systemManage/getAllPages")
    }

    pub fn parse_list_all_pages(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        parse_json(response)
    }

    pub fn build_get_menu_tree(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/systemManage/getMenuTree")
    }

    pub fn parse_get_menu_tree(&self, response: HttpResponse) -> Result<Vec<MenuTree>, ApiError> {
        parse_json(response)
    }
}
