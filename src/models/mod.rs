//! Data models for the MapleStore backend

use serde::{Deserialize, Serialize};

pub mod order;
pub mod product;
pub mod user;

pub use order::*;
pub use product::*;
pub use user::*;

/// API response envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(rename = "totalPages", skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
    #[serde(rename = "currentPage", skip_serializing_if = "Option::is_none")]
    pub current_page: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            count: None,
            total: None,
            total_pages: None,
            current_page: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            count: None,
            total: None,
            total_pages: None,
            current_page: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            count: None,
            total: None,
            total_pages: None,
            current_page: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// List envelope: `count` is the page size, `total` the full result size.
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len() as i64;
        let mut response = Self::ok(data);
        response.count = Some(count);
        response
    }

    pub fn paginated(data: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        let mut response = Self::list(data);
        response.total = Some(total);
        response.total_pages = Some(total_pages(total, limit));
        response.current_page = Some(page);
        response
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Postal address, stored as JSONB on users and orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_absent_fields() {
        let body = serde_json::to_value(ApiResponse::ok(1)).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "data": 1 }));
    }

    #[test]
    fn paginated_envelope_uses_wire_field_names() {
        let body =
            serde_json::to_value(ApiResponse::paginated(vec![1, 2, 3], 25, 2, 10)).unwrap();
        assert_eq!(body["count"], 3);
        assert_eq!(body["total"], 25);
        assert_eq!(body["totalPages"], 3);
        assert_eq!(body["currentPage"], 2);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
    }
}
