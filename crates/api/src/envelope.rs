//! Uniform JSON response envelope.
//!
//! Success: `{ "success": true, "data": ..., "pagination"?: ... }`
//! Failure: `{ "success": false, "code": ..., "message": ..., "correlation"?: ... }`

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use shopdesk_infra::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl<R> From<&Page<R>> for Pagination {
    fn from(page: &Page<R>) -> Self {
        Self {
            page: page.request.page(),
            per_page: page.request.per_page(),
            total: page.total,
            total_pages: page.total_pages(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SuccessBody<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
}

/// Successful response with status, payload and optional pagination.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    data: T,
    pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data,
            pagination: None,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            data,
            pagination: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn paginated(page: Page<T>) -> Self {
        let pagination = Pagination::from(&page);
        Self {
            status: StatusCode::OK,
            data: page.items,
            pagination: Some(pagination),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(SuccessBody {
                success: true,
                data: self.data,
                pagination: self.pagination,
            }),
        )
            .into_response()
    }
}

/// Failure body.
///
/// Rendered responses also carry a copy in their extensions so the
/// correlation middleware can re-render it with the request's correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEnvelope {
    pub success: bool,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<String>,
}

impl FailureEnvelope {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
            correlation: None,
        }
    }

    pub fn with_correlation(mut self, correlation: impl Into<String>) -> Self {
        self.correlation = Some(correlation.into());
        self
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        let mut res = (status, Json(&self)).into_response();
        res.extensions_mut().insert(self);
        res
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use shopdesk_infra::PageRequest;

    use super::*;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn success_envelope_omits_pagination_for_single_items() {
        let res = ApiResponse::created(serde_json::json!({"id": 1})).into_response();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body = body_json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], 1);
        assert!(body.get("pagination").is_none());
    }

    #[tokio::test]
    async fn paginated_envelope_reports_totals() {
        let page = Page {
            items: vec![1, 2],
            total: 5,
            request: PageRequest::new(Some(1), Some(2)),
        };
        let body = body_json(ApiResponse::paginated(page).into_response()).await;
        assert_eq!(body["data"], serde_json::json!([1, 2]));
        assert_eq!(body["pagination"]["total"], 5);
        assert_eq!(body["pagination"]["total_pages"], 3);
        assert_eq!(body["pagination"]["per_page"], 2);
    }

    #[tokio::test]
    async fn failure_envelope_is_kept_in_extensions() {
        let res = FailureEnvelope::new("NOT_FOUND", "product not found").into_response(StatusCode::NOT_FOUND);
        assert_eq!(
            res.extensions().get::<FailureEnvelope>().map(|f| f.code),
            Some("NOT_FOUND")
        );
        let body = body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "product not found");
        assert!(body.get("correlation").is_none());
    }
}
