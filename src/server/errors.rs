use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::debug;

/// Request problems. Pipeline failures never surface here: they degrade
/// to partial results inside a 200.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("query parameter `q` must not be empty")]
    EmptyQuery,

    #[error("invalid query parameters: {0}")]
    InvalidParams(String),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::EmptyQuery | ApiError::InvalidParams(_) => StatusCode::BAD_REQUEST,
        };
        debug!(error = %self, %status, "request rejected");
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_query_is_bad_request_with_json_body() {
        let response = ApiError::EmptyQuery.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("`q`"));
    }
}
