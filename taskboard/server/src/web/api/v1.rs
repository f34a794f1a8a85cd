use crate::error::ServiceError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// JSON response for API errors
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine readable kind: `NOT_FOUND`, `VALIDATION_FAILED` or `STORE_FAILURE`
    pub error: String,
    /// Human readable description
    pub message: String,
}

/// Error returned by every JSON handler.
///
/// Wraps a `ServiceError`; extractor rejections (malformed JSON, unknown enum
/// values, non-numeric path ids) are folded into `ServiceError::Validation`.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ServiceError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ServiceError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(ServiceError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error) = match &self.0 {
            ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ServiceError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_FAILURE"),
        };
        let message = self.0.to_string();

        if status_code.is_server_error() {
            tracing::error!(%status_code, %message, "Request failed");
        } else {
            tracing::warn!(%status_code, %message, "Request rejected");
        }

        let error_response = ErrorResponse {
            error: error.to_string(),
            message,
        };
        (status_code, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_json_snapshot;
    use sea_orm::DbErr;

    async fn response_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn can_render_not_found_as_404() {
        let response = ApiError::from(ServiceError::not_found("Project", 7)).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_json_snapshot!(response_json(response).await, @r#"
        {
          "error": "NOT_FOUND",
          "message": "Project with ID 7 not found"
        }
        "#);
    }

    #[tokio::test]
    async fn can_render_validation_failure_as_400() {
        let error = ServiceError::missing_fields([("name", true), ("startDate", true)]);
        let response = ApiError::from(error).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_json_snapshot!(response_json(response).await, @r#"
        {
          "error": "VALIDATION_FAILED",
          "message": "Validation failed: Missing required fields: name, startDate"
        }
        "#);
    }

    #[tokio::test]
    async fn can_render_store_failure_as_500() {
        let error = ServiceError::Database(DbErr::Custom("connection reset".to_string()));
        let response = ApiError::from(error).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert_eq!(json["error"], "STORE_FAILURE");
        assert!(
            json["message"]
                .as_str()
                .unwrap()
                .contains("connection reset")
        );
    }
}
